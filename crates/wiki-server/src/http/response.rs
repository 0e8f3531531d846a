//! Response builders.

use hyper::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use hyper::{Body, Response, StatusCode};
use tracing::error;

use super::pages;

/// Content type of every page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// An HTML page with the given status.
pub fn html(status: StatusCode, page: String) -> Response<Body> {
    let mut response = Response::new(Body::from(page));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    response
}

/// `303 See Other` to `location`, so a form POST is followed by a GET.
pub fn redirect(location: &str) -> Response<Body> {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::SEE_OTHER;
            response.headers_mut().insert(LOCATION, value);
            response
        },
        Err(e) => {
            error!("Refusing to redirect to {location:?}: {e}");
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target")
        },
    }
}

/// A minimal page explaining a failed request.
pub fn error_page(status: StatusCode, message: &str) -> Response<Body> {
    html(status, pages::error_page(status, message))
}

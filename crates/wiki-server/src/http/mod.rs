//! # HTTP Routing
//!
//! | Method | Path | Behaviour |
//! |---|---|---|
//! | GET | `/` | every document, grouped by directory |
//! | GET | `/view/{dir}/{name}` | cross-linked, rendered document |
//! | GET | `/edit/{dir}/{name}` | editor (empty for a new document) |
//! | POST | `/edit/{dir}/{name}` | save field `content`, redirect to the view |
//! | GET | `/new` | create form |
//! | POST | `/new` | create from `dir`, `name`, `content`; 409 if it exists |
//! | GET | `/confirm_delete/{dir}/{name}` | delete confirmation |
//! | POST | `/delete/{dir}/{name}` | delete, redirect to `/` |
//! | GET | `/headers/{text}` | every section titled exactly `text` |
//!
//! Views and heading lookups accept `?allow_stale=true` to skip rebuilding a
//! stale header index. Path segments are percent-decoded before use. Form
//! bodies larger than the app's body limit are answered with 413.

mod pages;
mod response;

pub use response::HTML_CONTENT_TYPE;

use hyper::body::HttpBody;
use hyper::header::CONTENT_LENGTH;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use url::form_urlencoded;
use wiki_core::render::to_html;
use wiki_core::wiki::VIEW_ROUTE_PREFIX;
use wiki_core::{DocumentId, Error, Result, Wiki, decode_route_segment, document_route};

use pages::NewDocumentForm;

const HEADERS_PREFIX: &str = "/headers/";

/// Default cap on form bodies.
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Shared state of the HTTP layer.
#[derive(Debug)]
pub struct App {
    wiki: Arc<Wiki>,
    allow_stale_reads: bool,
    body_limit: usize,
}

impl App {
    /// Serve `wiki`. With `allow_stale_reads` set, views never wait for an
    /// index rebuild.
    #[must_use]
    pub const fn new(wiki: Arc<Wiki>, allow_stale_reads: bool) -> Self {
        Self {
            wiki,
            allow_stale_reads,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Refuse form bodies larger than `bytes`.
    #[must_use]
    pub const fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// The wiki being served.
    #[must_use]
    pub fn wiki(&self) -> &Wiki {
        &self.wiki
    }
}

/// Answer one request. Never fails: errors become HTML error pages.
pub async fn handle(app: Arc<App>, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match route(&app, req).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    };

    info!("{method} {path} -> {}", response.status().as_u16());
    response
}

async fn route(app: &App, req: Request<Body>) -> Result<Response<Body>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let allow_stale = app.allow_stale_reads || allow_stale_requested(req.uri().query());
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, [""]) => {
            let ids = app.wiki.list_documents().await?;
            Ok(response::html(StatusCode::OK, pages::index_page(&ids)))
        },
        (&Method::GET, ["view", dir, name]) => {
            let id = document_id(dir, name)?;
            let linked = app.wiki.linked_markdown(&id, allow_stale).await?;
            Ok(response::html(StatusCode::OK, pages::view_page(&id, &linked)))
        },
        (&Method::GET, ["edit", dir, name]) => {
            let id = document_id(dir, name)?;
            let content = match app.wiki.read_document(&id).await {
                Ok(text) => text,
                Err(e) if e.is_not_found() => String::new(),
                Err(e) => return Err(e),
            };
            Ok(response::html(StatusCode::OK, pages::edit_page(&id, &content)))
        },
        (&Method::POST, ["edit", dir, name]) => {
            let id = document_id(dir, name)?;
            let mut form = read_form(req, app.body_limit).await?;
            let content = normalize_newlines(&form.remove("content").unwrap_or_default());
            app.wiki.write_document(&id, &content).await?;
            Ok(response::redirect(&document_route(VIEW_ROUTE_PREFIX, &id)))
        },
        (&Method::GET, ["new"]) => Ok(response::html(
            StatusCode::OK,
            pages::new_page(&NewDocumentForm::default(), None),
        )),
        (&Method::POST, ["new"]) => create(app, req).await,
        (&Method::GET, ["confirm_delete", dir, name]) => {
            let id = document_id(dir, name)?;
            if !app.wiki.store().exists(&id).await? {
                return Err(Error::NotFound(id.to_string()));
            }
            Ok(response::html(StatusCode::OK, pages::confirm_delete_page(&id)))
        },
        (&Method::POST, ["delete", dir, name]) => {
            let id = document_id(dir, name)?;
            app.wiki.delete_document(&id).await?;
            Ok(response::redirect("/"))
        },
        (&Method::GET, ["headers", ..]) => {
            let raw = path.strip_prefix(HEADERS_PREFIX).unwrap_or_default();
            let heading = decode_route_segment(raw)?;
            let markdown = app.wiki.header_page_markdown(&heading, allow_stale).await?;
            Ok(response::html(
                StatusCode::OK,
                pages::header_page(&heading, &markdown),
            ))
        },
        _ => Ok(response::html(
            StatusCode::NOT_FOUND,
            to_html("# Page Not Found", None),
        )),
    }
}

async fn create(app: &App, req: Request<Body>) -> Result<Response<Body>> {
    let mut fields = read_form(req, app.body_limit).await?;
    let mut take = |key: &str| fields.remove(key).unwrap_or_default();
    let form = NewDocumentForm {
        dir: take("dir").trim().to_string(),
        name: take("name").trim().to_string(),
        content: normalize_newlines(&take("content")),
    };

    let id = match DocumentId::new(form.dir.as_str(), form.name.as_str()) {
        Ok(id) => id,
        Err(e) => {
            return Ok(response::html(
                StatusCode::BAD_REQUEST,
                pages::new_page(&form, Some(&e.to_string())),
            ));
        },
    };

    match app.wiki.create_document(&id, &form.content).await {
        Ok(()) => Ok(response::redirect(&document_route(VIEW_ROUTE_PREFIX, &id))),
        Err(e @ Error::AlreadyExists(_)) => Ok(response::html(
            StatusCode::CONFLICT,
            pages::new_page(&form, Some(&e.to_string())),
        )),
        Err(e) => Err(e),
    }
}

fn document_id(dir: &str, name: &str) -> Result<DocumentId> {
    DocumentId::new(decode_route_segment(dir)?, decode_route_segment(name)?)
}

fn allow_stale_requested(query: Option<&str>) -> bool {
    query.is_some_and(|q| {
        form_urlencoded::parse(q.as_bytes())
            .any(|(key, value)| key == "allow_stale" && matches!(value.as_ref(), "true" | "1"))
    })
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

async fn read_form(req: Request<Body>, limit: usize) -> Result<HashMap<String, String>> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(Error::PayloadTooLarge(limit));
    }

    // Chunked bodies carry no length, so the cap is enforced while reading too.
    let mut body = req.into_body();
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk =
            chunk.map_err(|e| Error::Other(format!("Failed to read request body: {e}")))?;
        if bytes.len() + chunk.len() > limit {
            return Err(Error::PayloadTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(form_urlencoded::parse(&bytes).into_owned().collect())
}

fn error_response(err: &Error) -> Response<Body> {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if matches!(err, Error::PayloadTooLarge(_)) {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if matches!(err, Error::AlreadyExists(_)) {
        StatusCode::CONFLICT
    } else {
        error!("Request failed ({}): {err}", err.category());
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let message = if err.is_not_found() {
        "Page not found :(".to_string()
    } else {
        err.to_string()
    };
    response::error_page(status, &message)
}

//! HTML pages served by the router.
//!
//! Document bodies go through the markdown renderer; everything else is a
//! small hand-written form. Every interpolated value is escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};
use hyper::StatusCode;
use std::collections::BTreeMap;
use wiki_core::render::{markdown_to_html, page, page_title};
use wiki_core::wiki::VIEW_ROUTE_PREFIX;
use wiki_core::{DocumentId, document_route};

/// Values of the create-document form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDocumentForm {
    pub dir: String,
    pub name: String,
    pub content: String,
}

fn nav(document: Option<&DocumentId>) -> String {
    let mut links = String::from("<nav><a href=\"/\">All pages</a><a href=\"/new\">New page</a>");
    if let Some(id) = document {
        links.push_str(&format!(
            "<a href=\"{}\">View</a><a href=\"{}\">Edit</a><a href=\"{}\">Delete</a>",
            encode_double_quoted_attribute(&document_route(VIEW_ROUTE_PREFIX, id)),
            encode_double_quoted_attribute(&document_route("/edit", id)),
            encode_double_quoted_attribute(&document_route("/confirm_delete", id)),
        ));
    }
    links.push_str("</nav><hr>");
    links
}

/// Every document, grouped by directory.
pub fn index_page(ids: &[DocumentId]) -> String {
    let mut groups: BTreeMap<&str, Vec<&DocumentId>> = BTreeMap::new();
    for id in ids {
        groups.entry(id.dir()).or_default().push(id);
    }

    let mut body = nav(None);
    body.push_str("<h1>All pages</h1>");
    if groups.is_empty() {
        body.push_str("<p>No pages yet. <a href=\"/new\">Create one</a>.</p>");
    }
    for (dir, ids) in groups {
        body.push_str(&format!("<h2>{}</h2><ul>", encode_text(dir)));
        for id in ids {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(&document_route(VIEW_ROUTE_PREFIX, id)),
                encode_text(id.name())
            ));
        }
        body.push_str("</ul>");
    }
    page("All pages", &body)
}

/// A cross-linked document.
pub fn view_page(id: &DocumentId, linked_markdown: &str) -> String {
    let title = page_title(linked_markdown, None);
    let body = format!("{}{}", nav(Some(id)), markdown_to_html(linked_markdown));
    page(&title, &body)
}

/// Sections sharing one heading text.
pub fn header_page(heading: &str, markdown: &str) -> String {
    let body = format!("{}{}", nav(None), markdown_to_html(markdown));
    page(&page_title(markdown, Some(heading)), &body)
}

/// Editor for an existing or not yet created document.
pub fn edit_page(id: &DocumentId, content: &str) -> String {
    let body = format!(
        "{}<h1>Editing {}</h1>\
         <form method=\"post\" action=\"{}\">\
         <textarea name=\"content\" autofocus>{}</textarea>\
         <p><button type=\"submit\">Save</button></p>\
         </form>",
        nav(Some(id)),
        encode_text(&id.to_string()),
        encode_double_quoted_attribute(&document_route("/edit", id)),
        encode_text(content),
    );
    page(&format!("Editing {id}"), &body)
}

/// Form creating a document, optionally with an error from a failed attempt.
pub fn new_page(form: &NewDocumentForm, error: Option<&str>) -> String {
    let error = error
        .map(|msg| format!("<p class=\"error\"><strong>{}</strong></p>", encode_text(msg)))
        .unwrap_or_default();
    let body = format!(
        "{}<h1>New page</h1>{error}\
         <form method=\"post\" action=\"/new\">\
         <p><input name=\"dir\" placeholder=\"directory\" value=\"{}\" required>\
         <input name=\"name\" placeholder=\"name\" value=\"{}\" required></p>\
         <textarea name=\"content\">{}</textarea>\
         <p><button type=\"submit\">Create</button></p>\
         </form>",
        nav(None),
        encode_double_quoted_attribute(&form.dir),
        encode_double_quoted_attribute(&form.name),
        encode_text(&form.content),
    );
    page("New page", &body)
}

/// Asks before deleting a document.
pub fn confirm_delete_page(id: &DocumentId) -> String {
    let body = format!(
        "{}<h1>Delete {}?</h1>\
         <form method=\"post\" action=\"{}\">\
         <button type=\"submit\">Delete</button> <a href=\"{}\">Cancel</a>\
         </form>",
        nav(Some(id)),
        encode_text(&id.to_string()),
        encode_double_quoted_attribute(&document_route("/delete", id)),
        encode_double_quoted_attribute(&document_route(VIEW_ROUTE_PREFIX, id)),
    );
    page(&format!("Delete {id}"), &body)
}

/// Generic failure page.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "{}<h1>{}</h1><p>{}</p>",
        nav(None),
        encode_text(reason),
        encode_text(message)
    );
    page(reason, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> DocumentId {
        raw.parse().expect("valid id")
    }

    #[test]
    fn test_index_page_groups_by_dir() {
        let html = index_page(&[id("b/two"), id("a/one"), id("b/three")]);
        let a = html.find("<h2>a</h2>").expect("dir a");
        let b = html.find("<h2>b</h2>").expect("dir b");
        assert!(a < b);
        assert!(html.contains("<a href=\"/view/a/one\">one</a>"));
    }

    #[test]
    fn test_empty_index_page() {
        assert!(index_page(&[]).contains("No pages yet"));
    }

    #[test]
    fn test_edit_page_escapes_content() {
        let html = edit_page(&id("a/foo"), "</textarea><script>");
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(html.contains("action=\"/edit/a/foo\""));
    }

    #[test]
    fn test_new_page_keeps_values_and_error() {
        let form = NewDocumentForm {
            dir: "a\"b".into(),
            name: "c".into(),
            content: "body".into(),
        };
        let html = new_page(&form, Some("Already exists: a/c"));
        assert!(html.contains("value=\"a&quot;b\""));
        assert!(html.contains("Already exists: a/c"));
    }

    #[test]
    fn test_view_page_title() {
        let html = view_page(&id("a/foo"), "# [Intro](/headers/Intro)\nbody");
        assert!(html.contains("<title>Intro</title>"));
        assert!(html.contains("href=\"/confirm_delete/a/foo\""));
    }

    #[test]
    fn test_error_page() {
        let html = error_page(StatusCode::NOT_FOUND, "Page not found :(");
        assert!(html.contains("<h1>Not Found</h1>"));
        assert!(html.contains("Page not found :("));
    }
}

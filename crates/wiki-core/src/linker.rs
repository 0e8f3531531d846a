//! Cross-linking of known headings.
//!
//! Every case-insensitive occurrence of an indexed heading text is rewritten
//! into a markdown link to the heading lookup route, keeping the matched
//! casing as the link label.
//!
//! Keys are applied one after another, in index order, to the same evolving
//! string. A later key can therefore match inside markup produced for an
//! earlier one (for example a heading named `headers` matches the
//! `/headers/...` target of every link already inserted). The order of keys
//! in the index is part of the observable output.

use crate::{DocumentId, Error, HeaderIndex, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::{Captures, Regex, RegexBuilder};
use std::borrow::Cow;
use tracing::warn;

/// Path prefix of the heading lookup route.
pub const HEADER_ROUTE_PREFIX: &str = "/headers/";

// Unreserved characters plus `!*'` stay literal. Parentheses are encoded so
// the link target never unbalances markdown's `(...)` destination.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'');

/// Lookup route for `heading`: `/headers/<percent-encoded heading>`.
#[must_use]
pub fn header_route(heading: &str) -> String {
    format!(
        "{HEADER_ROUTE_PREFIX}{}",
        utf8_percent_encode(heading, PATH_SEGMENT)
    )
}

/// Route for a document under `prefix`, e.g. `/view/notes/rust%20tips`.
#[must_use]
pub fn document_route(prefix: &str, id: &DocumentId) -> String {
    format!(
        "{}/{}/{}",
        prefix.trim_end_matches('/'),
        utf8_percent_encode(id.dir(), PATH_SEGMENT),
        utf8_percent_encode(id.name(), PATH_SEGMENT)
    )
}

/// Percent-decode one URL path segment.
///
/// # Errors
///
/// Returns [`Error::InvalidRoute`] if the decoded bytes are not UTF-8.
pub fn decode_route_segment(segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| Error::InvalidRoute(format!("{segment}: {e}")))
}

/// Compiled matchers for every non-empty heading text of an index, in index
/// order.
///
/// Built once per index state by [`HeaderIndex::link_matchers`] and thrown
/// away whenever the index gains or loses a reference.
#[derive(Debug, Clone, Default)]
pub struct LinkMatchers {
    matchers: Vec<(Regex, String)>,
}

impl LinkMatchers {
    /// Compile a case-insensitive literal matcher per heading text.
    ///
    /// Empty texts never match and are left out. A text whose pattern cannot
    /// be compiled (for instance one exceeding the regex size limit) is
    /// skipped with a warning.
    pub fn compile<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut matchers = Vec::new();
        for key in keys {
            if key.is_empty() {
                continue;
            }
            match RegexBuilder::new(&regex::escape(key))
                .case_insensitive(true)
                .build()
            {
                Ok(matcher) => matchers.push((matcher, header_route(key))),
                Err(e) => warn!("Skipping heading {key:?} for cross-linking: {e}"),
            }
        }
        Self { matchers }
    }

    /// Number of compiled matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether no heading can match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Rewrite `markdown`, one matcher after another.
    #[must_use]
    pub fn apply(&self, markdown: &str) -> String {
        let mut text = markdown.to_string();
        for (matcher, route) in &self.matchers {
            let replaced = matcher.replace_all(&text, |caps: &Captures<'_>| {
                format!("[{}]({route})", &caps[0])
            });
            if let Cow::Owned(rewritten) = replaced {
                text = rewritten;
            }
        }
        text
    }
}

/// Link every occurrence of every indexed heading text in `markdown`.
///
/// Matching is literal and case-insensitive. An empty heading text never
/// matches. Uses the matchers cached on `index`.
///
/// ```rust
/// use wiki_core::{DocumentId, HeaderIndex, add_header_links};
///
/// let mut index = HeaderIndex::new();
/// index.reindex_document(&"a/foo".parse::<DocumentId>()?, "# Intro\nHello\n");
///
/// assert_eq!(
///     add_header_links("See the intro.", &index),
///     "See the [intro](/headers/Intro)."
/// );
/// # Ok::<(), wiki_core::Error>(())
/// ```
#[must_use]
pub fn add_header_links(markdown: &str, index: &HeaderIndex) -> String {
    index.link_matchers().apply(markdown)
}

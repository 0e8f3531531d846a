use crate::storage::DocumentStore;
use crate::{HeaderRef, Result};

/// Read the text a header reference points at.
///
/// The owning document is read fresh, so the result reflects the current
/// text. Offsets captured before an edit may no longer line up; they are
/// clamped instead of failing (see [`section_slice`]).
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] if the document no longer exists, or the
/// store's I/O error.
pub async fn read_header_ref(store: &dyn DocumentStore, reference: &HeaderRef) -> Result<String> {
    let text = store.read_text(&reference.document).await?;
    Ok(section_slice(&text, reference.start, reference.end).to_string())
}

/// `text[start..end]` with out-of-range offsets clamped.
///
/// `end` is limited to the text length and `start` to `end`; both are then
/// moved back to the nearest character boundary. A reference into a document
/// that shrank therefore yields a truncated or empty string.
#[must_use]
pub fn section_slice(text: &str, start: usize, end: usize) -> &str {
    let end = floor_char_boundary(text, end.min(text.len()));
    let start = floor_char_boundary(text, start.min(end));
    &text[start..end]
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

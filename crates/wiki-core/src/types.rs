use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier of a wiki document: a directory segment and a name segment.
///
/// Rendered and parsed as `dir/name`. Both segments are validated so that an
/// identifier can always be joined onto the content root without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    dir: String,
    name: String,
}

impl DocumentId {
    /// Build an identifier from its two segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocumentId`] if either segment is empty, starts
    /// with `.`, or contains `..`, `/`, `\` or NUL.
    pub fn new(dir: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        let name = name.into();
        validate_segment(&dir)?;
        validate_segment(&name)?;
        Ok(Self { dir, name })
    }

    /// Directory segment.
    #[must_use]
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::InvalidDocumentId(
            "path segments cannot be empty".into(),
        ));
    }

    if segment.contains("..") || segment.contains('/') || segment.contains('\\') {
        return Err(Error::InvalidDocumentId(format!(
            "'{segment}' contains path traversal characters"
        )));
    }

    if segment.starts_with('.') || segment.contains('\0') {
        return Err(Error::InvalidDocumentId(format!(
            "'{segment}' contains invalid filesystem characters"
        )));
    }

    Ok(())
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (dir, name) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidDocumentId(format!("'{s}' is not of the form dir/name")))?;
        Self::new(dir, name)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dir, self.name)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One markdown heading together with the body it introduces.
///
/// `start..end` is a byte range into the document text as it was when the
/// section was scanned. The range begins at the first `#` of the heading line
/// and stops right before the next heading of the same or a shallower level,
/// or at the end of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingSection {
    /// Document the section was scanned from.
    pub document: DocumentId,
    /// Heading level, 1 through 6.
    pub level: usize,
    /// Byte offset of the first `#` of the heading line.
    pub start: usize,
    /// Byte offset one past the end of the section.
    pub end: usize,
    /// Heading text after the marker and its separating space.
    pub text: String,
}

impl HeadingSection {
    /// Lightweight pointer to this section.
    #[must_use]
    pub fn to_ref(&self) -> HeaderRef {
        HeaderRef {
            document: self.document.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Pointer into a heading section of a document. Does not copy any text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderRef {
    /// Owning document.
    pub document: DocumentId,
    /// Byte offset where the section starts.
    pub start: usize,
    /// Byte offset one past the end of the section.
    pub end: usize,
}

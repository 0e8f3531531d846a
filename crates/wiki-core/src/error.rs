//! Error types and handling for wiki-core operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`], whose error
//! side is the [`Error`] enum below. Errors are grouped into a small number of
//! categories so the HTTP layer can pick a status code and the CLI can print a
//! stable label without matching on every variant.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading, writing or listing documents on disk
//! - **Not Found**: a document that no longer exists
//! - **Invalid Identifier**: a `dir/name` path that fails validation
//! - **Configuration Errors**: unreadable or malformed config files
//! - **Serialization Errors**: TOML/JSON conversion failures
//!
//! ```rust
//! use wiki_core::{Error, Result};
//!
//! fn describe(result: Result<String>) -> String {
//!     match result {
//!         Ok(text) => text,
//!         Err(e) if e.is_not_found() => "gone".to_string(),
//!         Err(e) => format!("{} error: {e}", e.category()),
//!     }
//! }
//!
//! assert_eq!(describe(Err(Error::NotFound("a/b".into()))), "gone");
//! ```

use thiserror::Error;

/// The main error type for wiki-core operations.
///
/// `Display` gives a short user-facing message; `Debug` keeps the full source
/// chain for logs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers directory listing and file reads/writes performed by the
    /// filesystem document store. Missing documents are reported as
    /// [`Error::NotFound`] instead.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested document was not found.
    ///
    /// Returned when resolving a header reference or reading a document for
    /// scanning after it has been deleted.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A document that was meant to be created already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A document identifier failed validation.
    ///
    /// ## Common Causes
    ///
    /// - More or fewer than two `/`-separated segments
    /// - Empty segments
    /// - Path traversal attempts (`..`, leading `.`, backslashes)
    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A percent-encoded route segment could not be decoded.
    #[error("Invalid route segment: {0}")]
    InvalidRoute(String),

    /// A request body exceeded the accepted size, in bytes.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether this error means the requested document does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error was caused by bad caller input rather than the
    /// environment (used by the HTTP layer to answer 400 instead of 500).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDocumentId(_) | Self::InvalidRoute(_))
    }

    /// Get the error category as a string identifier.
    ///
    /// - `"io"` - File system operations
    /// - `"not_found"` - Missing documents
    /// - `"already_exists"` - Creation of an existing document
    /// - `"invalid_id"` - Document identifier validation
    /// - `"config"` - Configuration and settings
    /// - `"serialization"` - Data format conversion
    /// - `"invalid_route"` - Undecodable URL segments
    /// - `"too_large"` - Oversized request bodies
    /// - `"other"` - Uncategorized errors
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidDocumentId(_) => "invalid_id",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::InvalidRoute(_) => "invalid_route",
            Self::PayloadTooLarge(_) => "too_large",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

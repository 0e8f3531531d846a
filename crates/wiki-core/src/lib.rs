//! # wiki-core
//!
//! Header indexing and cross-linking for a markdown personal wiki.
//!
//! Documents are plain markdown files addressed as `dir/name`. Every heading
//! in every document is indexed by its text, and when a document is viewed
//! each occurrence of a known heading is turned into a link to a page that
//! shows all sections carrying that heading.
//!
//! ## Architecture
//!
//! - **Parsing**: [`scan_headings`] finds ATX headings and the byte range of
//!   the section each one opens
//! - **Indexing**: [`HeaderIndex`] maps heading text to section references,
//!   in first-insertion order
//! - **Resolving**: [`read_header_ref`] turns a reference back into text
//! - **Linking**: [`add_header_links`] rewrites heading occurrences into links
//! - **Storage**: the [`DocumentStore`] trait, with [`FsStore`] on disk and
//!   [`MemoryStore`] for tests
//! - **Context**: [`Wiki`] ties store and index together and tracks whether
//!   the index is stale
//!
//! ## Quick Start
//!
//! ```rust
//! use wiki_core::{DocumentId, HeaderIndex, Result, add_header_links, scan_headings};
//!
//! let id: DocumentId = "notes/rust".parse()?;
//! let text = "# Ownership\nMoves and borrows.\n## Lifetimes\nScopes.\n";
//!
//! let sections = scan_headings(&id, text);
//! assert_eq!(sections.len(), 2);
//!
//! let mut index = HeaderIndex::new();
//! for section in &sections {
//!     index.insert(section);
//! }
//! assert_eq!(
//!     add_header_links("Lifetimes matter.", &index),
//!     "[Lifetimes](/headers/Lifetimes) matter."
//! );
//! # Ok::<(), wiki_core::Error>(())
//! ```

/// Configuration file and environment overrides
pub mod config;
/// Error types and result aliases
pub mod error;
/// Heading text to section reference index
pub mod index;
/// Cross-linking of heading occurrences and route helpers
pub mod linker;
/// Heading scanner
pub mod parser;
/// Markdown to HTML rendering
pub mod render;
/// Reading the text a header reference points at
pub mod resolver;
/// Document storage backends
pub mod storage;
/// Core data types
pub mod types;
/// Store, index and freshness tracking
pub mod wiki;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use index::{HeaderIndex, PopulateStats};
pub use linker::{
    LinkMatchers, add_header_links, decode_route_segment, document_route, header_route,
};
pub use parser::scan_headings;
pub use resolver::read_header_ref;
pub use storage::{DocumentStore, FsStore, MemoryStore};
pub use types::*;
pub use wiki::{ResolvedHeader, Wiki};

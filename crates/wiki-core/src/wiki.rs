//! The wiki context: document store, header index and its freshness.
//!
//! A [`Wiki`] is created once at startup and passed to every handler. It is
//! the only owner of the [`HeaderIndex`]; all mutation goes through the single
//! `RwLock` around it, so there is exactly one writer at a time.
//!
//! ## Freshness
//!
//! The index is either fresh or stale. Writing or deleting a document purges
//! that document's references right away and marks the index stale. A read
//! that does not opt out of staleness rebuilds the whole index before serving;
//! a read that opts out serves whatever the index currently holds.
//!
//! A rebuild reads documents without holding the lock and swaps the result in
//! at the end. If a document changed while the rebuild was running the index
//! stays stale, so the next strict read rebuilds again.

use crate::index::{DEFAULT_SCAN_CONCURRENCY, HeaderIndex, PopulateStats};
use crate::linker::{add_header_links, document_route};
use crate::resolver::read_header_ref;
use crate::storage::DocumentStore;
use crate::{DocumentId, Error, HeaderRef, Result};
use html_escape::encode_text;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

/// Route prefix of rendered documents.
pub const VIEW_ROUTE_PREFIX: &str = "/view";

/// A header reference together with the text it currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    /// Where the section lives.
    pub reference: HeaderRef,
    /// Section text read from the document.
    pub text: String,
}

/// Shared state of a running wiki.
pub struct Wiki {
    store: Arc<dyn DocumentStore>,
    index: RwLock<HeaderIndex>,
    stale: AtomicBool,
    // Bumped on every write/delete, under the index write lock.
    generation: AtomicU64,
    scan_concurrency: usize,
}

impl std::fmt::Debug for Wiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("stale", &self.is_stale())
            .field("scan_concurrency", &self.scan_concurrency)
            .finish_non_exhaustive()
    }
}

impl Wiki {
    /// Open a wiki over `store` and build the initial index.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while enumerating or reading documents.
    pub async fn open(store: Arc<dyn DocumentStore>) -> Result<Self> {
        Self::with_concurrency(store, DEFAULT_SCAN_CONCURRENCY).await
    }

    /// Like [`Wiki::open`] with an explicit number of concurrent reads per
    /// rebuild.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while enumerating or reading documents.
    pub async fn with_concurrency(
        store: Arc<dyn DocumentStore>,
        scan_concurrency: usize,
    ) -> Result<Self> {
        let mut index = HeaderIndex::new();
        index.populate(store.as_ref(), scan_concurrency).await?;
        Ok(Self {
            store,
            index: RwLock::new(index),
            stale: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            scan_concurrency,
        })
    }

    /// Underlying document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Whether documents changed since the last completed rebuild.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Read access to the current index.
    pub async fn index(&self) -> RwLockReadGuard<'_, HeaderIndex> {
        self.index.read().await
    }

    /// Rebuild the index from every document and swap it in.
    ///
    /// # Errors
    ///
    /// Returns the first enumeration or read error; the current index is kept
    /// and stays stale in that case.
    pub async fn refresh(&self) -> Result<PopulateStats> {
        let generation = self.generation.load(Ordering::SeqCst);

        let mut fresh = HeaderIndex::new();
        let stats = fresh.populate(self.store.as_ref(), self.scan_concurrency).await?;

        let mut index = self.index.write().await;
        *index = fresh;
        if self.generation.load(Ordering::SeqCst) == generation {
            self.stale.store(false, Ordering::SeqCst);
        } else {
            debug!("Documents changed during rebuild; index stays stale");
        }
        drop(index);

        Ok(stats)
    }

    /// Rebuild first if the index is stale, unless `allow_stale` is set.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Wiki::refresh`].
    pub async fn ensure_fresh(&self, allow_stale: bool) -> Result<()> {
        if !self.is_stale() {
            return Ok(());
        }
        if allow_stale {
            debug!("Serving from stale header index");
            return Ok(());
        }
        info!("Header index is stale, rebuilding");
        self.refresh().await.map(|_| ())
    }

    /// Identifiers of every stored document.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        self.store.list_documents().await
    }

    /// Raw text of a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing document.
    pub async fn read_document(&self, id: &DocumentId) -> Result<String> {
        self.store.read_text(id).await
    }

    /// Text of `id` with every known heading cross-linked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing document, or a rebuild error.
    pub async fn linked_markdown(&self, id: &DocumentId, allow_stale: bool) -> Result<String> {
        self.ensure_fresh(allow_stale).await?;
        let text = self.store.read_text(id).await?;
        let index = self.index.read().await;
        Ok(add_header_links(&text, &index))
    }

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Propagates store errors; the index is untouched if the write fails.
    pub async fn write_document(&self, id: &DocumentId, text: &str) -> Result<()> {
        self.store.write_text(id, text).await?;
        self.invalidate(id).await;
        info!("Saved {id} ({} bytes)", text.len());
        Ok(())
    }

    /// Create a document that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the document exists.
    pub async fn create_document(&self, id: &DocumentId, text: &str) -> Result<()> {
        if self.store.exists(id).await? {
            return Err(Error::AlreadyExists(id.to_string()));
        }
        self.write_document(id, text).await
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the document does not exist.
    pub async fn delete_document(&self, id: &DocumentId) -> Result<()> {
        self.store.delete(id).await?;
        self.invalidate(id).await;
        info!("Deleted {id}");
        Ok(())
    }

    async fn invalidate(&self, id: &DocumentId) {
        let mut index = self.index.write().await;
        index.purge_by_path(id);
        self.stale.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Every section whose heading text is exactly `heading`, with its text.
    ///
    /// Returns `None` if no such heading is indexed. References whose
    /// document disappeared in the meantime are skipped.
    ///
    /// # Errors
    ///
    /// Propagates rebuild errors and store errors other than not-found.
    pub async fn lookup_headers(
        &self,
        heading: &str,
        allow_stale: bool,
    ) -> Result<Option<Vec<ResolvedHeader>>> {
        self.ensure_fresh(allow_stale).await?;
        let refs = self.index.read().await.get(heading).map(<[HeaderRef]>::to_vec);
        let Some(refs) = refs else {
            return Ok(None);
        };

        let mut resolved = Vec::with_capacity(refs.len());
        for reference in refs {
            match read_header_ref(self.store.as_ref(), &reference).await {
                Ok(text) => resolved.push(ResolvedHeader { reference, text }),
                Err(e) if e.is_not_found() => {
                    warn!("Skipping reference into missing document {}", reference.document);
                },
                Err(e) => return Err(e),
            }
        }
        Ok(Some(resolved))
    }

    /// Markdown of the heading lookup page for `heading`.
    ///
    /// Unknown headings produce a "Something went wrong" page rather than an
    /// error.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Wiki::lookup_headers`].
    pub async fn header_page_markdown(&self, heading: &str, allow_stale: bool) -> Result<String> {
        let resolved = self
            .lookup_headers(heading, allow_stale)
            .await?
            .unwrap_or_default();
        if resolved.is_empty() {
            return Ok(missing_header_page(heading));
        }

        let mut page = String::new();
        for header in &resolved {
            let id = &header.reference.document;
            page.push_str(&format!(
                "> From [{id}]({})\n\n{}\n\n---\n\n",
                document_route(VIEW_ROUTE_PREFIX, id),
                header.text.trim_end()
            ));
        }
        Ok(page)
    }
}

fn missing_header_page(heading: &str) -> String {
    format!(
        "# Something went wrong\n\nNo section is titled \u{201c}{}\u{201d}.\n\n[Back to all pages](/)\n",
        encode_text(heading)
    )
}

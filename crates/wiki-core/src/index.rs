//! In-memory header index.
//!
//! Maps heading text to every place that heading occurs across all
//! documents. The index is derived state: it is never persisted and can be
//! rebuilt from the document store at any time with [`HeaderIndex::populate`].
//!
//! Keys are kept in first-insertion order because the cross-linker rewrites
//! text one key at a time in iteration order. References under a key keep
//! discovery order (enumeration order of documents, then position within the
//! document).

use crate::linker::LinkMatchers;
use crate::storage::DocumentStore;
use crate::{DocumentId, HeaderRef, HeadingSection, Result, scan_headings};
use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::pin::pin;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default number of documents read concurrently during population.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 8;

/// Mapping from heading text to the sections carrying that text.
///
/// Invariant: a key is present only while at least one reference is stored
/// under it. [`HeaderIndex::purge_by_path`] prunes keys it empties.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    entries: IndexMap<String, Vec<HeaderRef>>,
    // Compiled on first use, reset whenever `entries` changes.
    matchers: OnceCell<LinkMatchers>,
}

/// Summary of a population run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateStats {
    /// Documents enumerated and scanned.
    pub documents: usize,
    /// Headings found across those documents.
    pub sections: usize,
    /// References newly added (duplicates of stored references are skipped).
    pub inserted: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl HeaderIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh index from every document in `store`.
    ///
    /// # Errors
    ///
    /// Returns the first enumeration or read error.
    pub async fn build(store: &dyn DocumentStore, concurrency: usize) -> Result<Self> {
        let mut index = Self::new();
        index.populate(store, concurrency).await?;
        Ok(index)
    }

    /// Add a section under its heading text.
    ///
    /// Returns `false` when an equal reference (same document, start and end)
    /// is already stored under that text, in which case nothing changes.
    pub fn insert(&mut self, section: &HeadingSection) -> bool {
        let reference = section.to_ref();
        let refs = self.entries.entry(section.text.clone()).or_default();
        if refs.contains(&reference) {
            return false;
        }
        refs.push(reference);
        self.matchers.take();
        true
    }

    /// Scan every document the store enumerates and insert its sections.
    ///
    /// Up to `concurrency` documents are read at once, but sections are
    /// inserted in enumeration order. Stored references are not removed, so a
    /// changed document must be purged first (or use
    /// [`HeaderIndex::reindex_document`]). Repeated calls over an unchanged
    /// document set leave the index as it is.
    ///
    /// # Errors
    ///
    /// Returns the first enumeration or read error. Documents processed before
    /// the failure stay in the index.
    pub async fn populate(
        &mut self,
        store: &dyn DocumentStore,
        concurrency: usize,
    ) -> Result<PopulateStats> {
        let started = Instant::now();
        let ids = store.list_documents().await?;
        let documents = ids.len();

        let mut reads = pin!(
            stream::iter(ids)
                .map(|id| async move {
                    let text = store.read_text(&id).await?;
                    Ok::<_, crate::Error>((id, text))
                })
                .buffered(concurrency.max(1))
        );

        let mut sections = 0;
        let mut inserted = 0;
        while let Some((id, text)) = reads.try_next().await? {
            let found = scan_headings(&id, &text);
            debug!("Scanned {id}: {} headings", found.len());
            sections += found.len();
            for section in &found {
                if self.insert(section) {
                    inserted += 1;
                }
            }
        }

        let stats = PopulateStats {
            documents,
            sections,
            inserted,
            elapsed: started.elapsed(),
        };
        info!(
            "Indexed {} headings from {} documents ({} keys) in {:?}",
            stats.sections,
            stats.documents,
            self.len(),
            stats.elapsed
        );
        Ok(stats)
    }

    /// Replace every reference of `document` with the sections of `text`.
    ///
    /// Returns the number of sections inserted.
    pub fn reindex_document(&mut self, document: &DocumentId, text: &str) -> usize {
        self.purge_by_path(document);
        scan_headings(document, text)
            .iter()
            .filter(|section| self.insert(section))
            .count()
    }

    /// Remove every reference belonging to `document`, dropping keys that
    /// end up empty. Surviving keys keep their relative order.
    ///
    /// Returns the number of references removed; purging a document with no
    /// references is a no-op returning `0`.
    pub fn purge_by_path(&mut self, document: &DocumentId) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, refs| {
            let before = refs.len();
            refs.retain(|r| &r.document != document);
            removed += before - refs.len();
            !refs.is_empty()
        });
        if removed > 0 {
            self.matchers.take();
            debug!("Purged {removed} header references for {document}");
        }
        removed
    }

    /// Cross-link matchers for the current keys, compiled on first use.
    pub fn link_matchers(&self) -> &LinkMatchers {
        self.matchers
            .get_or_init(|| LinkMatchers::compile(self.entries.keys().map(String::as_str)))
    }

    /// References stored under exactly `heading` (case-sensitive).
    #[must_use]
    pub fn get(&self, heading: &str) -> Option<&[HeaderRef]> {
        self.entries.get(heading).map(Vec::as_slice)
    }

    /// Whether `heading` is a key.
    #[must_use]
    pub fn contains_key(&self, heading: &str) -> bool {
        self.entries.contains_key(heading)
    }

    /// Heading texts in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(heading, references)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HeaderRef])> {
        self.entries
            .iter()
            .map(|(key, refs)| (key.as_str(), refs.as_slice()))
    }

    /// Number of distinct heading texts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of stored references across all keys.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn id(raw: &str) -> DocumentId {
        raw.parse().expect("valid id")
    }

    async fn store_with(docs: &[(&str, &str)]) -> MemoryStore {
        let store = MemoryStore::new();
        for (raw, text) in docs {
            store.write_text(&id(raw), text).await.expect("write");
        }
        store
    }

    #[tokio::test]
    async fn test_populate_indexes_all_documents() {
        let store = store_with(&[
            ("a/foo", "# Intro\nHello world\n## Details\nMore.\n"),
            ("b/bar", "# Intro\nAnother intro\n"),
        ])
        .await;

        let mut index = HeaderIndex::new();
        let stats = index.populate(&store, 2).await.expect("populate");

        assert_eq!(stats.documents, 2);
        assert_eq!(stats.sections, 3);
        assert_eq!(stats.inserted, 3);
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["Intro", "Details"]);

        let intro = index.get("Intro").expect("Intro indexed");
        assert_eq!(intro.len(), 2);
        assert_eq!(intro[0].document, id("a/foo"));
        assert_eq!(intro[1].document, id("b/bar"));
        assert_eq!(index.get("intro"), None, "keys are case-sensitive");
    }

    #[tokio::test]
    async fn test_populate_twice_is_idempotent() {
        let store = store_with(&[("a/foo", "# Intro\nx\n## Details\ny\n")]).await;

        let mut index = HeaderIndex::new();
        index.populate(&store, 1).await.expect("first populate");
        let again = index.populate(&store, 1).await.expect("second populate");

        assert_eq!(again.inserted, 0);
        assert_eq!(index.reference_count(), 2);
    }

    #[tokio::test]
    async fn test_populate_propagates_read_errors() {
        let store = store_with(&[("a/foo", "# Intro\n")]).await;
        store.fail_reads_of(&id("a/foo")).await;

        let mut index = HeaderIndex::new();
        let err = index.populate(&store, 4).await.expect_err("read failure");
        assert_eq!(err.category(), "io");
    }

    #[tokio::test]
    async fn test_build_on_empty_store() {
        let store = MemoryStore::new();
        let index = HeaderIndex::build(&store, DEFAULT_SCAN_CONCURRENCY)
            .await
            .expect("build");
        assert!(index.is_empty());
    }

    #[test]
    fn test_purge_removes_document_and_prunes_keys() {
        let mut index = HeaderIndex::new();
        index.reindex_document(&id("a/foo"), "# Intro\nHello world\n## Details\nMore.\n");
        assert_eq!(index.len(), 2);

        let removed = index.purge_by_path(&id("a/foo"));
        assert_eq!(removed, 2);
        assert!(index.is_empty());
        assert!(!index.contains_key("Intro"));
        assert!(!index.contains_key("Details"));
    }

    #[test]
    fn test_purge_is_idempotent_and_scoped() {
        let mut index = HeaderIndex::new();
        index.reindex_document(&id("a/foo"), "# Shared\n# Only Foo\n");
        index.reindex_document(&id("b/bar"), "# Shared\n");

        assert_eq!(index.purge_by_path(&id("a/foo")), 2);
        assert_eq!(index.purge_by_path(&id("a/foo")), 0);
        assert_eq!(index.purge_by_path(&id("z/none")), 0);

        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["Shared"]);
        assert_eq!(index.get("Shared").expect("kept").len(), 1);
    }

    #[test]
    fn test_purge_keeps_order_of_surviving_keys() {
        let mut index = HeaderIndex::new();
        index.reindex_document(&id("a/one"), "# A\n# B\n");
        index.reindex_document(&id("a/two"), "# C\n# A\n# D\n");

        index.purge_by_path(&id("a/one"));
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["A", "C", "D"]);
    }

    #[test]
    fn test_purge_then_reindex_restores_references() {
        let text = "# Intro\nbody\n## Details\nmore\n# Outro\n";
        let mut index = HeaderIndex::new();
        index.reindex_document(&id("a/foo"), text);
        index.reindex_document(&id("b/bar"), "# Intro\n");
        let before: Vec<(String, Vec<HeaderRef>)> = index
            .iter()
            .map(|(k, refs)| (k.to_string(), refs.to_vec()))
            .collect();

        index.purge_by_path(&id("a/foo"));
        index.reindex_document(&id("a/foo"), text);

        for (key, refs) in before {
            let mut expected = refs;
            let mut got = index.get(&key).expect("key restored").to_vec();
            expected.sort_by_key(|r| (r.document.clone(), r.start));
            got.sort_by_key(|r| (r.document.clone(), r.start));
            assert_eq!(got, expected, "references for {key}");
        }
    }

    #[test]
    fn test_insert_skips_equal_references() {
        let section = HeadingSection {
            document: id("a/foo"),
            level: 1,
            start: 0,
            end: 10,
            text: "Intro".into(),
        };
        let mut index = HeaderIndex::new();
        assert!(index.insert(&section));
        assert!(!index.insert(&section.clone()));
        assert_eq!(index.reference_count(), 1);
    }

    #[test]
    fn test_empty_heading_is_indexed() {
        let mut index = HeaderIndex::new();
        index.reindex_document(&id("a/foo"), "# \nbody\n");
        assert!(index.contains_key(""));
    }
}

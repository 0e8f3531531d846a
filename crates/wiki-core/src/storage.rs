//! Document storage.
//!
//! The header engine only needs to enumerate documents and read their text;
//! the HTTP handlers additionally write and delete. Both go through the
//! [`DocumentStore`] trait so the engine can run against the filesystem in
//! production and an in-memory map in tests.

use crate::{DocumentId, Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// File extension of stored documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Backing store for wiki documents.
///
/// Enumeration is finite and can be restarted by calling
/// [`DocumentStore::list_documents`] again. Implementations treat every read
/// as a snapshot.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Identifiers of every stored document.
    async fn list_documents(&self) -> Result<Vec<DocumentId>>;

    /// Full text of a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the document does not exist.
    async fn read_text(&self, id: &DocumentId) -> Result<String>;

    /// Create or replace a document.
    async fn write_text(&self, id: &DocumentId, text: &str) -> Result<()>;

    /// Remove a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the document does not exist.
    async fn delete(&self, id: &DocumentId) -> Result<()>;

    /// Whether a document exists.
    async fn exists(&self, id: &DocumentId) -> Result<bool>;
}

/// Documents stored as `<root>/<dir>/<name>.md` files.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `id`.
    #[must_use]
    pub fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.root
            .join(id.dir())
            .join(format!("{}.{DOCUMENT_EXTENSION}", id.name()))
    }

    fn not_found(id: &DocumentId, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::NotFound(id.to_string())
        } else {
            Error::Io(err)
        }
    }
}

fn visible_name(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    (!name.starts_with('.')).then_some(name)
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        let mut ids = Vec::new();

        let mut dirs = match fs::read_dir(&self.root).await {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Content root {} does not exist", self.root.display());
                return Ok(ids);
            },
            Err(e) => return Err(e.into()),
        };

        while let Some(dir) = dirs.next_entry().await? {
            if !dir.file_type().await?.is_dir() {
                continue;
            }
            let dir_path = dir.path();
            let Some(dir_name) = visible_name(&dir_path) else {
                continue;
            };

            let mut files = fs::read_dir(&dir_path).await?;
            while let Some(file) = files.next_entry().await? {
                let file_path = file.path();
                if !file.file_type().await?.is_file()
                    || file_path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION)
                {
                    continue;
                }
                let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if stem.starts_with('.') {
                    continue;
                }
                match DocumentId::new(dir_name, stem) {
                    Ok(id) => ids.push(id),
                    Err(e) => debug!("Skipping {}: {e}", file_path.display()),
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn read_text(&self, id: &DocumentId) -> Result<String> {
        fs::read_to_string(self.document_path(id))
            .await
            .map_err(|e| Self::not_found(id, e))
    }

    async fn write_text(&self, id: &DocumentId, text: &str) -> Result<()> {
        let path = self.document_path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, text).await?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        fs::remove_file(self.document_path(id))
            .await
            .map_err(|e| Self::not_found(id, e))
    }

    async fn exists(&self, id: &DocumentId) -> Result<bool> {
        Ok(fs::try_exists(self.document_path(id)).await?)
    }
}

/// Documents held in memory, ordered by identifier.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<DocumentId, String>>,
    failing: RwLock<HashSet<DocumentId>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later read of `id` fail with an I/O error.
    pub async fn fail_reads_of(&self, id: &DocumentId) {
        self.failing.write().await.insert(id.clone());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }

    async fn read_text(&self, id: &DocumentId) -> Result<String> {
        if self.failing.read().await.contains(id) {
            return Err(Error::Io(io::Error::other(format!("read of {id} failed"))));
        }
        self.documents
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn write_text(&self, id: &DocumentId, text: &str) -> Result<()> {
        self.documents
            .write()
            .await
            .insert(id.clone(), text.to_string());
        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.documents
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn exists(&self, id: &DocumentId) -> Result<bool> {
        Ok(self.documents.read().await.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(raw: &str) -> DocumentId {
        raw.parse().expect("valid id")
    }

    fn create_test_store() -> (FsStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FsStore::new(temp_dir.path().join("content"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_fs_roundtrip() {
        let (store, _tmp) = create_test_store();
        let doc = id("notes/rust");

        store.write_text(&doc, "# Rust\n").await.expect("write");
        assert!(store.exists(&doc).await.expect("exists"));
        assert_eq!(store.read_text(&doc).await.expect("read"), "# Rust\n");
        assert!(store.document_path(&doc).ends_with("notes/rust.md"));

        store.delete(&doc).await.expect("delete");
        assert!(!store.exists(&doc).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_fs_missing_document_is_not_found() {
        let (store, _tmp) = create_test_store();
        let err = store.read_text(&id("a/missing")).await.expect_err("missing");
        assert!(err.is_not_found());
        let err = store.delete(&id("a/missing")).await.expect_err("missing");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fs_list_documents_skips_noise() {
        let (store, tmp) = create_test_store();
        store.write_text(&id("b/two"), "2").await.expect("write");
        store.write_text(&id("a/one"), "1").await.expect("write");

        let root = tmp.path().join("content");
        std::fs::write(root.join("a/notes.txt"), "not markdown").expect("write txt");
        std::fs::write(root.join("a/.draft.md"), "hidden").expect("write hidden");
        std::fs::write(root.join("stray.md"), "top level").expect("write stray");
        std::fs::create_dir_all(root.join(".git")).expect("mkdir");
        std::fs::write(root.join(".git/HEAD.md"), "x").expect("write git");

        let ids = store.list_documents().await.expect("list");
        assert_eq!(ids, vec![id("a/one"), id("b/two")]);
    }

    #[tokio::test]
    async fn test_fs_list_missing_root_is_empty() {
        let (store, _tmp) = create_test_store();
        assert!(store.list_documents().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_contract() {
        let store = MemoryStore::new();
        let doc = id("a/foo");
        assert!(store.read_text(&doc).await.expect_err("empty").is_not_found());

        store.write_text(&doc, "text").await.expect("write");
        assert_eq!(store.list_documents().await.expect("list"), vec![doc.clone()]);

        store.fail_reads_of(&doc).await;
        assert_eq!(
            store.read_text(&doc).await.expect_err("failing").category(),
            "io"
        );

        store.delete(&doc).await.expect("delete");
        assert!(store.delete(&doc).await.expect_err("gone").is_not_found());
    }
}

//! Command implementations for the wiki CLI
//!
//! Each command lives in its own submodule and exposes an `execute` function.

mod headers;
mod lookup;
mod serve;

pub use headers::execute as list_headers;
pub use lookup::execute as lookup_heading;
pub use serve::execute as serve;

use anyhow::{Context, Result};
use std::sync::Arc;
use wiki_core::{Config, FsStore, Wiki};

/// Open the wiki rooted at the configured content directory and build its
/// header index.
pub(crate) async fn open_wiki(config: &Config) -> Result<Arc<Wiki>> {
    let store = Arc::new(FsStore::new(&config.content.root));
    let wiki = Wiki::with_concurrency(store, config.index.scan_concurrency)
        .await
        .with_context(|| {
            format!(
                "Failed to index documents under {}",
                config.content.root.display()
            )
        })?;
    Ok(Arc::new(wiki))
}

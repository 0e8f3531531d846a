//! wiki - markdown personal wiki with cross-linked headings
//!
//! Thin entry point; everything lives in the `wiki_server` library so the
//! integration tests can drive the HTTP layer directly.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wiki_server::run().await
}

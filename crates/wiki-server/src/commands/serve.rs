//! Serve the wiki over HTTP

use anyhow::{Context, Result, anyhow};
use hyper::Server;
use hyper::service::{make_service_fn, service_fn};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{info, warn};
use wiki_core::Config;

use crate::commands::open_wiki;
use crate::http::{self, App};

/// Execute the serve command
pub async fn execute(config: &Config) -> Result<()> {
    let wiki = open_wiki(config).await?;
    let app = Arc::new(App::new(wiki, config.index.allow_stale_reads));

    let host = config.server.host.as_str();
    let addr = tokio::net::lookup_host((host, config.server.port))
        .await
        .with_context(|| format!("Failed to resolve {host}"))?
        .next()
        .ok_or_else(|| anyhow!("No address found for {host}"))?;

    let make_svc = make_service_fn(move |_conn| {
        let app = Arc::clone(&app);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let app = Arc::clone(&app);
                async move { Ok::<_, Infallible>(http::handle(app, req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {addr}"))?
        .serve(make_svc);

    info!(
        "Serving {} on http://{}",
        config.content.root.display(),
        server.local_addr()
    );

    server
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

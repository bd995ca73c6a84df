//! `scormdeck serve` - serve cached content to the player frame.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use scormdeck::config::ConfigFile;
use scormdeck::content::{content_router, ContentResolver};
use scormdeck::store::LocalPackageStore;

use crate::error::CliError;

pub async fn run(config: &ConfigFile) -> Result<(), CliError> {
    let addr: SocketAddr = config
        .content
        .listen
        .parse()
        .map_err(|e: std::net::AddrParseError| CliError::ListenAddr {
            addr: config.content.listen.clone(),
            reason: e.to_string(),
        })?;

    let store = Arc::new(LocalPackageStore::new(config.storage.directory.clone()));
    let resolver = Arc::new(ContentResolver::new(store, config.content.root.clone()));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, root = %config.content.root, "content server listening");
    println!(
        "Serving cached courses at http://{}/{}/<course-id>/... (ctrl-c to stop)",
        addr, config.content.root
    );

    axum::serve(listener, content_router(resolver))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down content server");
        })
        .await?;
    Ok(())
}

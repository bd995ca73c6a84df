//! CLI commands.
//!
//! Each command builds its collaborators from the loaded config and
//! delegates to the library; no business logic lives here.

pub mod courses;
pub mod download;
pub mod info;
pub mod remove;
pub mod serve;

use std::sync::Arc;
use std::time::Duration;

use scormdeck::catalog::HttpCatalog;
use scormdeck::config::ConfigFile;
use scormdeck::pipeline::HttpFetcher;
use scormdeck::player::Player;
use scormdeck::store::LocalPackageStore;

use crate::error::CliError;

/// Wire up a player against the configured backend and store.
pub fn build_player(config: &ConfigFile) -> Result<Player, CliError> {
    let store = Arc::new(LocalPackageStore::new(config.storage.directory.clone()));
    let catalog = HttpCatalog::new(config.backend.origin.clone())?;
    let fetcher = Arc::new(HttpFetcher::with_timeout(Duration::from_secs(
        config.download.timeout_secs,
    ))?);

    Ok(Player::new(
        store,
        Arc::new(catalog.clone()),
        Arc::new(catalog),
        fetcher,
        config.backend.origin.clone(),
        config.content.root.clone(),
    ))
}

/// Catalog client for commands that only need metadata.
pub fn build_catalog(config: &ConfigFile) -> Result<HttpCatalog, CliError> {
    Ok(HttpCatalog::new(config.backend.origin.clone())?)
}

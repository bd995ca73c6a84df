//! CLI error type.

use thiserror::Error;

use scormdeck::catalog::CatalogError;
use scormdeck::config::ConfigFileError;
use scormdeck::pipeline::FetchError;
use scormdeck::player::PlayerError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigFileError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("download client setup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid listen address {addr:?}: {reason}")]
    ListenAddr { addr: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! User configuration.
//!
//! Loads and saves `~/.scormdeck/config.ini` with sensible defaults:
//! the catalog backend origin, the package store directory, the content
//! server settings, and download behavior.

mod file;

pub use file::{
    config_directory, config_file_path, default_storage_directory, BackendSettings,
    ConfigFile, ConfigFileError, ContentSettings, DownloadSettings, StorageSettings,
};

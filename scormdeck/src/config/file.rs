//! Configuration file handling for ~/.scormdeck/config.ini.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::content::DEFAULT_CONTENT_ROOT;

/// Default catalog backend origin.
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:4000";

/// Default address the content server binds.
pub const DEFAULT_CONTENT_LISTEN: &str = "127.0.0.1:8355";

/// Default whole-download timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file.
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write the config file.
    #[error("failed to write config file: {0}")]
    Write(String),

    /// Failed to create the config directory.
    #[error("failed to create config directory: {0}")]
    Directory(std::io::Error),
}

/// Catalog backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Origin course and package references are resolved against.
    pub origin: String,
}

/// Package store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Root directory of the local package store.
    pub directory: PathBuf,
}

/// Content server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    /// First segment of the synthetic content namespace.
    pub root: String,
    /// Bind address of the content server.
    pub listen: String,
}

/// Download settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Whole-download timeout in seconds.
    pub timeout_secs: u64,
}

/// The parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub backend: BackendSettings,
    pub storage: StorageSettings,
    pub content: ContentSettings,
    pub download: DownloadSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            backend: BackendSettings {
                origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            },
            storage: StorageSettings {
                directory: default_storage_directory(),
            },
            content: ContentSettings {
                root: DEFAULT_CONTENT_ROOT.to_string(),
                listen: DEFAULT_CONTENT_LISTEN.to_string(),
            },
            download: DownloadSettings {
                timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.scormdeck/config.ini).
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        Ok(Self::from_ini(&ini))
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::Directory)?;
        }
        let mut ini = Ini::new();
        ini.with_section(Some("backend"))
            .set("origin", self.backend.origin.as_str());
        ini.with_section(Some("storage"))
            .set("directory", self.storage.directory.display().to_string());
        ini.with_section(Some("content"))
            .set("root", self.content.root.as_str())
            .set("listen", self.content.listen.as_str());
        ini.with_section(Some("download"))
            .set("timeout", self.download.timeout_secs.to_string());
        ini.write_to_file(path)
            .map_err(|e| ConfigFileError::Write(e.to_string()))
    }

    fn from_ini(ini: &Ini) -> Self {
        let defaults = Self::default();
        Self {
            backend: BackendSettings {
                origin: ini
                    .get_from(Some("backend"), "origin")
                    .map(str::to_string)
                    .unwrap_or(defaults.backend.origin),
            },
            storage: StorageSettings {
                directory: ini
                    .get_from(Some("storage"), "directory")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.directory),
            },
            content: ContentSettings {
                root: ini
                    .get_from(Some("content"), "root")
                    .map(str::to_string)
                    .unwrap_or(defaults.content.root),
                listen: ini
                    .get_from(Some("content"), "listen")
                    .map(str::to_string)
                    .unwrap_or(defaults.content.listen),
            },
            download: DownloadSettings {
                timeout_secs: ini
                    .get_from(Some("download"), "timeout")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.download.timeout_secs),
            },
        }
    }
}

/// Path of the config directory (~/.scormdeck).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scormdeck")
}

/// Path of the config file (~/.scormdeck/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Default root directory of the local package store.
pub fn default_storage_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(config_directory)
        .join("scormdeck")
        .join("courses")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.backend.origin, DEFAULT_BACKEND_ORIGIN);
        assert_eq!(config.content.root, "scorm-content");
        assert_eq!(config.content.listen, DEFAULT_CONTENT_LISTEN);
        assert_eq!(config.download.timeout_secs, 300);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("missing.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.backend.origin = "http://courses.internal:9000".to_string();
        config.download.timeout_secs = 42;
        config.save_to(&path).unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[backend]\norigin = http://other:1234\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.backend.origin, "http://other:1234");
        assert_eq!(config.content.root, "scorm-content");
        assert_eq!(config.download.timeout_secs, 300);
    }

    #[test]
    fn test_unparsable_timeout_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[download]\ntimeout = soon\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.download.timeout_secs, 300);
    }
}

//! Configuration for the wiki server.
//!
//! Settings live in a TOML file. Lookup order:
//!
//! 1. An explicit path (the `--config` flag)
//! 2. The `WIKI_CONFIG` environment variable
//! 3. `config.toml` in the platform config directory
//!    (Linux: `~/.config/wiki/config.toml`)
//! 4. Built-in defaults
//!
//! After the file is loaded, `WIKI_CONTENT_DIR` and `WIKI_PORT` override the
//! corresponding values. Command-line flags are applied by the binary on top.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 7400
//!
//! [content]
//! root = "/home/user/wiki/content"
//!
//! [index]
//! allow_stale_reads = false
//! scan_concurrency = 8
//! ```

use crate::index::DEFAULT_SCAN_CONCURRENCY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WIKI_CONFIG";
/// Environment variable overriding `content.root`.
pub const CONTENT_DIR_ENV: &str = "WIKI_CONTENT_DIR";
/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "WIKI_PORT";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Listening address.
    pub server: ServerConfig,
    /// Where documents live.
    pub content: ContentConfig,
    /// Header index behaviour.
    pub index: IndexConfig,
}

/// Listening address of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7400,
        }
    }
}

/// Document storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding `<dir>/<name>.md` files.
    pub root: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
        }
    }
}

/// Header index settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Serve views from a stale index instead of rebuilding it first.
    ///
    /// Individual requests can still opt out with `?allow_stale=true`.
    pub allow_stale_reads: bool,

    /// Documents read concurrently while rebuilding the index.
    pub scan_concurrency: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            allow_stale_reads: false,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load configuration following the lookup order in the module docs,
    /// then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, if any config
    /// file cannot be read or parsed, or if an override value is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// `config.toml` in the platform config directory, if one can be found.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "wiki", "wiki")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var(CONTENT_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                self.content.root = PathBuf::from(trimmed);
            }
        }

        if let Ok(port) = std::env::var(PORT_ENV) {
            let trimmed = port.trim();
            if !trimmed.is_empty() {
                self.server.port = trimmed
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid {PORT_ENV} '{trimmed}': {e}")))?;
            }
        }

        Ok(())
    }
}

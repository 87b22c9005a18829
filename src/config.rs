//! Configuration file handling.
//!
//! This module provides loading and saving of debdeps configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/debdeps/config.toml`
//! - macOS: `~/Library/Application Support/debdeps/config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "multiline"
//! symbols_dir = "/srv/chroot/bookworm/var/lib/dpkg/info"
//! architecture = "arm64"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration.
///
/// Every field has a default, so a missing or partial config file works.
///
/// # Example
///
/// ```no_run
/// use debdeps::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
/// println!("Default format: {}", config.default_format);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "oneline", "multiline", "json", "table"
    /// Default: "oneline"
    pub default_format: String,

    /// Directory holding `<package>:<architecture>.symbols` files.
    ///
    /// Default: `/var/lib/dpkg/info`. Point this elsewhere when resolving
    /// against a chroot or a test fixture.
    pub symbols_dir: Option<PathBuf>,

    /// Architecture to resolve for, e.g. `amd64`.
    ///
    /// Default: taken from `DEB_HOST_ARCH`/`DEB_BUILD_ARCH`, falling back
    /// to `dpkg --print-architecture`.
    pub architecture: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "oneline".to_string(),
            symbols_dir: None,
            architecture: None,
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use debdeps::Config;
    ///
    /// let config = Config::load()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use debdeps::Config;
    ///
    /// let path = Config::config_path();
    /// println!("Config file: {}", path.display());
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("debdeps")
            .join("config.toml")
    }
}

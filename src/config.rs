//! Configuration file support for playlist-watcher.
//!
//! Settings come from a TOML file, can be overridden from the environment
//! (`CREDENTIALS_PATH`, `TOKEN_PATH`, `CACHE_DIR`), and finally from the
//! command line.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Path to the OAuth client credentials JSON file
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Path where the OAuth token is stored
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Directory holding the playlist and video caches
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(".credentials/oauth.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".credentials/token.json")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
            cache_dir: default_cache_dir(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/playlist-watcher/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("playlist-watcher");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> crate::error::Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from environment variables.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from))
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        if let Some(path) = lookup("CREDENTIALS_PATH") {
            self.credentials_path = path;
        }
        if let Some(path) = lookup("TOKEN_PATH") {
            self.token_path = path;
        }
        if let Some(path) = lookup("CACHE_DIR") {
            self.cache_dir = path;
        }
        self
    }

    /// Resolve relative paths against the current working directory.
    pub fn resolved(mut self) -> io::Result<Self> {
        let cwd = env::current_dir()?;
        for path in [
            &mut self.credentials_path,
            &mut self.token_path,
            &mut self.cache_dir,
        ] {
            if path.is_relative() {
                *path = cwd.join(&*path);
            }
        }
        Ok(self)
    }
}

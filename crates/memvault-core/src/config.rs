//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the backend URL and the last used username.
//!
//! Configuration is stored at `~/.config/memvault/config.json`. The
//! `MEMVAULT_API_URL` and `MEMVAULT_USERNAME` environment variables take
//! precedence over the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::DEFAULT_API_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "memvault";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment override for the backend URL
pub const ENV_API_URL: &str = "MEMVAULT_API_URL";

/// Environment override for the prefilled username
pub const ENV_USERNAME: &str = "MEMVAULT_USERNAME";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Backend URL: environment, then config file, then the built-in default
    pub fn api_base_url(&self) -> String {
        Self::resolve(
            std::env::var(ENV_API_URL).ok(),
            self.api_base_url.clone(),
            DEFAULT_API_BASE_URL,
        )
    }

    /// Username to prefill the login form with
    pub fn prefill_username(&self) -> String {
        Self::resolve(std::env::var(ENV_USERNAME).ok(), self.last_username.clone(), "")
    }

    fn resolve(env: Option<String>, file: Option<String>, default: &str) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| file.filter(|v| !v.trim().is_empty()))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    }
}

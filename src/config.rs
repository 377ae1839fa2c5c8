//! Client configuration management.
//!
//! This module handles loading and saving the client configuration,
//! which covers the API base URL override and the last email used to
//! sign in.
//!
//! Configuration is stored at `~/.config/routy/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "routy";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Durable session bucket file name
const SESSION_FILE: &str = "session.json";

/// Production API endpoint used when no override is configured.
const DEFAULT_API_BASE_URL: &str = "https://api.routy.app";

/// Environment variable overriding the API base URL.
const API_URL_ENV: &str = "ROUTY_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
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

    /// Resolve the API base URL: explicit config value, then the
    /// environment, then the production default.
    pub fn base_url(&self) -> String {
        self.api_base_url
            .clone()
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Where the durable session bucket lives.
    pub fn session_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(SESSION_FILE))
    }
}

//! Configuration Management
//!
//! Handles persistent configuration storage for idmctl.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the directory URL
pub const HOST_ENV: &str = "IDMCTL_HOST";

/// Environment variable overriding the access token
pub const TOKEN_ENV: &str = "IDMCTL_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the directory API
    #[serde(default)]
    pub host: Option<String>,
    /// Bearer token for API calls
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("idmctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse config JSON, falling back to defaults when it is corrupt
    pub fn parse(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_default()
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective host (CLI > environment > config)
    pub fn effective_host(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, std::env::var(HOST_ENV).ok(), self.host.clone())
    }

    /// Get effective token (CLI > environment > config)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, std::env::var(TOKEN_ENV).ok(), self.access_token.clone())
    }

    /// Set host and save
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        self.host = Some(host.to_string());
        self.save()
    }

    /// Set token and save
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.access_token = Some(token.to_string());
        self.save()
    }
}

/// First non-empty value, in CLI > env > file order
fn pick(cli: Option<&str>, env: Option<String>, file: Option<String>) -> Option<String> {
    let set = |v: &String| !v.is_empty();
    cli.map(str::to_string)
        .filter(set)
        .or_else(|| env.filter(set))
        .or_else(|| file.filter(set))
}

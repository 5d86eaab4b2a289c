//! Optional on-disk configuration, merged with CLI flags (CLI always wins).
//!
//! Absence of a config file — or of `--config` altogether — is not an
//! error; built-in defaults apply.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub router: RouterConfig,
    pub log: LogConfig,
    pub default_headers: HashMap<String, String>,
}

impl Config {
    /// Loads configuration from `path`, if given and present. A missing
    /// `path` (or a `None`) is not an error — it just means "use defaults".
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("could not read {}: {e}", path.display())))?;

        Ok(toml::from_str(&text)?)
    }

    pub fn log_level(&self) -> log::Level {
        match self.log.level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

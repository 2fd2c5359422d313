//! Engine Configuration
//!
//! Loaded from a JSON file; every field has a default so `{}` is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_OFFLINE: &str = "PDFTEMPLATE_OFFLINE";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "PDFTEMPLATE_FETCH_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    /// Whether base documents may be fetched over the network.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_true() -> bool { true }
fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String {
    format!("pdftemplate-core/{}", crate::ENGINE_VERSION)
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reads `path` if given, else defaults, then applies environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_OFFLINE) {
            match value.as_str() {
                "1" | "true" => self.fetch.enabled = false,
                "0" | "false" | "" => {}
                _ => return Err(ConfigError::InvalidEnv { key: ENV_OFFLINE, value }),
            }
        }
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            self.fetch.timeout_secs = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: ENV_FETCH_TIMEOUT_SECS, value })?;
        }
        Ok(())
    }
}

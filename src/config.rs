use anyhow::{bail, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const ENDPOINT_ENV: &str = "SUPABASE_URL";
const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted store.
    pub endpoint: String,
    /// Anonymous access key sent with every request.
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_random_rpc")]
    pub random_rpc: String,
}

fn default_table() -> String {
    "irish_names".to_string()
}

fn default_random_rpc() -> String {
    "get_random_name".to_string()
}

impl StoreConfig {
    /// Endpoint with any trailing slash or `/rest/v1` suffix trimmed, so
    /// both the bare project URL and the REST URL are accepted.
    pub fn normalized_endpoint(&self) -> String {
        let trimmed = self.endpoint.trim_end_matches('/');
        trimmed.strip_suffix("/rest/v1").unwrap_or(trimmed).to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load_default() -> Result<Self> {
        let default = include_str!("../config/default.toml");
        let cfg: AppConfig = toml::from_str(default)?;
        Ok(cfg)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let p = path.into();
        let s = fs::read_to_string(&p)?;
        let cfg: AppConfig = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Overlay connection parameters from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            self.store.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var(ANON_KEY_ENV) {
            self.store.anon_key = key;
        }
    }

    /// Both connection parameters are required at startup.
    pub fn validate(&self) -> Result<()> {
        if self.store.endpoint.trim().is_empty() {
            bail!("store endpoint is not configured; set {} or edit the config file", ENDPOINT_ENV);
        }
        if self.store.anon_key.trim().is_empty() {
            bail!("store access key is not configured; set {} or edit the config file", ANON_KEY_ENV);
        }
        Ok(())
    }
}

//! Server configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `THEMIS_*` environment variables (`__` separates nested keys), then
//! `VENICE_API_KEY` as a shorthand for `provider.api_key`.

use std::net::SocketAddr;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default Venice API base URL
pub const DEFAULT_PROVIDER_URL: &str = "https://api.venice.ai/api/v1";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Browser origins allowed to call the relay
    pub allowed_origins: Vec<String>,
    /// Echo provider/exception detail to clients in error responses
    pub expose_error_details: bool,
    /// Image provider settings
    pub provider: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            allowed_origins: vec!["http://localhost:5174".to_string()],
            expose_error_details: true,
            provider: ProviderConfig::default(),
        }
    }
}

/// Image provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Build the layered figment for an optional config file
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("THEMIS_").split("__"))
            .merge(
                Env::raw()
                    .only(&["VENICE_API_KEY"])
                    .map(|_| "provider.api_key".into()),
            )
    }

    /// Load configuration from defaults, file and environment
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}

//! Daemon configuration
//!
//! Layered loading: built-in defaults, then an optional TOML file, then
//! IMGD_-prefixed environment variables. The upstream credential comes from
//! GEMINI_API_KEY only and never passes through file config.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// Base URL of the generative language API
    pub upstream_url: String,
    /// Candidate models, tried in order until one succeeds
    pub models: Vec<String>,
    /// Timeout for each upstream attempt, in seconds
    pub request_timeout_secs: u64,
    /// Upstream API key, from the GEMINI_API_KEY environment variable
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            upstream_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: vec![
                "gemini-2.5-flash-image".to_string(),
                "gemini-2.0-flash-exp-image-generation".to_string(),
            ],
            request_timeout_secs: 60,
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file, and
    /// IMGD_-prefixed environment variables, in increasing precedence.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        let mut config: Config = figment.merge(Env::prefixed("IMGD_")).extract()?;
        config.api_key = std::env::var("GEMINI_API_KEY").ok();
        Ok(config)
    }
}

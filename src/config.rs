// src/config.rs
use crate::errors::{MapError, MapResult};
use reqwest::blocking::Client;
use std::time::Duration;

pub const DEFAULT_RESEARCH_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("estate_map/", env!("CARGO_PKG_VERSION"));

/// Runtime settings read from the environment.
///
/// Only the maps key matters for the map views, and its absence is not
/// fatal: map-dependent views render a placeholder instead.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub maps_api_key: Option<String>,
    pub research_api_url: String,
    pub bind_addr: String,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            maps_api_key: None,
            research_api_url: DEFAULT_RESEARCH_API_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!("Ignoring invalid HTTP_TIMEOUT_SECS={raw}");
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        Self {
            maps_api_key: non_empty("MAPS_API_KEY"),
            research_api_url: non_empty("RESEARCH_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.research_api_url),
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            http_timeout,
        }
    }

    /// The maps provider key, or the configuration error the map view shows inline.
    pub fn map_key(&self) -> MapResult<&str> {
        self.maps_api_key.as_deref().ok_or_else(|| {
            MapError::Config("MAPS_API_KEY is not set; the map is unavailable".into())
        })
    }

    pub fn http_client(&self) -> MapResult<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| MapError::Network(e.to_string()))
    }
}

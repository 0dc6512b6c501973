//! Client configuration for reaching the notes API.
//!
//! Front-ends build a `ClientConfig` from defaults, environment variables, or
//! their own persisted profiles, and hand it to `HttpGateway::new`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const API_URL_ENV: &str = "JOTTER_API_URL";
pub const TIMEOUT_ENV: &str = "JOTTER_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API base URL must not be empty")]
    EmptyBaseUrl,
    #[error("API base URL must include http:// or https:// (got '{0}')")]
    InvalidBaseUrl(String),
    #[error("Request timeout must be a positive number of seconds (got '{0}')")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Config pointing at an explicit base URL with the default timeout.
    pub fn with_base_url(url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(&url.into())?;
        Ok(Self {
            api_base_url,
            ..Self::default()
        })
    }

    /// Defaults overridden by `JOTTER_API_URL` / `JOTTER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = normalize_text_option(lookup(API_URL_ENV)) {
            config.api_base_url = normalize_base_url(&url)?;
        }
        if let Some(raw) = normalize_text_option(lookup(TIMEOUT_ENV)) {
            config.request_timeout_secs = parse_timeout(&raw)?;
        }
        Ok(config)
    }

    /// Base URL without a trailing slash, validated.
    pub fn base_url(&self) -> Result<String, ConfigError> {
        normalize_base_url(&self.api_base_url)
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let value =
        normalize_text_option(Some(raw.to_string())).ok_or(ConfigError::EmptyBaseUrl)?;
    if !is_http_url(&value) {
        return Err(ConfigError::InvalidBaseUrl(value));
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

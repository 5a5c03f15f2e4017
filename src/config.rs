// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! Values are read once at startup and handed to the services by value;
//! nothing in the core mutates them afterwards.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AUTH_BASE_URL: &str = "https://unsplash.com";
const DEFAULT_API_BASE_URL: &str = "https://api.unsplash.com";
const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const DEFAULT_SCOPE: &str = "public read_user write_likes";
const DEFAULT_PER_PAGE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_PATH: &str = ".image-feed/token.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the authorization server (authorize + token endpoints)
    pub auth_base_url: String,
    /// Base URL of the REST API
    pub api_base_url: String,
    /// OAuth client ID ("access key", public)
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI registered with the authorization server
    pub redirect_uri: String,
    /// Requested scopes, space-separated
    pub scope: String,
    /// Feed page size
    pub per_page: u32,
    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Duration,
    /// Where the CLI keeps its token between runs
    pub token_path: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            auth_base_url: "http://127.0.0.1:9".to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
            client_id: "test_access_key".to_string(),
            client_secret: "test_secret_key".to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            per_page: DEFAULT_PER_PAGE,
            request_timeout: Duration::from_secs(5),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local use.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            auth_base_url: env::var("IMAGE_FEED_AUTH_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_BASE_URL.to_string()),
            api_base_url: env::var("IMAGE_FEED_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            client_id: env::var("IMAGE_FEED_ACCESS_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IMAGE_FEED_ACCESS_KEY"))?,
            client_secret: env::var("IMAGE_FEED_SECRET_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IMAGE_FEED_SECRET_KEY"))?,
            redirect_uri: env::var("IMAGE_FEED_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string()),
            scope: env::var("IMAGE_FEED_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string()),
            per_page: parse_var("IMAGE_FEED_PER_PAGE", DEFAULT_PER_PAGE)?,
            request_timeout: Duration::from_secs(parse_var(
                "IMAGE_FEED_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            token_path: env::var("IMAGE_FEED_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH)),
        })
    }

    /// Config pointing both base URLs at one server (mock servers in tests).
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            auth_base_url: base_url.clone(),
            api_base_url: base_url,
            ..Self::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

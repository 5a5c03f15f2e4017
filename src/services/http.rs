// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP exchange primitive shared by all services.
//!
//! Handles:
//! - Building plain and bearer-authorized requests
//! - Classifying outcomes into success / HTTP status / transport failures
//! - Decoding JSON payloads with a distinct decode error

use bytes::Bytes;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, NetworkError};
use crate::models::AccessToken;

/// Longest error body we copy into the logs.
const MAX_LOGGED_BODY: usize = 512;

/// Thin wrapper over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpExchange {
    http: reqwest::Client,
}

impl HttpExchange {
    /// Create an exchange with the timeouts from `config`.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .user_agent(concat!("image-feed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NetworkError::from_reqwest)?;
        Ok(Self { http })
    }

    /// Wrap an existing client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Start an unauthenticated request.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Start a request carrying `Authorization: Bearer <token>`.
    pub fn authorized(&self, method: Method, url: Url, token: &AccessToken) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(token.as_str())
    }

    /// Send a request and return the body of a 2xx response.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Bytes, NetworkError> {
        let response = request.send().await.map_err(NetworkError::from_reqwest)?;
        let status = response.status();
        let url = response.url().clone();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                path = url.path(),
                body = %truncate(&body, MAX_LOGGED_BODY),
                "Request rejected"
            );
            return Err(NetworkError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(NetworkError::from_reqwest)?;
        tracing::debug!(
            status = status.as_u16(),
            path = url.path(),
            len = bytes.len(),
            "Request succeeded"
        );
        Ok(bytes)
    }

    /// Send a request and decode the 2xx body as JSON.
    pub async fn execute_typed<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %truncate(&String::from_utf8_lossy(&bytes), MAX_LOGGED_BODY),
                "Failed to decode response"
            );
            ApiError::Decode(e)
        })
    }
}

/// Join `path` onto a configured base URL, keeping any base path prefix.
pub fn endpoint(base: &str, path: &str) -> Result<Url, ApiError> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", joined, e)))
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by every network-facing operation.

use crate::services::token_store::TokenStoreError;

/// Outcome classification of a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The server answered with a status outside `200..300`.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Connectivity, timeout, or body-transfer failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request could not be built or the failure could not be classified.
    #[error("unknown network error")]
    Unknown,
}

impl NetworkError {
    /// Sort a reqwest failure into transport vs. unknown.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            tracing::error!(error = %err, "Failed to build request");
            return NetworkError::Unknown;
        }
        if let Some(status) = err.status() {
            return NetworkError::HttpStatus(status.as_u16());
        }
        NetworkError::Transport(err)
    }
}

/// Error returned by every public operation of the session and feed core.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authorization code was already used")]
    DuplicateCode,

    #[error("no access token available")]
    MissingCredential,

    #[error("superseded by a newer request")]
    Cancelled,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(NetworkError::HttpStatus(code)) => Some(*code),
            _ => None,
        }
    }

    /// True when the server rejected our credentials.
    ///
    /// Callers use this to drop the stored token and restart login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Errors raised locally before any request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ApiError::DuplicateCode | ApiError::MissingCredential)
    }
}

/// Result type alias for the core.
pub type Result<T> = std::result::Result<T, ApiError>;

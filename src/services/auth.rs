// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 authorization-code flow.
//!
//! Handles:
//! - Building the browser authorization URL
//! - Recognizing the native redirect and pulling out the code
//! - Exchanging the code for a bearer token, at most once per code
//! - Cancelling an exchange that a newer code superseded

use reqwest::Method;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::lock;
use crate::models::{AccessToken, OAuthTokenResponse};
use crate::services::http::{endpoint, HttpExchange};
use crate::services::inflight::{run_cancellable, InFlight, Ticket};
use crate::services::token_store::TokenStore;

/// Path of the redirect the authorization server sends the browser to.
pub const NATIVE_REDIRECT_PATH: &str = "/oauth/authorize/native";

const AUTHORIZE_PATH: &str = "oauth/authorize";
const TOKEN_PATH: &str = "oauth/token";
const GRANT_TYPE: &str = "authorization_code";

/// Where the login flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    /// A code was received and its exchange is in flight.
    Authorizing,
    /// The token is stored.
    Authenticated,
    Failed,
}

struct AuthInner {
    state: AuthState,
    /// Code of the exchange in flight.
    pending_code: Option<String>,
    /// Codes already exchanged, or superseded after their request went out.
    spent_codes: HashSet<String>,
    exchange: InFlight,
}

/// Owner of the login state machine.
#[derive(Clone)]
pub struct AuthSession {
    config: Arc<Config>,
    http: HttpExchange,
    tokens: Arc<dyn TokenStore>,
    inner: Arc<Mutex<AuthInner>>,
}

impl AuthSession {
    pub fn new(config: Arc<Config>, http: HttpExchange, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            http,
            tokens,
            inner: Arc::new(Mutex::new(AuthInner {
                state: AuthState::Idle,
                pending_code: None,
                spent_codes: HashSet::new(),
                exchange: InFlight::default(),
            })),
        }
    }

    pub fn state(&self) -> AuthState {
        lock(&self.inner).state
    }

    /// URL to open in the browser to start login.
    pub fn authorization_url(&self) -> Option<Url> {
        build_authorization_url(&self.config)
    }

    /// Exchange an authorization code for a token and store it.
    ///
    /// A code that is being exchanged, was exchanged successfully, or was
    /// superseded mid-exchange is rejected with [`ApiError::DuplicateCode`]
    /// without touching the network. A different code cancels the exchange
    /// in flight; that earlier caller gets [`ApiError::Cancelled`].
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<AccessToken> {
        let (ticket, cancel) = {
            let mut inner = lock(&self.inner);
            if inner.pending_code.as_deref() == Some(code) || inner.spent_codes.contains(code) {
                tracing::warn!(state = ?inner.state, "Rejecting reused authorization code");
                return Err(ApiError::DuplicateCode);
            }
            // The superseded request may already have reached the server.
            if let Some(previous) = inner.pending_code.take() {
                tracing::info!("New authorization code supersedes exchange in flight");
                inner.spent_codes.insert(previous);
            }
            let (ticket, cancel) = inner.exchange.begin();
            inner.pending_code = Some(code.to_string());
            inner.state = AuthState::Authorizing;
            (ticket, cancel)
        };

        let url = match endpoint(&self.config.auth_base_url, TOKEN_PATH) {
            Ok(url) => url,
            Err(e) => return self.complete(ticket, Err(e)),
        };
        let request = self.http.request(Method::POST, url).query(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", GRANT_TYPE),
        ]);

        tracing::info!("Exchanging authorization code for token");

        // The exchange runs detached so a dropped caller can't leave the
        // session stuck in `Authorizing`.
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let result = run_cancellable(
                &cancel,
                this.http.execute_typed::<OAuthTokenResponse>(request),
            )
            .await;
            this.complete(ticket, result)
        });

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ApiError::Cancelled),
        }
    }

    /// Apply the outcome of exchange `ticket`, unless it was superseded.
    fn complete(
        &self,
        ticket: Ticket,
        result: Result<OAuthTokenResponse>,
    ) -> Result<AccessToken> {
        let mut inner = lock(&self.inner);
        if !inner.exchange.finish(ticket) {
            tracing::debug!("Discarding superseded token exchange");
            return Err(ApiError::Cancelled);
        }

        // A code the server accepted is spent even if storing the token fails.
        if let Some(code) = inner.pending_code.take().filter(|_| result.is_ok()) {
            inner.spent_codes.insert(code);
        }

        let stored = result.and_then(|response| {
            self.tokens.set(&response.access_token)?;
            Ok(response.access_token)
        });

        match stored {
            Ok(token) => {
                inner.state = AuthState::Authenticated;
                tracing::info!("Token exchange succeeded, token stored");
                Ok(token)
            }
            Err(e) => {
                inner.state = AuthState::Failed;
                tracing::warn!(error = %e, "Token exchange failed");
                Err(e)
            }
        }
    }

    /// Forget the login: cancel any exchange, forget used codes and return
    /// to `Idle`.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        inner.exchange.cancel_current();
        inner.pending_code = None;
        inner.spent_codes.clear();
        inner.state = AuthState::Idle;
    }
}

/// Build the browser authorization URL, or `None` if the base URL is bad.
pub fn build_authorization_url(config: &Config) -> Option<Url> {
    let mut url = match endpoint(&config.auth_base_url, AUTHORIZE_PATH) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build authorization URL");
            return None;
        }
    };

    url.query_pairs_mut()
        .clear()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scope);
    Some(url)
}

/// Pull the authorization code out of the native redirect URL.
///
/// Any other URL yields `None`; that just means the user is still
/// navigating the login pages.
pub fn extract_code(redirect_url: &str) -> Option<String> {
    let url = Url::parse(redirect_url).ok()?;
    if url.path() != NATIVE_REDIRECT_PATH {
        return None;
    }

    let code = url
        .query_pairs()
        .find(|(name, _)| name == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    if code.is_some() {
        tracing::debug!("Authorization code received from redirect");
    }
    code
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, restore and logout across all session components.

use std::sync::Arc;
use url::Url;

use crate::error::Result;
use crate::models::{AccessToken, Profile};
use crate::services::auth::{extract_code, AuthSession};
use crate::services::feed::FeedStore;
use crate::services::profile::ProfileSession;
use crate::services::token_store::TokenStore;

/// Result of handing a navigated URL to [`SessionService::complete_login`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Not the native redirect; keep navigating.
    NotRedirect,
    LoggedIn(Profile),
}

#[derive(Clone)]
pub struct SessionService {
    tokens: Arc<dyn TokenStore>,
    auth: AuthSession,
    profile: ProfileSession,
    feed: FeedStore,
}

impl SessionService {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        auth: AuthSession,
        profile: ProfileSession,
        feed: FeedStore,
    ) -> Self {
        Self {
            tokens,
            auth,
            profile,
            feed,
        }
    }

    pub fn authorization_url(&self) -> Option<Url> {
        self.auth.authorization_url()
    }

    pub fn is_authorized(&self) -> bool {
        self.tokens.get().is_some()
    }

    /// Finish login from a URL the browser navigated to.
    ///
    /// Exchanges the code, then loads the profile and avatar. A failed
    /// avatar fetch does not fail the login.
    pub async fn complete_login(&self, redirect_url: &str) -> Result<LoginOutcome> {
        let Some(code) = extract_code(redirect_url) else {
            return Ok(LoginOutcome::NotRedirect);
        };

        let token = self.auth.exchange_code_for_token(&code).await?;
        let profile = self.load_profile(&token).await?;
        tracing::info!(username = %profile.username, "Login complete");
        Ok(LoginOutcome::LoggedIn(profile))
    }

    /// Load the profile for a token stored by an earlier run.
    ///
    /// Returns `None` when no token is stored.
    pub async fn restore(&self) -> Result<Option<Profile>> {
        let Some(token) = self.tokens.get() else {
            tracing::debug!("No stored token, login required");
            return Ok(None);
        };

        let profile = self.load_profile(&token).await?;
        tracing::info!(username = %profile.username, "Session restored");
        Ok(Some(profile))
    }

    async fn load_profile(&self, token: &AccessToken) -> Result<Profile> {
        let profile = self.profile.fetch_profile(token).await?;
        match self.profile.fetch_avatar_url(&profile.username, token).await {
            Ok(avatar) => Ok(Profile {
                avatar_url: Some(avatar),
                ..profile
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Continuing without avatar");
                Ok(profile)
            }
        }
    }

    /// Forget the token and every cached piece of session state.
    ///
    /// In-memory state is cleared even if removing the stored token fails;
    /// that failure is still returned.
    pub fn logout(&self) -> Result<()> {
        let cleared = self.tokens.clear();
        self.auth.reset();
        self.profile.clear();
        self.feed.clear();

        match cleared {
            Ok(()) => {
                tracing::info!("Logged out");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to remove stored token");
                Err(e.into())
            }
        }
    }
}

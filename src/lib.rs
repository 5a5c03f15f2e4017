// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Image-Feed: client core for a photo-sharing service
//!
//! This crate provides the OAuth2 login flow, the signed-in user's profile,
//! a paginated photo feed, and like toggling against the service's REST API.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod time_utils;

use std::sync::{Arc, Mutex, MutexGuard};

use config::Config;
use error::Result;
use services::{
    AuthSession, FeedStore, HttpExchange, LikeCoordinator, ProfileSession, SessionService,
    TokenStore,
};

/// Lock a component mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared application state.
///
/// Every component shares one HTTP client and one token store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<dyn TokenStore>,
    pub auth: AuthSession,
    pub profile: ProfileSession,
    pub feed: FeedStore,
    pub likes: LikeCoordinator,
    pub session: SessionService,
}

impl AppState {
    pub fn new(config: Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let config = Arc::new(config);
        let http = HttpExchange::new(&config)?;

        let auth = AuthSession::new(config.clone(), http.clone(), tokens.clone());
        let profile = ProfileSession::new(config.clone(), http.clone());
        let feed = FeedStore::new(config.clone(), http.clone(), tokens.clone());
        let likes = LikeCoordinator::new(config.clone(), http, tokens.clone(), feed.clone());
        let session = SessionService::new(
            tokens.clone(),
            auth.clone(),
            profile.clone(),
            feed.clone(),
        );

        Ok(Self {
            config,
            tokens,
            auth,
            profile,
            feed,
            likes,
            session,
        })
    }
}

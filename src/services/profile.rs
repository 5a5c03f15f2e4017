// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and avatar of the signed-in user.
//!
//! Only the most recent fetch of each kind matters: starting a new one
//! cancels the one in flight, and a late result from a cancelled fetch is
//! thrown away.

use reqwest::Method;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::events::{EventBus, ProfileEvent, Subscription, SubscriptionId};
use crate::lock;
use crate::models::{AccessToken, Profile, ProfileResult, UserResult};
use crate::services::http::{endpoint, HttpExchange};
use crate::services::inflight::{run_cancellable, InFlight};

const ME_PATH: &str = "me";

#[derive(Default)]
struct ProfileInner {
    profile: Option<Profile>,
    avatar_url: Option<Url>,
    profile_fetch: InFlight,
    avatar_fetch: InFlight,
}

/// Cached profile with change notifications.
#[derive(Clone)]
pub struct ProfileSession {
    config: Arc<Config>,
    http: HttpExchange,
    inner: Arc<Mutex<ProfileInner>>,
    events: Arc<EventBus<ProfileEvent>>,
}

impl ProfileSession {
    pub fn new(config: Arc<Config>, http: HttpExchange) -> Self {
        Self {
            config,
            http,
            inner: Arc::new(Mutex::new(ProfileInner::default())),
            events: Arc::new(EventBus::new()),
        }
    }

    pub fn profile(&self) -> Option<Profile> {
        lock(&self.inner).profile.clone()
    }

    pub fn avatar_url(&self) -> Option<Url> {
        lock(&self.inner).avatar_url.clone()
    }

    pub fn subscribe(&self) -> Subscription<ProfileEvent> {
        self.events.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Fetch `GET /me` and cache the result.
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<Profile> {
        let url = endpoint(&self.config.api_base_url, ME_PATH)?;
        let (ticket, cancel) = lock(&self.inner).profile_fetch.begin();

        let result = run_cancellable(
            &cancel,
            self.http
                .execute_typed::<ProfileResult>(self.http.authorized(Method::GET, url, token)),
        )
        .await;

        let mut inner = lock(&self.inner);
        if !inner.profile_fetch.finish(ticket) {
            tracing::debug!("Discarding superseded profile fetch");
            return Err(ApiError::Cancelled);
        }

        let mut profile = Profile::from(result.inspect_err(|e| {
            tracing::warn!(error = %e, "Profile fetch failed");
        })?);
        profile.avatar_url = inner.avatar_url.clone();

        tracing::info!(username = %profile.username, "Profile loaded");
        inner.profile = Some(profile.clone());
        self.events.emit(ProfileEvent::ProfileChanged(profile.clone()));
        Ok(profile)
    }

    /// Fetch `GET /users/{username}` and cache the large avatar URL.
    pub async fn fetch_avatar_url(&self, username: &str, token: &AccessToken) -> Result<Url> {
        let url = endpoint(
            &self.config.api_base_url,
            &format!("users/{}", urlencoding::encode(username)),
        )?;
        let (ticket, cancel) = lock(&self.inner).avatar_fetch.begin();

        let result = run_cancellable(
            &cancel,
            self.http
                .execute_typed::<UserResult>(self.http.authorized(Method::GET, url, token)),
        )
        .await;

        let mut inner = lock(&self.inner);
        if !inner.avatar_fetch.finish(ticket) {
            tracing::debug!("Discarding superseded avatar fetch");
            return Err(ApiError::Cancelled);
        }

        let user = result.inspect_err(|e| {
            tracing::warn!(error = %e, username, "Avatar fetch failed");
        })?;
        let avatar = Url::parse(&user.profile_image.large).map_err(|e| {
            ApiError::InvalidUrl(format!("avatar {:?}: {}", user.profile_image.large, e))
        })?;

        inner.avatar_url = Some(avatar.clone());
        if let Some(profile) = inner
            .profile
            .as_mut()
            .filter(|profile| profile.username == username)
        {
            profile.avatar_url = Some(avatar.clone());
        }

        tracing::info!(username, "Avatar URL updated");
        self.events.emit(ProfileEvent::AvatarChanged(avatar.clone()));
        Ok(avatar)
    }

    /// Drop cached values and cancel fetches in flight.
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.profile_fetch.cancel_current();
        inner.avatar_fetch.cancel_current();
        inner.profile = None;
        inner.avatar_url = None;
        self.events.emit(ProfileEvent::Cleared);
    }
}

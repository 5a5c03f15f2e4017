// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Like / unlike a photo and fold the confirmed state back into the feed.

use reqwest::Method;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::services::feed::FeedStore;
use crate::services::http::{endpoint, HttpExchange};
use crate::services::token_store::TokenStore;

#[derive(Clone)]
pub struct LikeCoordinator {
    config: Arc<Config>,
    http: HttpExchange,
    tokens: Arc<dyn TokenStore>,
    feed: FeedStore,
}

impl LikeCoordinator {
    pub fn new(
        config: Arc<Config>,
        http: HttpExchange,
        tokens: Arc<dyn TokenStore>,
        feed: FeedStore,
    ) -> Self {
        Self {
            config,
            http,
            tokens,
            feed,
        }
    }

    /// Set the like state of `photo_id` to `is_liked`.
    ///
    /// The feed is only touched after the server confirms; on error it is
    /// left exactly as it was. Calls for different photos run concurrently.
    pub async fn toggle_like(&self, photo_id: &str, is_liked: bool) -> Result<()> {
        let token = self.tokens.get().ok_or_else(|| {
            tracing::warn!(photo_id, "Like requested without a stored token");
            ApiError::MissingCredential
        })?;

        let url = endpoint(
            &self.config.api_base_url,
            &format!("photos/{}/like", urlencoding::encode(photo_id)),
        )?;
        let method = if is_liked {
            Method::POST
        } else {
            Method::DELETE
        };
        let request = self.http.authorized(method, url, &token);

        tracing::debug!(photo_id, is_liked, "Sending like change");

        // Detached so a confirmed change still reaches the feed if the
        // caller goes away.
        let this = self.clone();
        let photo_id = photo_id.to_string();
        let handle = tokio::spawn(async move {
            match this.http.execute(request).await {
                Ok(_) => {
                    if this.feed.apply_like_result(&photo_id, is_liked).is_none() {
                        tracing::info!(%photo_id, "Liked photo is no longer in the feed");
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!(%photo_id, is_liked, error = %e, "Like change failed");
                    Err(ApiError::from(e))
                }
            }
        });

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ApiError::Cancelled),
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated photo feed cache.
//!
//! Pages are fetched strictly one after another: while a page is in flight
//! further `fetch_next_page` calls are dropped (not queued), and a failed
//! page leaves the counter alone so the next call retries it. Records are
//! only ever appended, and each merge or like update is announced as a
//! [`FeedChangeEvent`] from inside the same critical section that made it.

use reqwest::{Method, RequestBuilder};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::events::{EventBus, FeedChangeEvent, Subscription, SubscriptionId};
use crate::lock;
use crate::models::{PhotoRecord, PhotoResult};
use crate::services::http::{endpoint, HttpExchange};
use crate::services::token_store::TokenStore;

const PHOTOS_PATH: &str = "photos";

/// What a `fetch_next_page` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// `page` was fetched and its new records landed at `range`.
    Loaded { page: u32, range: Range<usize> },
    /// Another page fetch was in flight; this call did nothing.
    AlreadyLoading,
}

#[derive(Default)]
struct FeedInner {
    photos: Vec<PhotoRecord>,
    ids: HashSet<String>,
    last_loaded_page: u32,
    is_loading: bool,
    /// Bumped by `clear`; page results from an older generation are dropped.
    generation: u64,
}

/// The feed cache. Cloning yields another handle to the same feed.
#[derive(Clone)]
pub struct FeedStore {
    config: Arc<Config>,
    http: HttpExchange,
    tokens: Arc<dyn TokenStore>,
    inner: Arc<Mutex<FeedInner>>,
    events: Arc<EventBus<FeedChangeEvent>>,
}

impl FeedStore {
    pub fn new(config: Arc<Config>, http: HttpExchange, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            http,
            tokens,
            inner: Arc::new(Mutex::new(FeedInner::default())),
            events: Arc::new(EventBus::new()),
        }
    }

    // ─── Snapshots ───────────────────────────────────────────────────────────

    pub fn photos(&self) -> Vec<PhotoRecord> {
        lock(&self.inner).photos.clone()
    }

    pub fn photo(&self, index: usize) -> Option<PhotoRecord> {
        lock(&self.inner).photos.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last page merged, 0 before the first one.
    pub fn last_loaded_page(&self) -> u32 {
        lock(&self.inner).last_loaded_page
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner).is_loading
    }

    /// True when `index` is the final record, i.e. time to load more.
    pub fn is_last_index(&self, index: usize) -> bool {
        let len = self.len();
        len > 0 && index == len - 1
    }

    pub fn subscribe(&self) -> Subscription<FeedChangeEvent> {
        self.events.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ─── Pagination ──────────────────────────────────────────────────────────

    /// Fetch and merge the page after the last one loaded.
    ///
    /// Returns [`FetchOutcome::AlreadyLoading`] without any request when a
    /// page is already in flight.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome> {
        let (page, generation) = {
            let mut inner = lock(&self.inner);
            if inner.is_loading {
                tracing::debug!("Page fetch already in flight, ignoring request");
                return Ok(FetchOutcome::AlreadyLoading);
            }
            inner.is_loading = true;
            (inner.last_loaded_page + 1, inner.generation)
        };

        let request = match self.page_request(page) {
            Ok(request) => request,
            Err(e) => return self.merge_page(page, generation, Err(e)),
        };

        tracing::debug!(page, per_page = self.config.per_page, "Fetching feed page");

        // Detached so the busy flag is always released, even if the caller
        // stops waiting.
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let result = this
                .http
                .execute_typed::<Vec<PhotoResult>>(request)
                .await;
            this.merge_page(page, generation, result)
        });

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ApiError::Cancelled),
        }
    }

    fn page_request(&self, page: u32) -> Result<RequestBuilder> {
        let url = endpoint(&self.config.api_base_url, PHOTOS_PATH)?;
        // `liked_by_user` is only meaningful on authorized requests.
        let request = match self.tokens.get() {
            Some(token) => self.http.authorized(Method::GET, url, &token),
            None => self.http.request(Method::GET, url),
        };
        Ok(request.query(&[
            ("page", page.to_string()),
            ("per_page", self.config.per_page.to_string()),
            ("client_id", self.config.client_id.clone()),
        ]))
    }

    /// Apply a page result and release the busy flag.
    fn merge_page(
        &self,
        page: u32,
        generation: u64,
        result: Result<Vec<PhotoResult>>,
    ) -> Result<FetchOutcome> {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        if inner.generation != generation {
            tracing::debug!(page, "Discarding page fetched before the feed was cleared");
            return Err(ApiError::Cancelled);
        }
        inner.is_loading = false;

        let results = result.inspect_err(|e| {
            tracing::warn!(page, error = %e, "Page fetch failed, will retry same page");
        })?;

        let fetched = results.len();
        let start = inner.photos.len();
        for record in results.into_iter().map(PhotoRecord::from) {
            if inner.ids.insert(record.id.clone()) {
                inner.photos.push(record);
            } else {
                tracing::debug!(photo_id = %record.id, page, "Skipping photo already in feed");
            }
        }
        let range = start..inner.photos.len();
        inner.last_loaded_page = page;

        tracing::info!(
            page,
            fetched,
            appended = range.len(),
            total = inner.photos.len(),
            "Feed page merged"
        );
        self.events.emit(FeedChangeEvent::Appended {
            range: range.clone(),
        });
        Ok(FetchOutcome::Loaded { page, range })
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Record a confirmed like state for `photo_id`.
    ///
    /// Returns the index replaced, or `None` when the photo is no longer in
    /// the feed (e.g. it was cleared while the like call was in flight).
    pub fn apply_like_result(&self, photo_id: &str, is_liked: bool) -> Option<usize> {
        let mut inner = lock(&self.inner);
        let Some(index) = inner.photos.iter().position(|p| p.id == photo_id) else {
            tracing::debug!(photo_id, "Like result for photo not in feed, dropping");
            return None;
        };

        let updated = inner.photos[index].with_liked(is_liked);
        inner.photos[index] = updated;

        tracing::debug!(photo_id, index, is_liked, "Like state applied");
        self.events.emit(FeedChangeEvent::Replaced {
            index,
            photo_id: photo_id.to_string(),
        });
        Some(index)
    }

    /// Empty the feed and forget the page counter.
    ///
    /// A page still in flight is discarded when it lands.
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        inner.is_loading = false;
        inner.photos.clear();
        inner.ids.clear();
        inner.last_loaded_page = 0;
        self.events.emit(FeedChangeEvent::Cleared);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and feed logic.

pub mod auth;
pub mod feed;
pub mod http;
pub mod inflight;
pub mod likes;
pub mod profile;
pub mod session;
pub mod token_store;

pub use auth::{AuthSession, AuthState};
pub use feed::{FeedStore, FetchOutcome};
pub use http::HttpExchange;
pub use likes::LikeCoordinator;
pub use profile::ProfileSession;
pub use session::{LoginOutcome, SessionService};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

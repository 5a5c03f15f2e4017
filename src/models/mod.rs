// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the session and feed core.

pub mod photo;
pub mod profile;
pub mod token;

pub use photo::{PhotoRecord, PhotoResult, UrlsResult};
pub use profile::{Profile, ProfileImage, ProfileResult, UserResult};
pub use token::{AccessToken, OAuthTokenResponse};

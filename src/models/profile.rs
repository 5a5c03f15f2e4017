// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Profile model for the signed-in user.

use serde::{Deserialize, Serialize};
use url::Url;

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Account username
    pub username: String,
    /// First and last name, whichever are present
    pub display_name: String,
    /// "@username"
    pub login_handle: String,
    /// Profile bio
    pub bio: Option<String>,
    /// Large avatar image, once fetched
    pub avatar_url: Option<Url>,
}

impl From<ProfileResult> for Profile {
    fn from(result: ProfileResult) -> Self {
        let display_name = [result.first_name, result.last_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            login_handle: format!("@{}", result.username),
            username: result.username,
            display_name,
            bio: result.bio,
            avatar_url: None,
        }
    }
}

/// Response from `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResult {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Response from `GET /users/{username}`, trimmed to what we read.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResult {
    pub profile_image: ProfileImage,
}

/// Avatar renditions.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImage {
    pub small: String,
    pub medium: String,
    pub large: String,
}

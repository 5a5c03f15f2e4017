// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use image_feed::config::Config;
use image_feed::models::AccessToken;
use image_feed::services::{MemoryTokenStore, TokenStore};
use image_feed::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test-bearer-token";

/// Create a test app whose API and auth server are `server`.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> AppState {
    let config = Config::for_base_url(server.uri());
    AppState::new(config, Arc::new(MemoryTokenStore::new())).expect("Failed to build app state")
}

/// Same as [`create_test_app`] but already holding [`TEST_TOKEN`].
#[allow(dead_code)]
pub fn create_signed_in_app(server: &MockServer) -> AppState {
    let config = Config::for_base_url(server.uri());
    let tokens: Arc<dyn TokenStore> =
        Arc::new(MemoryTokenStore::with_token(AccessToken::new(TEST_TOKEN)));
    AppState::new(config, tokens).expect("Failed to build app state")
}

#[allow(dead_code)]
pub fn bearer() -> String {
    format!("Bearer {}", TEST_TOKEN)
}

/// One photo as the API returns it.
#[allow(dead_code)]
pub fn photo_json(id: &str, liked: bool) -> Value {
    json!({
        "id": id,
        "created_at": "2024-03-01T12:00:00Z",
        "width": 3000,
        "height": 2000,
        "description": format!("photo {}", id),
        "liked_by_user": liked,
        "urls": {
            "raw": format!("https://images.example.com/{}/raw", id),
            "full": format!("https://images.example.com/{}/full", id),
            "regular": format!("https://images.example.com/{}/regular", id),
            "small": format!("https://images.example.com/{}/small", id),
            "thumb": format!("https://images.example.com/{}/thumb", id)
        }
    })
}

/// A page of unliked photos with the given ids.
#[allow(dead_code)]
pub fn page_json(ids: &[&str]) -> Value {
    Value::Array(ids.iter().map(|id| photo_json(id, false)).collect())
}

#[allow(dead_code)]
pub fn profile_json(username: &str) -> Value {
    json!({
        "id": "pXhwzz1JtQU",
        "username": username,
        "first_name": "Jimmy",
        "last_name": "Example",
        "bio": "Photographer",
        "total_likes": 20
    })
}

#[allow(dead_code)]
pub fn user_json(avatar: &str) -> Value {
    json!({
        "username": "jimmy",
        "profile_image": {
            "small": format!("{}?w=32", avatar),
            "medium": format!("{}?w=64", avatar),
            "large": avatar
        }
    })
}

#[allow(dead_code)]
pub fn token_json(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "scope": "public read_user write_likes",
        "created_at": 1436544465
    })
}

/// A full page of `per_page` photos with ids unique to `page`.
#[allow(dead_code)]
pub fn numbered_page_json(page: u32, per_page: usize) -> Value {
    Value::Array(
        (0..per_page)
            .map(|i| photo_json(&format!("p{}-{}", page, i), false))
            .collect(),
    )
}

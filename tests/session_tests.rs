// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, restore and logout across the whole app state.

use image_feed::events::FeedChangeEvent;
use image_feed::services::{AuthState, LoginOutcome};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const AVATAR: &str = "https://images.example.com/avatar-large.jpg";

async fn mount_profile(server: &MockServer, bearer: &str, avatar_status: u16) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", bearer))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::profile_json("jimmy")))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/jimmy"))
        .respond_with(
            ResponseTemplate::new(avatar_status).set_body_json(common::user_json(AVATAR)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_complete_login_exchanges_and_loads_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("code", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_json("fresh")))
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server, "Bearer fresh", 200).await;

    let state = common::create_test_app(&server);
    assert!(!state.session.is_authorized());

    let redirect = format!("{}/oauth/authorize/native?code=abc", server.uri());
    let outcome = state.session.complete_login(&redirect).await.unwrap();

    let LoginOutcome::LoggedIn(profile) = outcome else {
        panic!("expected login, got {:?}", outcome);
    };
    assert_eq!(profile.login_handle, "@jimmy");
    assert_eq!(profile.avatar_url, Some(Url::parse(AVATAR).unwrap()));
    assert!(state.session.is_authorized());
    assert_eq!(state.auth.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn test_other_urls_are_not_a_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    let url = format!("{}/login?code=abc", server.uri());
    let outcome = state.session.complete_login(&url).await.unwrap();

    assert_eq!(outcome, LoginOutcome::NotRedirect);
    assert_eq!(state.auth.state(), AuthState::Idle);
}

#[tokio::test]
async fn test_avatar_failure_does_not_fail_restore() {
    let server = MockServer::start().await;
    mount_profile(&server, common::bearer().as_str(), 503).await;

    let state = common::create_signed_in_app(&server);
    let profile = state.session.restore().await.unwrap().unwrap();

    assert_eq!(profile.username, "jimmy");
    assert_eq!(profile.avatar_url, None);
}

#[tokio::test]
async fn test_restore_without_token_is_none() {
    let server = MockServer::start().await;
    let state = common::create_test_app(&server);

    assert_eq!(state.session.restore().await.unwrap(), None);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let server = MockServer::start().await;
    mount_profile(&server, common::bearer().as_str(), 200).await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&["a", "b"])))
        .mount(&server)
        .await;

    let state = common::create_signed_in_app(&server);
    state.session.restore().await.unwrap();
    state.feed.fetch_next_page().await.unwrap();
    let mut feed_events = state.feed.subscribe();

    state.session.logout().unwrap();

    assert!(!state.session.is_authorized());
    assert!(state.tokens.get().is_none());
    assert!(state.profile.profile().is_none());
    assert!(state.feed.is_empty());
    assert_eq!(state.feed.last_loaded_page(), 0);
    assert_eq!(state.auth.state(), AuthState::Idle);
    assert_eq!(feed_events.drain(), vec![FeedChangeEvent::Cleared]);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed pagination tests.
//!
//! These tests verify that:
//! 1. Pages are requested in order, one at a time
//! 2. Calls made while a page is in flight are dropped
//! 3. A failed page is retried rather than skipped
//! 4. Clearing the feed discards a page still in flight

use image_feed::events::FeedChangeEvent;
use image_feed::services::FetchOutcome;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn photos_page(page: u32) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(query_param("page", page.to_string()))
        .and(query_param("per_page", "10"))
        .and(query_param("client_id", "test_access_key"))
}

#[tokio::test]
async fn test_pages_load_in_order() {
    let server = MockServer::start().await;
    photos_page(1)
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&["a", "b", "c"])))
        .expect(1)
        .mount(&server)
        .await;
    photos_page(2)
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&["d", "e"])))
        .expect(1)
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    let mut events = state.feed.subscribe();

    let first = state.feed.fetch_next_page().await.unwrap();
    assert_eq!(first, FetchOutcome::Loaded { page: 1, range: 0..3 });
    let second = state.feed.fetch_next_page().await.unwrap();
    assert_eq!(second, FetchOutcome::Loaded { page: 2, range: 3..5 });

    assert_eq!(state.feed.last_loaded_page(), 2);
    assert_eq!(state.feed.len(), 5);
    assert!(state.feed.is_last_index(4));
    assert_eq!(
        events.drain(),
        vec![
            FeedChangeEvent::Appended { range: 0..3 },
            FeedChangeEvent::Appended { range: 3..5 },
        ]
    );

    let photo = state.feed.photo(0).unwrap();
    assert_eq!(photo.thumbnail_url, "https://images.example.com/a/thumb");
    assert_eq!(photo.full_image_url, "https://images.example.com/a/regular");
    assert!(!photo.is_liked);
}

#[tokio::test]
async fn test_full_pages_accumulate() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        photos_page(page)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(common::numbered_page_json(page, 10)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let state = common::create_test_app(&server);
    for page in 1..=3u32 {
        let start = (page as usize - 1) * 10;
        let outcome = state.feed.fetch_next_page().await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Loaded {
                page,
                range: start..start + 10
            }
        );
    }

    assert_eq!(state.feed.len(), 30);
    assert_eq!(state.feed.last_loaded_page(), 3);
    assert_eq!(state.feed.photo(10).unwrap().id, "p2-0");
    assert_eq!(state.feed.photo(29).unwrap().id, "p3-9");
}

#[tokio::test]
async fn test_fetch_while_loading_is_dropped() {
    let server = MockServer::start().await;
    photos_page(1)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::page_json(&["a"]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    let feed = state.feed.clone();
    let first = tokio::spawn(async move { feed.fetch_next_page().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(state.feed.is_loading());
    let dropped = state.feed.fetch_next_page().await.unwrap();
    assert_eq!(dropped, FetchOutcome::AlreadyLoading);

    let loaded = first.await.unwrap().unwrap();
    assert_eq!(loaded, FetchOutcome::Loaded { page: 1, range: 0..1 });
    assert!(!state.feed.is_loading());
    assert_eq!(state.feed.last_loaded_page(), 1);
}

#[tokio::test]
async fn test_failed_page_is_retried() {
    let server = MockServer::start().await;
    photos_page(1)
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    photos_page(1)
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    let mut events = state.feed.subscribe();

    let err = state.feed.fetch_next_page().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(state.feed.last_loaded_page(), 0);
    assert!(!state.feed.is_loading());
    assert!(events.drain().is_empty());

    let loaded = state.feed.fetch_next_page().await.unwrap();
    assert_eq!(loaded, FetchOutcome::Loaded { page: 1, range: 0..2 });
}

#[tokio::test]
async fn test_duplicate_ids_across_pages_are_skipped() {
    let server = MockServer::start().await;
    photos_page(1)
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&["a", "b"])))
        .mount(&server)
        .await;
    photos_page(2)
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&["b", "c"])))
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    state.feed.fetch_next_page().await.unwrap();
    let second = state.feed.fetch_next_page().await.unwrap();

    assert_eq!(second, FetchOutcome::Loaded { page: 2, range: 2..3 });
    let ids: Vec<String> = state.feed.photos().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_empty_page_still_advances() {
    let server = MockServer::start().await;
    photos_page(1)
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_json(&[])))
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    let mut events = state.feed.subscribe();

    let loaded = state.feed.fetch_next_page().await.unwrap();
    assert_eq!(loaded, FetchOutcome::Loaded { page: 1, range: 0..0 });
    assert_eq!(state.feed.last_loaded_page(), 1);
    assert!(state.feed.is_empty());
    assert_eq!(events.drain(), vec![FeedChangeEvent::Appended { range: 0..0 }]);
}

#[tokio::test]
async fn test_clear_discards_page_in_flight() {
    let server = MockServer::start().await;
    photos_page(1)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::page_json(&["late"]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let state = common::create_test_app(&server);
    let mut events = state.feed.subscribe();
    let feed = state.feed.clone();
    let in_flight = tokio::spawn(async move { feed.fetch_next_page().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    state.feed.clear();
    assert!(!state.feed.is_loading());

    let discarded = in_flight.await.unwrap().unwrap_err();
    assert!(discarded.is_cancelled());
    assert!(state.feed.is_empty());
    assert_eq!(state.feed.last_loaded_page(), 0);
    assert_eq!(events.drain(), vec![FeedChangeEvent::Cleared]);

    // Starts over from the first page.
    let loaded = state.feed.fetch_next_page().await.unwrap();
    assert_eq!(loaded, FetchOutcome::Loaded { page: 1, range: 0..1 });
}

#[tokio::test]
async fn test_signed_in_feed_sends_bearer_and_like_state() {
    let server = MockServer::start().await;
    photos_page(1)
        .and(header("authorization", common::bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            common::photo_json("liked", true),
            common::photo_json("plain", false),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = common::create_signed_in_app(&server);
    state.feed.fetch_next_page().await.unwrap();

    assert!(state.feed.photo(0).unwrap().is_liked);
    assert!(!state.feed.photo(1).unwrap().is_liked);
}

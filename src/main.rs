// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image-Feed command-line client
//!
//! Signs in through the browser OAuth flow, then shows the photo feed and
//! lets the user like, unlike and page through it from stdin.

use anyhow::Context;
use image_feed::{
    config::Config,
    events::FeedChangeEvent,
    models::PhotoRecord,
    services::{FeedStore, FileTokenStore, LoginOutcome},
    time_utils::format_utc_rfc3339,
    AppState,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

const HELP: &str = "commands: like <n> | unlike <n> | show <n> | more | logout | quit";

/// How the command loop ended.
enum Exit {
    Logout,
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.api_base_url, "Starting Image-Feed client");

    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let state = AppState::new(config, tokens).context("Failed to initialize client")?;

    let mut feed_events = state.feed.subscribe();
    let feed = state.feed.clone();
    tokio::spawn(async move {
        while let Some(event) = feed_events.recv().await {
            print_feed_event(&feed, &event);
        }
    });

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(username) = sign_in(&state, &mut input).await? else {
            return Ok(());
        };
        println!("Signed in as {}", username);
        println!("{}", HELP);
        load_more(&state).await;

        match run_commands(&state, &mut input).await? {
            Exit::Quit => return Ok(()),
            Exit::Logout => {
                state.session.logout().context("Failed to log out")?;
                println!("Logged out");
            }
        }
    }
}

/// Restore the stored session or walk the user through login.
///
/// Returns `None` when stdin closes first.
async fn sign_in(state: &AppState, input: &mut Input) -> anyhow::Result<Option<String>> {
    match state.session.restore().await {
        Ok(Some(profile)) => return Ok(Some(profile.login_handle)),
        Ok(None) => {}
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(error = %e, "Stored token rejected, signing in again");
            state.session.logout().context("Failed to drop rejected token")?;
        }
        Err(e) => return Err(e).context("Failed to restore session"),
    }

    let url = state
        .session
        .authorization_url()
        .context("Cannot build authorization URL")?;
    println!("Open this URL in a browser and paste the final redirect URL here:");
    println!("{}", url);

    while let Some(line) = input.next_line().await? {
        match state.session.complete_login(line.trim()).await {
            Ok(LoginOutcome::LoggedIn(profile)) => return Ok(Some(profile.login_handle)),
            Ok(LoginOutcome::NotRedirect) => println!("That is not the redirect URL, try again"),
            Err(e) => println!("Login failed: {}", e),
        }
    }
    Ok(None)
}

async fn run_commands(state: &AppState, input: &mut Input) -> anyhow::Result<Exit> {
    while let Some(line) = input.next_line().await? {
        let mut words = line.split_whitespace();
        let command = words.next();
        let index = words.next().and_then(|word| word.parse::<usize>().ok());

        match (command, index) {
            (None, _) => {}
            (Some("quit"), _) => return Ok(Exit::Quit),
            (Some("logout"), _) => return Ok(Exit::Logout),
            (Some("more"), _) => load_more(state).await,
            (Some("like"), Some(index)) => set_like(state, index, true).await,
            (Some("unlike"), Some(index)) => set_like(state, index, false).await,
            (Some("show"), Some(index)) => show(state, index).await,
            _ => println!("{}", HELP),
        }
    }
    Ok(Exit::Quit)
}

async fn load_more(state: &AppState) {
    if let Err(e) = state.feed.fetch_next_page().await {
        println!("Could not load photos: {}", e);
    }
}

async fn set_like(state: &AppState, index: usize, is_liked: bool) {
    let Some(photo) = state.feed.photo(index) else {
        println!("No photo #{}", index);
        return;
    };
    if let Err(e) = state.likes.toggle_like(&photo.id, is_liked).await {
        println!("Could not update like on #{}: {}", index, e);
    }
}

/// Print one photo in detail; reaching the last one pulls the next page.
async fn show(state: &AppState, index: usize) {
    let Some(photo) = state.feed.photo(index) else {
        println!("No photo #{}", index);
        return;
    };
    println!("{}", describe(index, &photo));
    println!("    {}x{}  {}", photo.pixel_width, photo.pixel_height, photo.full_image_url);
    if let Some(created_at) = photo.created_at {
        println!("    taken {}", format_utc_rfc3339(created_at));
    }

    if state.feed.is_last_index(index) {
        load_more(state).await;
    }
}

fn print_feed_event(feed: &FeedStore, event: &FeedChangeEvent) {
    match event {
        FeedChangeEvent::Appended { range } => {
            for index in range.clone() {
                if let Some(photo) = feed.photo(index) {
                    println!("{}", describe(index, &photo));
                }
            }
        }
        FeedChangeEvent::Replaced { index, .. } => {
            if let Some(photo) = feed.photo(*index) {
                println!("{}", describe(*index, &photo));
            }
        }
        FeedChangeEvent::Cleared => println!("(feed cleared)"),
    }
}

fn describe(index: usize, photo: &PhotoRecord) -> String {
    format!(
        "#{:<3} {} {}  {}",
        index,
        if photo.is_liked { "♥" } else { "♡" },
        photo.id,
        photo.description.as_deref().unwrap_or("")
    )
}

/// Initialize structured JSON logging on stderr.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("image_feed=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

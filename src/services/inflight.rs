// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Latest-wins bookkeeping for operations that supersede each other.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, Result};

/// Ticket identifying one started operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Tracks the single in-flight operation of one kind.
///
/// Starting a new operation cancels the previous one and invalidates its
/// ticket, so a late completion can tell it must not touch state.
#[derive(Debug, Default)]
pub struct InFlight {
    ticket: u64,
    cancel: Option<CancellationToken>,
}

impl InFlight {
    /// Cancel whatever is running and hand out a fresh ticket.
    pub fn begin(&mut self) -> (Ticket, CancellationToken) {
        self.cancel_current();
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        (Ticket(self.ticket), token)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.cancel.is_some() && self.ticket == ticket.0
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Mark `ticket` finished. Returns false if it was superseded.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.cancel = None;
        true
    }

    /// Cancel the running operation, if any, and invalidate its ticket.
    pub fn cancel_current(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.ticket += 1;
    }
}

/// Run `fut` until it completes or `cancel` fires.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

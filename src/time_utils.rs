// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an ISO 8601 timestamp as sent by the photo API.
///
/// Absent or malformed input yields `None`; a bad date never fails a page.
pub fn parse_iso8601(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(value = raw, error = %e, "Ignoring malformed timestamp");
            None
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Photo model for the feed cache and the API wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::parse_iso8601;

/// A photo held in the feed cache.
///
/// Identity is `id`; only `is_liked` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoRecord {
    /// API photo ID (unique within the feed)
    pub id: String,
    /// Original width in pixels
    pub pixel_width: u32,
    /// Original height in pixels
    pub pixel_height: u32,
    /// Upload time, when the API sent a parseable one
    pub created_at: Option<DateTime<Utc>>,
    /// Free-text description
    pub description: Option<String>,
    /// Small preview for list cells
    pub thumbnail_url: String,
    /// Large image for the detail view
    pub full_image_url: String,
    /// Whether the current user likes this photo
    pub is_liked: bool,
}

impl PhotoRecord {
    /// Copy of this record with only the like state changed.
    pub fn with_liked(&self, is_liked: bool) -> Self {
        Self {
            is_liked,
            ..self.clone()
        }
    }

    /// Width divided by height, or `None` for a degenerate size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return None;
        }
        Some(f64::from(self.pixel_width) / f64::from(self.pixel_height))
    }

    /// Height the image takes when scaled to `width`, keeping aspect ratio.
    pub fn height_for_width(&self, width: f64) -> Option<f64> {
        self.aspect_ratio().map(|ratio| width / ratio)
    }
}

impl From<PhotoResult> for PhotoRecord {
    fn from(result: PhotoResult) -> Self {
        Self {
            created_at: parse_iso8601(result.created_at.as_deref()),
            id: result.id,
            pixel_width: result.width,
            pixel_height: result.height,
            description: result.description,
            thumbnail_url: result.urls.thumb,
            full_image_url: result.urls.regular,
            is_liked: result.liked_by_user,
        }
    }
}

/// Photo as returned by `GET /photos`.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoResult {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub liked_by_user: bool,
    pub urls: UrlsResult,
}

/// Rendition URLs of a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlsResult {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

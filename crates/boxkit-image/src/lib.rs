//! # BoxKit Image
//!
//! Image cache shared by layout invocations.
//!
//! ## Design Goals
//!
//! 1. **Injected, not global**: The cache is a value owned by a session and
//!    handed to the box factory behind an `Arc`
//! 2. **Concurrent access**: Lookups and insertions are safe from several
//!    layout invocations at once
//! 3. **Failure memo**: URLs that failed to load are not fetched again
//! 4. **Loader seam**: Fetching and decoding live behind [`ImageLoader`]

mod cache;
mod loader;

pub use cache::{CacheConfig, CacheStats, ImageCache};
pub use loader::{ImageLoader, StaticImageLoader};

use thiserror::Error;
use url::Url;

/// Errors that can occur while resolving an image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    #[error("Image not found: {0}")]
    NotFound(Url),

    #[error("Image decode failed for {url}: {reason}")]
    DecodeFailed { url: Url, reason: String },

    #[error("Image load previously failed: {0}")]
    KnownFailure(Url),

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),
}

/// Intrinsic dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedImage {
    pub width: f32,
    pub height: f32,
}

impl DecodedImage {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or 1.0 for degenerate images.
    pub fn ratio(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Resolve `reference` against an optional base URL.
pub fn resolve_url(base: Option<&Url>, reference: &str) -> Result<Url, ImageError> {
    let parsed = match base {
        Some(base) => base.join(reference),
        None => Url::parse(reference),
    };
    parsed.map_err(|_| ImageError::InvalidUrl(reference.to_string()))
}

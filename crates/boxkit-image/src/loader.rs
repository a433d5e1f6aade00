//! Image loader seam.

use std::collections::HashMap;

use url::Url;

use crate::{DecodedImage, ImageError};

/// Fetches and decodes an image, returning its intrinsic size.
pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &Url) -> Result<DecodedImage, ImageError>;
}

/// Loader serving a fixed set of in-memory images.
#[derive(Debug, Clone, Default)]
pub struct StaticImageLoader {
    images: HashMap<Url, DecodedImage>,
}

impl StaticImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image for `url`.
    pub fn with_image(mut self, url: Url, image: DecodedImage) -> Self {
        self.images.insert(url, image);
        self
    }

    pub fn insert(&mut self, url: Url, image: DecodedImage) {
        self.images.insert(url, image);
    }
}

impl ImageLoader for StaticImageLoader {
    fn load(&self, url: &Url) -> Result<DecodedImage, ImageError> {
        self.images
            .get(url)
            .copied()
            .ok_or_else(|| ImageError::NotFound(url.clone()))
    }
}

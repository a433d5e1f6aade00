//! Layout configuration.

use url::Url;

/// Options of one layout session.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Initial containing block width.
    pub viewport_width: f32,
    /// Initial containing block height.
    pub viewport_height: f32,
    /// Font family used when a style names none.
    pub default_font_family: String,
    /// Root font size in pixels.
    pub default_font_size: f32,
    /// Minimal width a line narrowed by floats must offer before content is placed on it.
    pub inflow_space_threshold: f32,
    /// Create replaced boxes for images and load their intrinsic size.
    pub load_images: bool,
    /// Load background images.
    pub load_backgrounds: bool,
    /// Base for resolving relative image URLs.
    pub base_url: Option<Url>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 768.0,
            default_font_family: "serif".to_string(),
            default_font_size: 16.0,
            inflow_space_threshold: 15.0,
            load_images: true,
            load_backgrounds: true,
            base_url: None,
        }
    }
}

impl LayoutConfig {
    /// Default configuration with a different viewport.
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            ..Self::default()
        }
    }
}

//! Font metrics and CSS length resolution.
//!
//! The layout core never shapes text itself. A [`TextMeasurer`] supplies
//! string widths and font metrics; a [`VisualContext`] binds a measurer to the
//! font of one box and is derived for each child from its style.

use std::fmt;
use std::sync::Arc;

use boxkit_css::{ComputedStyle, Length, LineHeight};

use crate::Size;

/// Line height used for `line-height: normal`, relative to the font height.
const NORMAL_LINE_HEIGHT: f32 = 1.12;

/// Font selection of a box.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: 400,
            italic: false,
        }
    }
}

/// Vertical metrics of a font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Distance from the line top to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the line bottom.
    pub descent: f32,
    /// Height of the lowercase "x".
    pub x_height: f32,
    /// Advance of the "0" glyph.
    pub zero_advance: f32,
}

impl FontMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Text measurement provided by the embedding application.
pub trait TextMeasurer: Send + Sync {
    /// Metrics of `font`.
    fn metrics(&self, font: &FontSpec) -> FontMetrics;

    /// Advance width of `text` set in `font`.
    fn string_width(&self, font: &FontSpec, text: &str) -> f32;
}

/// Measurer with a fixed advance per character.
///
/// Typical Latin fonts average about half an em per character; the default
/// ratio follows that. Tests use it for exact, predictable widths.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    /// Advance of every character relative to the font size.
    pub advance_ratio: f32,
}

impl MonospaceMeasurer {
    pub fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn metrics(&self, font: &FontSpec) -> FontMetrics {
        FontMetrics {
            ascent: font.size * 0.8,
            descent: font.size * 0.2,
            x_height: font.size * 0.5,
            zero_advance: font.size * self.advance_ratio,
        }
    }

    fn string_width(&self, font: &FontSpec, text: &str) -> f32 {
        text.chars().count() as f32 * font.size * self.advance_ratio
    }
}

/// Font context of one box.
#[derive(Clone)]
pub struct VisualContext {
    font: FontSpec,
    metrics: FontMetrics,
    root_font_size: f32,
    viewport: Size,
    measurer: Arc<dyn TextMeasurer>,
}

impl fmt::Debug for VisualContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualContext")
            .field("font", &self.font)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl VisualContext {
    /// Root context of a document.
    pub fn new(measurer: Arc<dyn TextMeasurer>, font: FontSpec, viewport: Size) -> Self {
        let metrics = measurer.metrics(&font);
        Self {
            root_font_size: font.size,
            font,
            metrics,
            viewport,
            measurer,
        }
    }

    /// Context of a child box with `style` applied on top of this one.
    pub fn derive(&self, style: &ComputedStyle) -> VisualContext {
        // font-size percentages and em refer to the parent font
        let size = match style.font_size {
            Length::Percent(pct) => self.font.size * pct / 100.0,
            Length::Em(em) => self.font.size * em,
            Length::Auto => self.font.size,
            other => CssDecoder::new(self).px(other, self.font.size),
        };
        let font = FontSpec {
            family: if style.font_family.is_empty() {
                self.font.family.clone()
            } else {
                style.font_family.clone()
            },
            size,
            weight: style.font_weight,
            italic: style.italic,
        };
        let metrics = self.measurer.metrics(&font);
        VisualContext {
            font,
            metrics,
            root_font_size: self.root_font_size,
            viewport: self.viewport,
            measurer: Arc::clone(&self.measurer),
        }
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn em(&self) -> f32 {
        self.font.size
    }

    pub fn rem(&self) -> f32 {
        self.root_font_size
    }

    pub fn ex(&self) -> f32 {
        self.metrics.x_height
    }

    pub fn ch(&self) -> f32 {
        self.metrics.zero_advance
    }

    /// Distance from the line top to the baseline (the font ascent).
    pub fn baseline_offset(&self) -> f32 {
        self.metrics.ascent
    }

    /// Total font height.
    pub fn font_height(&self) -> f32 {
        self.metrics.height()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn string_width(&self, text: &str) -> f32 {
        self.measurer.string_width(&self.font, text)
    }

    /// Used value of `line-height`.
    pub fn line_height(&self, value: LineHeight) -> f32 {
        match value {
            LineHeight::Normal => NORMAL_LINE_HEIGHT * self.font_height(),
            LineHeight::Number(n) => n * self.font_height(),
            LineHeight::Length(Length::Percent(pct)) => self.font_height() * pct / 100.0,
            LineHeight::Length(len) => CssDecoder::new(self).px(len, 0.0),
        }
    }
}

/// Resolves CSS lengths against a visual context.
#[derive(Debug, Clone, Copy)]
pub struct CssDecoder<'a> {
    ctx: &'a VisualContext,
}

impl<'a> CssDecoder<'a> {
    pub fn new(ctx: &'a VisualContext) -> Self {
        Self { ctx }
    }

    /// Resolve `value` to pixels.
    ///
    /// `auto` forces `auto_value`; a `Length::Auto` value that is not treated
    /// as auto yields `default`; percentages refer to `whole`.
    pub fn length(
        &self,
        value: Length,
        auto: bool,
        default: f32,
        auto_value: f32,
        whole: f32,
    ) -> f32 {
        if auto {
            return auto_value;
        }
        match value {
            Length::Auto => default,
            other => self.px(other, whole),
        }
    }

    /// Pixel value of a non-auto length.
    pub fn px(&self, value: Length, whole: f32) -> f32 {
        let viewport = self.ctx.viewport();
        match value {
            Length::Px(px) => px,
            Length::Em(em) => em * self.ctx.em(),
            Length::Rem(rem) => rem * self.ctx.rem(),
            Length::Ex(ex) => ex * self.ctx.ex(),
            Length::Ch(ch) => ch * self.ctx.ch(),
            Length::Percent(pct) => whole * pct / 100.0,
            Length::Vw(vw) => vw / 100.0 * viewport.width,
            Length::Vh(vh) => vh / 100.0 * viewport.height,
            Length::Auto | Length::Zero => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> VisualContext {
        VisualContext::new(
            Arc::new(MonospaceMeasurer::default()),
            FontSpec::new("serif", 20.0),
            Size::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_metrics() {
        let ctx = ctx();
        assert_eq!(ctx.baseline_offset(), 16.0);
        assert_eq!(ctx.font_height(), 20.0);
        assert_eq!(ctx.ex(), 10.0);
        assert_eq!(ctx.string_width("abcd"), 40.0);
    }

    #[test]
    fn test_derive_relative_font_size() {
        let parent = ctx();
        let mut style = ComputedStyle::new();
        style.font_size = Length::Percent(50.0);
        let child = parent.derive(&style);
        assert_eq!(child.em(), 10.0);
        assert_eq!(child.rem(), 20.0);

        style.font_size = Length::Em(2.0);
        assert_eq!(parent.derive(&style).em(), 40.0);
    }

    #[test]
    fn test_decoder_lengths() {
        let ctx = ctx();
        let dec = CssDecoder::new(&ctx);
        assert_eq!(dec.length(Length::Percent(25.0), false, 0.0, 0.0, 400.0), 100.0);
        assert_eq!(dec.length(Length::Px(5.0), true, 0.0, -1.0, 400.0), -1.0);
        assert_eq!(dec.length(Length::Auto, false, 7.0, 0.0, 400.0), 7.0);
        assert_eq!(dec.px(Length::Em(1.5), 0.0), 30.0);
        assert_eq!(dec.px(Length::Vw(10.0), 0.0), 80.0);
    }

    #[test]
    fn test_line_height() {
        let ctx = ctx();
        assert!((ctx.line_height(LineHeight::Normal) - 22.4).abs() < 1e-4);
        assert_eq!(ctx.line_height(LineHeight::Number(2.0)), 40.0);
        assert_eq!(ctx.line_height(LineHeight::Length(Length::Px(30.0))), 30.0);
    }
}

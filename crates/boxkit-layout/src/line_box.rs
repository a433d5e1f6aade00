//! Line box metrics and baseline alignment.
//!
//! A [`LineBox`] collects the vertical extent of the inline-level boxes
//! placed on one line: the maximal ascent (`above`) and descent (`below`)
//! relative to the line baseline, the largest line height among the
//! baseline-aligned boxes and the largest box overall. Boxes aligned to the
//! line `top` or `bottom` do not take part in the baseline computation.

use boxkit_css::VerticalAlign;

use crate::context::{CssDecoder, VisualContext};

/// Font metrics of the element owning a line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineContext {
    /// Height of the owner's lowercase "x".
    pub ex: f32,
    /// Owner font ascent.
    pub ascent: f32,
    pub font_height: f32,
    /// Owner used line height.
    pub line_height: f32,
}

impl LineContext {
    pub fn new(ctx: &VisualContext, line_height: f32) -> Self {
        Self {
            ex: ctx.ex(),
            ascent: ctx.baseline_offset(),
            font_height: ctx.font_height(),
            line_height,
        }
    }
}

/// Vertical metrics of one inline-level box as seen by its line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineMetrics {
    pub displayed: bool,
    pub collapsed: bool,
    /// Element box (inline, inline-block, replaced) rather than text.
    pub element: bool,
    pub valign: VerticalAlign,
    /// `vertical-align` length resolved to pixels; percentages refer to the line height.
    pub valign_offset: f32,
    pub baseline_offset: f32,
    pub below_baseline: f32,
    pub max_line_height: f32,
    pub line_height: f32,
    pub linebox_offset: f32,
}

impl InlineMetrics {
    /// Resolve a `vertical-align` length of a box with context `ctx`.
    pub fn resolve_valign(ctx: &VisualContext, valign: VerticalAlign, line_height: f32) -> f32 {
        match valign {
            VerticalAlign::Length(len) => CssDecoder::new(ctx).px(len, line_height),
            _ => 0.0,
        }
    }
}

/// One line of inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    ctx: LineContext,
    start: usize,
    end: usize,
    y: f32,
    width: f32,
    left: f32,
    right: f32,
    above: f32,
    below: f32,
    max_aligned_height: f32,
    max_box_height: f32,
    height_from_bottom: f32,
}

impl LineBox {
    pub fn new(ctx: LineContext, start: usize, y: f32) -> Self {
        Self {
            ctx,
            start,
            end: start,
            y,
            width: 0.0,
            left: 0.0,
            right: 0.0,
            above: 0.0,
            below: 0.0,
            max_aligned_height: 0.0,
            max_box_height: 0.0,
            height_from_bottom: 0.0,
        }
    }

    pub fn context(&self) -> LineContext {
        self.ctx
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn set_end(&mut self, end: usize) {
        self.end = end;
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn left_limit(&self) -> f32 {
        self.left
    }

    pub fn right_limit(&self) -> f32 {
        self.right
    }

    /// Horizontal space taken by floats on both sides.
    pub fn limits(&self) -> f32 {
        self.left + self.right
    }

    pub fn set_limits(&mut self, left: f32, right: f32) {
        self.left = left;
        self.right = right;
    }

    pub fn total_line_height(&self) -> f32 {
        self.above + self.below
    }

    /// Extra space above the baseline-aligned boxes needed by `bottom` aligned ones.
    pub fn top_offset(&self) -> f32 {
        (self.height_from_bottom - self.max_aligned_height).max(0.0)
    }

    pub fn max_aligned_height(&self) -> f32 {
        self.max_aligned_height
    }

    pub fn max_box_height(&self) -> f32 {
        self.max_box_height
    }

    pub fn baseline_offset(&self) -> f32 {
        self.above
    }

    pub fn below_baseline(&self) -> f32 {
        self.below
    }

    /// Leading distributed around the baseline-aligned content.
    pub fn lead(&self) -> f32 {
        self.max_aligned_height - (self.above + self.below)
    }

    /// Fold a placed box into the line metrics.
    pub fn consider_box(&mut self, metrics: &InlineMetrics) {
        if !metrics.displayed || metrics.collapsed {
            return;
        }
        let mut a = metrics.baseline_offset;
        let mut b = metrics.below_baseline;
        if metrics.element {
            match metrics.valign {
                VerticalAlign::Top => {}
                VerticalAlign::Bottom => {
                    self.height_from_bottom = self.height_from_bottom.max(metrics.max_line_height);
                }
                _ => {
                    let dif = self.baseline_difference(metrics);
                    a -= dif;
                    b += dif;
                    self.above = self.above.max(a);
                    self.below = self.below.max(b);
                    self.max_aligned_height = self.max_aligned_height.max(metrics.max_line_height);
                }
            }
        } else {
            self.above = self.above.max(a);
            self.below = self.below.max(b);
            self.max_aligned_height = self.max_aligned_height.max(metrics.max_line_height);
        }
        self.max_box_height = self.max_box_height.max(metrics.max_line_height);
    }

    /// Account for the strut of an element starting on this line.
    pub fn consider_box_properties(&mut self, ctx: &VisualContext, line_height: f32) {
        let a = ctx.baseline_offset();
        let b = ctx.font_height() - a;
        self.above = self.above.max(a);
        self.below = self.below.max(b);
        self.max_aligned_height = self.max_aligned_height.max(line_height);
    }

    /// Y offset of a box's content top from the line top; `top` and
    /// `bottom` aligned boxes are placed by the positioning pass and get 0.
    pub fn align_box(&self, metrics: &InlineMetrics) -> f32 {
        if metrics.element {
            match metrics.valign {
                VerticalAlign::Top | VerticalAlign::Bottom => 0.0,
                _ => {
                    self.above + self.baseline_difference(metrics) - metrics.baseline_offset
                        + metrics.linebox_offset
                }
            }
        } else {
            self.above - metrics.baseline_offset
        }
    }

    /// How far the baseline of the box lies below the line baseline.
    fn baseline_difference(&self, metrics: &InlineMetrics) -> f32 {
        match metrics.valign {
            VerticalAlign::Middle => metrics.line_height / 2.0 - self.ctx.ex / 2.0,
            VerticalAlign::Sub => 0.3 * self.ctx.line_height,
            VerticalAlign::Super => -0.3 * self.ctx.line_height,
            VerticalAlign::TextTop => metrics.baseline_offset - self.ctx.ascent,
            VerticalAlign::TextBottom => {
                let nb = self.ctx.font_height - self.ctx.ascent;
                nb - metrics.below_baseline
            }
            VerticalAlign::Length(_) => -metrics.valign_offset,
            VerticalAlign::Baseline | VerticalAlign::Top | VerticalAlign::Bottom => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxkit_css::Length;

    fn ctx() -> LineContext {
        LineContext {
            ex: 8.0,
            ascent: 16.0,
            font_height: 20.0,
            line_height: 22.0,
        }
    }

    fn text(a: f32, b: f32, lh: f32) -> InlineMetrics {
        InlineMetrics {
            displayed: true,
            collapsed: false,
            element: false,
            valign: VerticalAlign::Baseline,
            valign_offset: 0.0,
            baseline_offset: a,
            below_baseline: b,
            max_line_height: lh,
            line_height: lh,
            linebox_offset: 0.0,
        }
    }

    #[test]
    fn test_consider_text_boxes() {
        let mut line = LineBox::new(ctx(), 0, 0.0);
        line.consider_box(&text(16.0, 4.0, 22.0));
        line.consider_box(&text(24.0, 6.0, 33.0));
        assert_eq!(line.baseline_offset(), 24.0);
        assert_eq!(line.below_baseline(), 6.0);
        assert_eq!(line.total_line_height(), 30.0);
        assert_eq!(line.max_aligned_height(), 33.0);
        assert_eq!(line.lead(), 3.0);
        assert_eq!(line.align_box(&text(16.0, 4.0, 22.0)), 8.0);
    }

    #[test]
    fn test_collapsed_boxes_are_ignored() {
        let mut line = LineBox::new(ctx(), 0, 0.0);
        let mut m = text(40.0, 10.0, 50.0);
        m.collapsed = true;
        line.consider_box(&m);
        assert_eq!(line.total_line_height(), 0.0);
        assert_eq!(line.max_box_height(), 0.0);
    }

    #[test]
    fn test_super_and_sub_shift() {
        let mut line = LineBox::new(ctx(), 0, 0.0);
        let mut sup = text(16.0, 4.0, 22.0);
        sup.element = true;
        sup.valign = VerticalAlign::Super;
        line.consider_box(&sup);
        // super raises the box by 0.3 * 22
        assert!((line.baseline_offset() - (16.0 + 6.6)).abs() < 1e-4);
        let mut sub = sup;
        sub.valign = VerticalAlign::Sub;
        line.consider_box(&sub);
        assert!((line.below_baseline() - (4.0 + 6.6)).abs() < 1e-4);
    }

    #[test]
    fn test_bottom_aligned_boxes_raise_top_offset() {
        let mut line = LineBox::new(ctx(), 0, 0.0);
        line.consider_box(&text(16.0, 4.0, 22.0));
        let mut tall = text(0.0, 0.0, 60.0);
        tall.element = true;
        tall.valign = VerticalAlign::Bottom;
        line.consider_box(&tall);
        assert_eq!(line.top_offset(), 38.0);
        assert_eq!(line.max_box_height(), 60.0);
        assert_eq!(line.align_box(&tall), 0.0);
    }

    #[test]
    fn test_length_alignment_moves_up() {
        let mut line = LineBox::new(ctx(), 0, 0.0);
        let mut m = text(10.0, 0.0, 10.0);
        m.element = true;
        m.valign = VerticalAlign::Length(Length::Px(5.0));
        m.valign_offset = 5.0;
        line.consider_box(&m);
        assert_eq!(line.baseline_offset(), 15.0);
        assert_eq!(line.align_box(&m), 0.0);
    }

    #[test]
    fn test_strut_from_properties() {
        let mut line = LineBox::new(ctx(), 0, 0.0);
        let vctx = crate::context::VisualContext::new(
            std::sync::Arc::new(crate::context::MonospaceMeasurer::default()),
            crate::context::FontSpec::new("serif", 20.0),
            crate::Size::new(800.0, 600.0),
        );
        line.consider_box_properties(&vctx, 22.4);
        assert_eq!(line.baseline_offset(), 16.0);
        assert_eq!(line.below_baseline(), 4.0);
        assert!((line.max_aligned_height() - 22.4).abs() < 1e-4);
    }
}

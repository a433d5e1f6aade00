//! # BoxKit Layout
//!
//! CSS box-model layout engine.
//! Builds a box tree from styled nodes, computes sizes and positions and
//! hands the finished tree to a renderer.
//!
//! ## Design Goals
//!
//! 1. **Block layout**: Shrink-to-fit widths, stacking with margin collapse, clearance
//! 2. **Inline layout**: Line breaking with continuation boxes and baseline alignment
//! 3. **Float layout**: Per-context float lists with width-at-Y queries
//! 4. **Tables**: Anonymous box synthesis, column width distribution, spans
//! 5. **Flexbox**: Line construction, flexible lengths, alignment on both axes
//! 6. **Replaced content**: Intrinsic sizing and background image geometry
//! 7. **Positioning**: A separate pass turning local coordinates into absolute ones
//!
//! The tree lives in an arena ([`BoxTree`]) addressed by [`BoxId`]. Each box
//! kind is laid out by a [`LayoutManager`]; layout never fails, it reports
//! whether the content fit through [`LayoutOutcome`].

pub mod background;
pub mod block;
pub mod config;
pub mod context;
pub mod engine;
pub mod factory;
pub mod flex;
pub mod float_list;
pub mod inline;
pub mod intrinsic;
pub mod line_box;
pub mod manager;
pub mod margin_collapse;
pub mod position;
pub mod render;
pub mod replaced;
pub mod sizing;
pub mod table;
pub mod text;
pub mod tree;

pub use background::{BackgroundImage, BackgroundPlacement};
pub use config::LayoutConfig;
pub use context::{
    CssDecoder, FontMetrics, FontSpec, MonospaceMeasurer, TextMeasurer, VisualContext,
};
pub use engine::{LayoutEngine, LayoutEngineBuilder};
pub use factory::{BoxFactory, StyledNode};
pub use flex::{FlexData, FlexLine, FlexLineColumn, FlexLineRow};
pub use float_list::{FloatEntry, FloatList, FloatListId};
pub use line_box::{InlineMetrics, LineBox, LineContext};
pub use manager::{LayoutCx, LayoutManager, LayoutOutcome};
pub use render::{draw_tree, BoxRenderer, DisplayCommand, DisplayList, DrawStage};
pub use replaced::{ReplacedContent, ReplacedData};
pub use table::{ColumnSlot, TableColumn};
pub use text::TextData;
pub use tree::{BoxId, BoxKind, BoxTree, LayoutBox, NodeId};

use thiserror::Error;

/// Errors that can occur in layout.
///
/// Content that does not fit is not an error; see [`LayoutOutcome`].
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout failed: {0}")]
    LayoutFailed(String),

    #[error("Unknown box: {0:?}")]
    UnknownBox(BoxId),

    #[error("Box tree has no root")]
    EmptyTree,

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("Invalid style: {0}")]
    InvalidStyle(#[from] boxkit_css::CssError),
}

/// A rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Grow the rectangle outward by `edges`.
    pub fn expand(&self, edges: &EdgeSizes) -> Rect {
        Rect {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// Shrink the rectangle inward by `edges`.
    pub fn shrink(&self, edges: &EdgeSizes) -> Rect {
        Rect {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A width and a height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// Edge sizes (margin, padding, border, offsets).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Component-wise sum.
    pub fn add(&self, other: &EdgeSizes) -> EdgeSizes {
        EdgeSizes {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert!(r.contains(10.0, 20.0));
        assert!(!r.contains(110.0, 20.0));
    }

    #[test]
    fn test_rect_expand_shrink() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        let e = EdgeSizes::new(1.0, 2.0, 3.0, 4.0);
        let grown = r.expand(&e);
        assert_eq!(grown, Rect::new(6.0, 9.0, 106.0, 54.0));
        assert_eq!(grown.shrink(&e), r);
        assert_eq!(Rect::new(0.0, 0.0, 2.0, 2.0).shrink(&EdgeSizes::uniform(5.0)).width, 0.0);
    }

    #[test]
    fn test_edge_sums() {
        let e = EdgeSizes::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.horizontal(), 6.0);
        assert_eq!(e.vertical(), 4.0);
        assert_eq!(e.add(&e).left, 8.0);
    }
}

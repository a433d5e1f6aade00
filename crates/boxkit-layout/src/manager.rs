//! Layout strategy dispatch.
//!
//! Every box kind is laid out by one [`LayoutManager`]. A layout call gets the
//! width offered by the parent and reports through [`LayoutOutcome`] whether
//! anything was placed; content that did not fit comes back as a
//! continuation box that the caller places next.

use tracing::trace;

use crate::block::BlockLayout;
use crate::config::LayoutConfig;
use crate::flex::FlexLayout;
use crate::inline::InlineLayout;
use crate::replaced::ReplacedLayout;
use crate::table::{TableLayout, TableWrapperLayout};
use crate::text::TextLayout;
use crate::tree::{BoxId, BoxKind, BoxTree};

/// Mutable state shared by the layout managers of one pass.
pub struct LayoutCx<'a> {
    pub tree: &'a mut BoxTree,
    pub config: &'a LayoutConfig,
}

impl<'a> LayoutCx<'a> {
    pub fn new(tree: &'a mut BoxTree, config: &'a LayoutConfig) -> Self {
        Self { tree, config }
    }
}

/// Result of laying out one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOutcome {
    /// Some content was placed (or nothing had to be).
    pub fits: bool,
    /// Continuation holding the content that did not fit.
    pub rest: Option<BoxId>,
}

impl LayoutOutcome {
    pub fn fit() -> Self {
        Self {
            fits: true,
            rest: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            fits: false,
            rest: None,
        }
    }

    pub fn split(rest: Option<BoxId>) -> Self {
        Self { fits: true, rest }
    }
}

/// A layout strategy.
pub trait LayoutManager {
    /// Lay out `id` into `avail_width` (the margin box width offered).
    ///
    /// With `force` set the box places at least one unbreakable unit even if
    /// it overflows; `line_start` tells inline content it starts a line.
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        force: bool,
        line_start: bool,
    ) -> LayoutOutcome;
}

/// Boxes whose geometry is assigned by their parent.
struct PassiveLayout;

impl LayoutManager for PassiveLayout {
    fn layout(
        &self,
        _cx: &mut LayoutCx<'_>,
        _id: BoxId,
        _avail_width: f32,
        _force: bool,
        _line_start: bool,
    ) -> LayoutOutcome {
        LayoutOutcome::fit()
    }
}

/// The manager responsible for a box kind.
pub fn manager_for(kind: &BoxKind) -> &'static dyn LayoutManager {
    match kind {
        BoxKind::Text(_) => &TextLayout,
        BoxKind::Inline => &InlineLayout,
        BoxKind::Replaced(_) => &ReplacedLayout,
        BoxKind::TableWrapper(_) => &TableWrapperLayout,
        BoxKind::Table(_) => &TableLayout,
        BoxKind::Flex(_) => &FlexLayout,
        BoxKind::TableBody(_)
        | BoxKind::TableRow(_)
        | BoxKind::TableColumn(_)
        | BoxKind::TableColumnGroup(_) => {
            &PassiveLayout
        }
        BoxKind::Viewport
        | BoxKind::Block
        | BoxKind::ListItem
        | BoxKind::InlineBlock
        | BoxKind::TableCell(_)
        | BoxKind::TableCaption => &BlockLayout,
    }
}

/// Lay out one box with the manager of its kind.
pub fn layout_box(
    cx: &mut LayoutCx<'_>,
    id: BoxId,
    avail_width: f32,
    force: bool,
    line_start: bool,
) -> LayoutOutcome {
    let manager = manager_for(&cx.tree[id].kind);
    let outcome = manager.layout(cx, id, avail_width, force, line_start);
    trace!(
        box_id = id.index(),
        kind = cx.tree[id].kind.name(),
        avail_width,
        force,
        fits = outcome.fits,
        split = outcome.rest.is_some(),
        "box laid out"
    );
    outcome
}

//! Vertical margin collapsing.
//!
//! # Rules
//!
//! Two adjoining vertical margins collapse into one:
//! - Two positive margins: use the larger
//! - Two negative margins: use the more negative
//! - One positive, one negative: algebraic sum
//!
//! A block's top margin collapses with the top margin of its first in-flow
//! child unless border, padding or the root element separate them; the same
//! holds for the bottom margin and the last child. A box whose own top and
//! bottom margins adjoin (no content, height, border or padding) collapses
//! them into a single margin.
//!
//! The collapsed values are stored as the box's effective margins
//! (`emargin`); the declared ones stay in `margin`.

use boxkit_css::Display;

use crate::tree::{BoxId, BoxKind, BoxTree, LayoutBox};

/// Collapsible margin with positive and negative components kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollapsibleMargin {
    /// Largest positive component (always >= 0).
    pub positive: f32,
    /// Most negative component stored as its absolute value (always >= 0).
    pub negative: f32,
}

impl CollapsibleMargin {
    pub fn from_margin(value: f32) -> Self {
        if value >= 0.0 {
            Self {
                positive: value,
                negative: 0.0,
            }
        } else {
            Self {
                positive: 0.0,
                negative: -value,
            }
        }
    }

    pub fn collapse_with(self, other: Self) -> Self {
        Self {
            positive: self.positive.max(other.positive),
            negative: self.negative.max(other.negative),
        }
    }

    pub fn resolve(self) -> f32 {
        self.positive - self.negative
    }
}

/// Height of two collapsed margins.
pub fn collapsed_margin_height(m1: f32, m2: f32) -> f32 {
    CollapsibleMargin::from_margin(m1)
        .collapse_with(CollapsibleMargin::from_margin(m2))
        .resolve()
}

/// The top margin of `b` is separated from its children's.
pub fn separated_from_top(b: &LayoutBox) -> bool {
    b.border.top > 0.0 || b.padding.top > 0.0 || b.is_root
}

/// The bottom margin of `b` is separated from its children's.
pub fn separated_from_bottom(b: &LayoutBox) -> bool {
    b.border.bottom > 0.0 || b.padding.bottom > 0.0 || b.is_root
}

/// Whether the box starts a new block formatting context for its content.
pub fn establishes_bfc(b: &LayoutBox) -> bool {
    b.float != boxkit_css::Float::None
        || b.position.is_out_of_flow()
        || b.style.overflow_x.clips_content()
        || b.style.overflow_y.clips_content()
        || b.style.display.is_inline_block()
        || matches!(b.style.display, Display::TableCell | Display::TableCaption)
        || matches!(b.kind, BoxKind::Viewport | BoxKind::Flex(_))
        || b.is_root
}

/// Whether the top and bottom margins of the box touch each other.
pub fn margins_adjoin(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(_) => crate::intrinsic::is_whitespace(tree, id),
        BoxKind::Replaced(_) => false,
        BoxKind::Inline => b
            .sub_boxes()
            .iter()
            .all(|&child| margins_adjoin(tree, child)),
        _ => {
            if b.padding.vertical() > 0.0 || b.border.vertical() > 0.0 {
                false
            } else if b.limits.min_height.map_or(false, |h| h > 0.0) {
                false
            } else if b.flags.hset {
                b.content.height == 0.0
            } else if b.kind.is_block_container() {
                b.sub_boxes().iter().all(|&child| {
                    if tree[child].is_element() {
                        margins_adjoin(tree, child)
                    } else {
                        crate::intrinsic::is_whitespace(tree, child)
                    }
                })
            } else {
                b.content.height == 0.0
            }
        }
    }
}

/// Compute the effective top and bottom margins of `id` and its in-flow descendants.
pub fn compute_efficient_margins(tree: &mut BoxTree, id: BoxId) {
    {
        let b = &mut tree[id];
        b.emargin.top = b.margin.top;
        b.emargin.bottom = b.margin.bottom;
    }
    match tree[id].kind {
        BoxKind::Inline
        | BoxKind::Text(_)
        | BoxKind::TableCell(_)
        | BoxKind::TableRow(_)
        | BoxKind::TableBody(_)
        | BoxKind::TableColumn(_)
        | BoxKind::TableColumnGroup(_) => return,
        _ => {}
    }

    let collapses_inside = tree[id].kind.is_block_container()
        && tree[id].block.contains_blocks
        && tree[id].block.any_in_flow
        && !establishes_bfc(&tree[id]);
    if collapses_inside {
        let children = tree[id].sub_boxes().to_vec();
        let sep_top = separated_from_top(&tree[id]);
        let sep_bottom = separated_from_bottom(&tree[id]);
        let mut first_separated = false;
        let mut mtop = tree[id].emargin.top;
        let mut mbottom = 0.0f32;
        for child in children {
            if !tree[child].is_block || !tree[child].is_in_flow() {
                continue;
            }
            compute_efficient_margins(tree, child);
            let empty = margins_adjoin(tree, child);
            let (ctop, cbottom) = (tree[child].emargin.top, tree[child].emargin.bottom);
            if !first_separated && !sep_top && ctop > mtop {
                mtop = ctop;
            }
            if empty {
                mbottom = mbottom.max(ctop.max(cbottom));
            } else {
                mbottom = cbottom;
                first_separated = true;
            }
        }
        let b = &mut tree[id];
        b.emargin.top = mtop;
        if mbottom > b.emargin.bottom && !sep_bottom {
            b.emargin.bottom = mbottom;
        }
    } else {
        let children = tree[id].sub_boxes().to_vec();
        for child in children {
            if tree[child].is_block && tree[child].is_in_flow() {
                compute_efficient_margins(tree, child);
            }
        }
    }

    if margins_adjoin(tree, id) {
        let b = &mut tree[id];
        b.emargin.top = b.emargin.top.max(b.emargin.bottom);
        b.emargin.bottom = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_two_positive_margins() {
        assert_eq!(collapsed_margin_height(20.0, 10.0), 20.0);
    }

    #[test]
    fn test_collapse_two_negative_margins() {
        assert_eq!(collapsed_margin_height(-20.0, -10.0), -20.0);
    }

    #[test]
    fn test_collapse_mixed_margins() {
        assert_eq!(collapsed_margin_height(20.0, -5.0), 15.0);
        assert_eq!(collapsed_margin_height(-20.0, 5.0), -15.0);
    }

    #[test]
    fn test_collapse_commutative() {
        for (a, b) in [(3.0, 7.0), (-3.0, 7.0), (-3.0, -7.0), (0.0, 4.0)] {
            assert_eq!(collapsed_margin_height(a, b), collapsed_margin_height(b, a));
        }
    }

    #[test]
    fn test_collapsible_margin_components() {
        let m = CollapsibleMargin::from_margin(-10.0);
        assert_eq!(m.positive, 0.0);
        assert_eq!(m.negative, 10.0);
        assert_eq!(m.collapse_with(CollapsibleMargin::from_margin(4.0)).resolve(), -6.0);
    }
}

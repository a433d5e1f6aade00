//! Intrinsic widths, split opportunities and line metrics of inline-level boxes.
//!
//! These queries are pure reads of the tree. They are used by shrink-to-fit,
//! the table column algorithm and flex `content` sizing, and by the line
//! breaking code to decide where a line may end.

use boxkit_css::VerticalAlign;

use crate::line_box::InlineMetrics;
use crate::tree::{BoxId, BoxKind, BoxTree, LayoutBox};

fn decorations(b: &LayoutBox) -> f32 {
    b.decl_margin.horizontal() + b.padding.horizontal() + b.border.horizontal()
}

fn inline_decorations(b: &LayoutBox) -> f32 {
    b.margin.horizontal() + b.padding.horizontal() + b.border.horizontal()
}

/// The box contains nothing but whitespace.
pub fn is_whitespace(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.current().trim().is_empty(),
        BoxKind::Replaced(_) => false,
        _ if b.is_block && !b.block.any_in_flow && !b.encloses_floats() => true,
        _ => b.sub_boxes().iter().all(|&child| is_whitespace(tree, child)),
    }
}

/// The box ends with a whitespace character.
pub fn ends_with_whitespace(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.current().ends_with(char::is_whitespace),
        BoxKind::Inline => b
            .sub_boxes()
            .last()
            .map_or(false, |&last| ends_with_whitespace(tree, last)),
        _ => false,
    }
}

/// A line may break somewhere inside the box.
pub fn can_split_inside(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.current().contains(' '),
        BoxKind::Inline => b.sub_boxes().iter().any(|&c| can_split_inside(tree, c)),
        _ => false,
    }
}

/// A line may break right before the box.
pub fn can_split_before(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.can_split_before(),
        BoxKind::Inline => b
            .sub_boxes()
            .first()
            .map_or(false, |&first| can_split_before(tree, first)),
        _ => true,
    }
}

/// A line may break right after the box.
pub fn can_split_after(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.can_split_after(),
        BoxKind::Inline => b
            .sub_boxes()
            .last()
            .map_or(false, |&last| can_split_after(tree, last)),
        _ => true,
    }
}

/// The box contains a preserved line break.
pub fn contains_line_break(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.contains_line_break,
        BoxKind::Inline => b.sub_boxes().iter().any(|&c| contains_line_break(tree, c)),
        _ => false,
    }
}

/// Width of the content before the first preserved line break.
pub fn first_line_length(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.first_line_length,
        BoxKind::Inline => {
            let mut ret = b.margin.left + b.padding.left + b.border.left;
            for &child in b.sub_boxes() {
                if contains_line_break(tree, child) {
                    return ret + first_line_length(tree, child);
                }
                ret += maximal_width(tree, child);
            }
            ret + b.margin.right + b.padding.right + b.border.right
        }
        _ => maximal_width(tree, id),
    }
}

/// Width of the content after the last preserved line break.
pub fn last_line_length(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    match &b.kind {
        BoxKind::Text(data) => data.last_line_length,
        BoxKind::Inline => {
            let mut ret = b.margin.right + b.padding.right + b.border.right;
            for &child in b.sub_boxes().iter().rev() {
                if contains_line_break(tree, child) {
                    return ret + last_line_length(tree, child);
                }
                ret += maximal_width(tree, child);
            }
            ret + b.margin.left + b.padding.left + b.border.left
        }
        _ => maximal_width(tree, id),
    }
}

/// Width of the widest unbreakable unit including the box's own decorations.
pub fn minimal_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    if !b.displayed {
        return 0.0;
    }
    match &b.kind {
        BoxKind::Text(data) => data.min_width,
        BoxKind::Inline => {
            let inner = b
                .sub_boxes()
                .iter()
                .map(|&c| minimal_width(tree, c))
                .fold(0.0, f32::max);
            inner + inline_decorations(b)
        }
        BoxKind::Replaced(_) => b.content.width + decorations(b),
        BoxKind::TableWrapper(_) | BoxKind::Table(_) => crate::table::minimal_width(tree, id),
        // the cell width is assigned by its column
        BoxKind::TableCell(_) => minimal_content_width(tree, id) + decorations(b),
        _ => {
            let content = if b.flags.wset && !b.flags.wrelative {
                b.content.width
            } else {
                minimal_content_width(tree, id)
            };
            b.limits.clamp_width(content) + decorations(b)
        }
    }
}

/// Width of the content laid out without any line breaks, plus decorations.
pub fn maximal_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    if !b.displayed {
        return 0.0;
    }
    match &b.kind {
        BoxKind::Text(data) => data.max_width,
        BoxKind::Inline => {
            let inner = if b.preserves_line_breaks() {
                let mut ret = 0.0f32;
                let mut cur = 0.0f32;
                for &child in b.sub_boxes() {
                    if contains_line_break(tree, child) {
                        ret = ret.max(cur + first_line_length(tree, child));
                        ret = ret.max(maximal_width(tree, child));
                        cur = last_line_length(tree, child);
                    } else {
                        cur += maximal_width(tree, child);
                    }
                }
                ret.max(cur)
            } else {
                b.sub_boxes().iter().map(|&c| maximal_width(tree, c)).sum()
            };
            inner + inline_decorations(b)
        }
        BoxKind::Replaced(_) => b.content.width + decorations(b),
        BoxKind::TableWrapper(_) | BoxKind::Table(_) => crate::table::maximal_width(tree, id),
        BoxKind::TableCell(_) => maximal_content_width(tree, id) + decorations(b),
        _ => {
            let content = if b.flags.wset && !b.flags.wrelative {
                b.content.width
            } else {
                maximal_content_width(tree, id)
            };
            b.limits.clamp_width(content) + decorations(b)
        }
    }
}

/// Minimal width of the box's content without its own decorations.
pub fn minimal_content_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    if let BoxKind::Flex(_) = b.kind {
        return crate::flex::minimal_content_width(tree, id);
    }
    let wrapping = b.allows_wrapping();
    let mut ret = 0.0f32;
    let mut max = 0.0f32;
    let mut sum = 0.0f32;
    for &child in b.sub_boxes() {
        let c = &tree[child];
        if !c.is_block {
            if wrapping && can_split_before(tree, child) {
                sum = 0.0;
            }
            sum += minimal_width(tree, child);
        } else if !c.position.is_out_of_flow() {
            max = max.max(minimal_width(tree, child));
            sum = 0.0;
        }
        ret = ret.max(sum).max(max);
        if wrapping && can_split_after(tree, child) {
            sum = 0.0;
        }
    }
    ret
}

/// Maximal width of the box's content without its own decorations.
pub fn maximal_content_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    if let BoxKind::Flex(_) = b.kind {
        return crate::flex::maximal_content_width(tree, id);
    }
    let mut sum = 0.0f32;
    let mut max = 0.0f32;
    for &child in b.sub_boxes() {
        let c = &tree[child];
        if c.is_block {
            if c.is_floating() {
                sum += maximal_width(tree, child);
            } else if c.is_in_flow() {
                let sm = maximal_width(tree, child);
                max = max.max(sm).max(sum);
                sum = 0.0;
            }
        } else if b.preserves_line_breaks() {
            max = max.max(maximal_width(tree, child));
        } else {
            sum += maximal_width(tree, child);
        }
    }
    sum.max(max)
}

/// Minimal decoration width used when placing a box beside floats; the
/// content is not considered.
pub fn minimal_decoration_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    let content = if b.flags.wset { b.content.width } else { 0.0 };
    b.limits.clamp_width(content) + decorations(b)
}

/// Lower bound of the content width imposed by CSS (explicit or minimal
/// width) rather than by the content.
pub fn minimal_content_width_limit(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    if b.flags.wset {
        return b.content.width;
    }
    if let Some(min) = b.limits.min_width.filter(|m| *m > 0.0) {
        return min;
    }
    let shrinking = matches!(b.kind, BoxKind::InlineBlock | BoxKind::TableCell(_));
    if b.is_in_flow() && !shrinking {
        if let Some(cb) = b.containing_block {
            return (minimal_content_width_limit(tree, cb) - decorations(b)).max(0.0);
        }
    }
    0.0
}

/// Vertical metrics of an inline-level box for line alignment.
pub fn inline_metrics(tree: &BoxTree, id: BoxId) -> InlineMetrics {
    let b = &tree[id];
    let valign = b.vertical_align();
    let base = InlineMetrics {
        displayed: b.displayed,
        collapsed: false,
        element: true,
        valign,
        valign_offset: InlineMetrics::resolve_valign(&b.ctx, valign, b.line_height),
        baseline_offset: 0.0,
        below_baseline: 0.0,
        max_line_height: 0.0,
        line_height: b.line_height,
        linebox_offset: 0.0,
    };
    match &b.kind {
        BoxKind::Text(data) => {
            let ascent = b.ctx.baseline_offset();
            InlineMetrics {
                element: false,
                valign: VerticalAlign::Baseline,
                valign_offset: 0.0,
                collapsed: b.inline.collapsed,
                baseline_offset: ascent,
                below_baseline: b.ctx.font_height() - ascent,
                max_line_height: b.line_height,
                ..base
            }
        }
        BoxKind::Inline => InlineMetrics {
            collapsed: b.inline.collapsed,
            baseline_offset: b.inline.baseline_offset,
            below_baseline: b.inline.below_baseline,
            max_line_height: b.inline.max_line_height,
            linebox_offset: b.inline.linebox_offset,
            ..base
        },
        BoxKind::Replaced(_) => {
            let h = b.height();
            InlineMetrics {
                baseline_offset: h,
                below_baseline: 0.0,
                max_line_height: h,
                line_height: h,
                ..base
            }
        }
        _ => {
            let h = b.height();
            InlineMetrics {
                baseline_offset: b.block.baseline,
                below_baseline: h - b.block.baseline,
                max_line_height: h,
                line_height: h,
                ..base
            }
        }
    }
}

/// Baseline position of the last line of `id`, relative to its content box.
pub fn last_inline_baseline(tree: &BoxTree, id: BoxId) -> Option<f32> {
    let b = &tree[id];
    let child = b.sub_boxes().iter().rev().copied().find(|&c| tree[c].is_in_flow())?;
    baseline_in(tree, child, last_inline_baseline)
}

/// Baseline position of the first line of `id`, relative to its content box.
pub fn first_inline_baseline(tree: &BoxTree, id: BoxId) -> Option<f32> {
    let b = &tree[id];
    let child = b.sub_boxes().iter().copied().find(|&c| tree[c].is_in_flow())?;
    baseline_in(tree, child, first_inline_baseline)
}

fn baseline_in(
    tree: &BoxTree,
    child: BoxId,
    nested: fn(&BoxTree, BoxId) -> Option<f32>,
) -> Option<f32> {
    let c = &tree[child];
    if c.is_block {
        nested(tree, child).map(|b| c.content_y() + b)
    } else if c.kind.is_text() || matches!(c.kind, BoxKind::Inline) {
        let m = inline_metrics(tree, child);
        Some(c.content_y() - m.linebox_offset + m.baseline_offset)
    } else {
        Some(c.bounds.y + inline_metrics(tree, child).baseline_offset)
    }
}

//! Box model sizing: margins, borders, padding, widths and heights.
//!
//! Sizes are loaded once top-down before layout and updated whenever the
//! containing block changes its size (shrink-to-fit, table columns, flex
//! lines). Widths follow the CSS 2.1 rules for in-flow, floating and
//! absolutely positioned boxes; percentages refer to the containing block.

use boxkit_css::{BorderStyle, BoxSizing, ComputedStyle, Length};
use tracing::trace;

use crate::context::{CssDecoder, VisualContext};
use crate::margin_collapse::compute_efficient_margins;
use crate::tree::{BoxId, BoxKind, BoxTree, LayoutBox};
use crate::{EdgeSizes, Size};

/// Facts about the containing block needed while sizing one box.
#[derive(Debug, Clone, Copy)]
struct Containing {
    size: Size,
    fixed_height: bool,
    can_grow: bool,
}

impl Containing {
    fn of(tree: &BoxTree, id: BoxId) -> Self {
        Self {
            size: tree.containing_block_size(id),
            fixed_height: tree.containing_block_fixed_height(id),
            can_grow: tree.containing_block_can_grow(id),
        }
    }
}

/// Load sizes of the whole subtree and compute the effective margins.
pub fn initialize_subtree(tree: &mut BoxTree, id: BoxId) {
    load_sizes(tree, id, false);
    let children = tree[id].children.clone();
    for child in children {
        initialize_subtree(tree, child);
    }
    compute_efficient_margins(tree, id);
}

/// Recompute the sizes after the containing block changed.
pub fn update_sizes(tree: &mut BoxTree, id: BoxId) {
    load_sizes(tree, id, true);
}

/// Load margins, borders, padding, position offsets and content size.
///
/// With `update` set, borders are kept, the explicit content size is not
/// reset and the already collapsed vertical margins stay in place.
pub fn load_sizes(tree: &mut BoxTree, id: BoxId, update: bool) {
    if !tree[id].displayed {
        let b = &mut tree[id];
        b.content = Size::zero();
        b.bounds = crate::Rect::zero();
        b.margin = EdgeSizes::default();
        b.emargin = EdgeSizes::default();
        b.border = EdgeSizes::default();
        b.padding = EdgeSizes::default();
        return;
    }
    let cb = Containing::of(tree, id);
    let viewport = tree.viewport_size();
    let ctx = tree[id].ctx.clone();
    let dec = CssDecoder::new(&ctx);
    let b = &mut tree[id];
    match b.kind {
        BoxKind::Viewport => {
            b.content = viewport;
            b.flags.wset = true;
            b.flags.hset = true;
            b.set_size(viewport.width, viewport.height);
        }
        BoxKind::Text(_) => {
            b.content = Size::zero();
            if !update {
                b.bounds = crate::Rect::zero();
            }
        }
        BoxKind::Inline => load_inline_sizes(b, &dec, cb.size.width),
        BoxKind::TableBody(_)
        | BoxKind::TableRow(_)
        | BoxKind::TableColumn(_)
        | BoxKind::TableColumnGroup(_) => {
            b.margin = EdgeSizes::default();
            b.emargin = EdgeSizes::default();
            b.decl_margin = EdgeSizes::default();
            b.padding = EdgeSizes::default();
            b.border = EdgeSizes::default();
            if !update {
                b.content = Size::zero();
            }
        }
        _ => load_block_sizes(b, &dec, cb, update),
    }
    if let BoxKind::Replaced(_) = tree[id].kind {
        crate::replaced::load_replaced_size(tree, id);
    }
    trace!(
        box_id = id.index(),
        kind = tree[id].kind.name(),
        width = tree[id].content.width,
        height = tree[id].content.height,
        update,
        "sizes loaded"
    );
}

/// Recompute the sizes of block children after this box changed its content size.
pub fn update_child_sizes(tree: &mut BoxTree, id: BoxId) {
    let children = tree[id].sub_boxes().to_vec();
    for child in children {
        let updatable = tree[child].displayed
            && tree[child].is_block
            && matches!(
                tree[child].kind,
                BoxKind::Block
                    | BoxKind::ListItem
                    | BoxKind::TableWrapper(_)
                    | BoxKind::Flex(_)
                    | BoxKind::Replaced(_)
            );
        if !updatable {
            continue;
        }
        let orig = tree[child].content;
        update_sizes(tree, child);
        let c = &mut tree[child];
        let (w, h) = (c.total_width(), c.total_height());
        c.set_size(w, h);
        if c.content != orig {
            update_child_sizes(tree, child);
        }
    }
}

fn load_borders(b: &mut LayoutBox, dec: &CssDecoder<'_>, contw: f32) {
    let s = &b.style;
    let side = |style: BorderStyle, width: Length| {
        if style.is_visible() {
            dec.px(width, contw)
        } else {
            0.0
        }
    };
    b.border = EdgeSizes::new(
        side(s.border_top_style, s.border_top_width),
        side(s.border_right_style, s.border_right_width),
        side(s.border_bottom_style, s.border_bottom_width),
        side(s.border_left_style, s.border_left_width),
    );
}

fn load_padding(b: &mut LayoutBox, dec: &CssDecoder<'_>, contw: f32) {
    let s = &b.style;
    b.padding = EdgeSizes::new(
        dec.px(s.padding_top, contw),
        dec.px(s.padding_right, contw),
        dec.px(s.padding_bottom, contw),
        dec.px(s.padding_left, contw),
    );
}

/// Resolve `top`/`right`/`bottom`/`left` and record which ones are set.
fn load_position(b: &mut LayoutBox, dec: &CssDecoder<'_>, size: Size) {
    let s = &b.style;
    b.flags.top_set = !s.top.is_auto();
    b.flags.right_set = !s.right.is_auto();
    b.flags.bottom_set = !s.bottom.is_auto();
    b.flags.left_set = !s.left.is_auto();
    let resolve = |set: bool, len: Length, whole: f32| if set { dec.px(len, whole) } else { 0.0 };
    b.coords = EdgeSizes::new(
        resolve(b.flags.top_set, s.top, size.height),
        resolve(b.flags.right_set, s.right, size.width),
        resolve(b.flags.bottom_set, s.bottom, size.height),
        resolve(b.flags.left_set, s.left, size.width),
    );
}

fn load_inline_sizes(b: &mut LayoutBox, dec: &CssDecoder<'_>, contw: f32) {
    let s = &b.style;
    let mut margin = EdgeSizes::default();
    margin.left = dec.length(s.margin_left, s.margin_left.is_auto(), 0.0, 0.0, contw);
    margin.right = dec.length(s.margin_right, s.margin_right.is_auto(), 0.0, 0.0, contw);
    b.margin = margin;
    b.decl_margin = margin;
    b.emargin = margin;
    load_borders(b, dec, contw);
    load_padding(b, dec, contw);
    b.content = Size::zero();
    let size = Size::new(contw, 0.0);
    load_position(b, dec, size);
}

fn load_block_sizes(b: &mut LayoutBox, dec: &CssDecoder<'_>, cb: Containing, update: bool) {
    let contw = cb.size.width;
    if !update {
        load_borders(b, dec, contw);
    }
    load_padding(b, dec, contw);
    if let BoxKind::TableWrapper(_) = b.kind {
        // decorations belong to the inner table
        b.border = EdgeSizes::default();
        b.padding = EdgeSizes::default();
    }
    load_position(b, dec, cb.size);
    if !update {
        b.content = Size::zero();
        b.margin = EdgeSizes::default();
        b.decl_margin = EdgeSizes::default();
    }
    load_widths_heights(b, dec, cb, update);
    if matches!(b.kind, BoxKind::Table(_) | BoxKind::TableCell(_)) {
        b.margin = EdgeSizes::default();
        b.decl_margin = EdgeSizes::default();
    }
    if !update {
        b.emargin = b.margin;
        b.block.width_adjust = 0.0;
    } else {
        b.emargin.left = b.margin.left;
        b.emargin.right = b.margin.right;
    }
    b.block.indent = dec.px(b.style.text_indent, contw);
}

/// The `width` used for sizing; a table wrapper is auto until its table is laid out.
fn declared_width(b: &LayoutBox) -> Length {
    match &b.kind {
        BoxKind::TableWrapper(data) => match data.pinned_width {
            Some(w) => Length::Px(w),
            None => Length::Auto,
        },
        _ => b.style.width,
    }
}

fn load_widths_heights(b: &mut LayoutBox, dec: &CssDecoder<'_>, cb: Containing, update: bool) {
    let (contw, conth) = (cb.size.width, cb.size.height);
    let s: &ComputedStyle = &b.style;
    let auto_min_h = s.min_height.is_percent() && !cb.fixed_height;
    let min_width = Some(dec.px(s.min_width, contw));
    let min_height = if auto_min_h { None } else { Some(dec.px(s.min_height, conth)) };
    let max_width = if s.max_width.is_auto() { None } else { Some(dec.px(s.max_width, contw)) };
    let auto_max_h = s.max_height.is_auto() || (s.max_height.is_percent() && !cb.fixed_height);
    let max_height = if auto_max_h { None } else { Some(dec.px(s.max_height, conth)) };
    b.limits.min_width = min_width;
    b.limits.min_height = min_height;
    b.limits.max_width = match (max_width, min_width) {
        (Some(max), Some(min)) if max < min => Some(min),
        (max, _) => max,
    };
    b.limits.max_height = match (max_height, min_height) {
        (Some(max), Some(min)) if max < min => Some(min),
        (max, _) => max,
    };

    let width = declared_width(b);
    let wauto = width.is_auto();
    compute_widths(b, dec, width, wauto, true, cb, update);
    if let Some(max) = b.limits.max_width {
        if b.content.width > max {
            let w = b.style.max_width;
            compute_widths(b, dec, w, false, false, cb, update);
        }
    }
    if let Some(min) = b.limits.min_width {
        if b.content.width < min {
            let w = b.style.min_width;
            compute_widths(b, dec, w, false, false, cb, update);
        }
    }

    let height = b.style.height;
    let hauto = height.is_auto();
    compute_heights(b, dec, height, hauto, true, cb, update);
    if let Some(max) = b.limits.max_height {
        if b.content.height > max {
            let h = b.style.max_height;
            compute_heights(b, dec, h, false, false, cb, update);
        }
    }
    if let Some(min) = b.limits.min_height {
        if b.content.height < min {
            let h = b.style.min_height;
            compute_heights(b, dec, h, false, false, cb, update);
        }
    }

    if b.style.box_sizing == BoxSizing::BorderBox {
        if !wauto {
            let dw = b.border.horizontal() + b.padding.horizontal();
            b.content.width = (b.content.width - dw).max(0.0);
        }
        if !hauto {
            let dh = b.border.vertical() + b.padding.vertical();
            b.content.height = (b.content.height - dh).max(0.0);
        }
    }

    let adjust = b.block.width_adjust;
    if update && adjust != 0.0 {
        if !b.flags.wset {
            b.content.width += adjust;
        } else if b.flags.mleft_auto {
            b.margin.left += adjust;
        } else {
            b.margin.right += adjust;
        }
    }
}

fn compute_widths(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    width: Length,
    auto: bool,
    exact: bool,
    cb: Containing,
    update: bool,
) {
    b.flags.mleft_auto = b.style.margin_left.is_auto();
    b.flags.mright_auto = b.style.margin_right.is_auto();
    let update = update && b.flags.width_computed;
    if b.position.is_out_of_flow() {
        compute_widths_absolute(b, dec, width, auto, exact, cb.size.width, update);
    } else if matches!(b.kind, BoxKind::InlineBlock | BoxKind::TableCell(_))
        || b.flex_item.is_some()
    {
        // the main or cross size of a flex item is assigned by its container
        compute_widths_shrinking(b, dec, width, auto, exact, cb.size.width, update);
    } else {
        compute_widths_in_flow(b, dec, width, auto, exact, cb, update);
    }
}

fn compute_widths_in_flow(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    width: Length,
    auto: bool,
    exact: bool,
    cb: Containing,
    update: bool,
) {
    let contw = cb.size.width;
    let (mleft, mright) = (b.style.margin_left, b.style.margin_right);
    let (mleft_auto, mright_auto) = (b.flags.mleft_auto, b.flags.mright_auto);
    let decorations = b.border.horizontal() + b.padding.horizontal();
    if auto {
        if exact {
            b.flags.wset = false;
        }
        b.margin.left = dec.length(mleft, mleft_auto, 0.0, 0.0, contw);
        b.margin.right = dec.length(mright, mright_auto, 0.0, 0.0, contw);
        b.decl_margin.left = b.margin.left;
        b.decl_margin.right = b.margin.right;
        if !update || b.is_in_flow() {
            b.content.width = (contw - b.margin.horizontal() - decorations).max(0.0);
        }
    } else {
        if exact {
            b.flags.wset = true;
            b.flags.wrelative = width.is_percent();
        }
        b.content.width = dec.length(width, false, 0.0, 0.0, contw);
        b.margin.left = dec.length(mleft, mleft_auto, 0.0, 0.0, contw);
        b.margin.right = dec.length(mright, mright_auto, 0.0, 0.0, contw);
        b.decl_margin.left = b.margin.left;
        b.decl_margin.right = b.margin.right;
        if b.is_in_flow() && !width.is_percent() {
            let rest = contw - b.content.width - decorations;
            if mleft_auto && mright_auto {
                if rest >= 0.0 {
                    b.margin.left = rest / 2.0;
                    b.margin.right = rest / 2.0;
                } else {
                    b.margin.left = 0.0;
                    b.margin.right = rest;
                }
            } else if mleft_auto {
                b.margin.left = rest - b.margin.right;
            } else {
                b.margin.right = rest - b.margin.left;
                if b.margin.right < 0.0 && cb.can_grow {
                    b.margin.right = 0.0;
                }
            }
        }
    }
}

/// Inline-blocks, table cells and flex items: an auto width is resolved later.
fn compute_widths_shrinking(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    width: Length,
    auto: bool,
    exact: bool,
    contw: f32,
    update: bool,
) {
    if exact {
        b.flags.wset = !auto;
        b.flags.wrelative = !auto && width.is_percent();
    }
    if !update {
        b.content.width = dec.length(width, auto, 0.0, 0.0, contw);
    }
    let (mleft, mright) = (b.style.margin_left, b.style.margin_right);
    b.margin.left = dec.length(mleft, b.flags.mleft_auto, 0.0, 0.0, contw);
    b.margin.right = dec.length(mright, b.flags.mright_auto, 0.0, 0.0, contw);
    b.decl_margin.left = b.margin.left;
    b.decl_margin.right = b.margin.right;
}

fn compute_widths_absolute(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    width: Length,
    auto: bool,
    exact: bool,
    contw: f32,
    update: bool,
) {
    let (mleft, mright) = (b.style.margin_left, b.style.margin_right);
    let (mleft_auto, mright_auto) = (b.flags.mleft_auto, b.flags.mright_auto);
    if auto {
        if exact {
            b.flags.wset = false;
        }
        if !update {
            b.content.width = 0.0;
        }
    } else {
        if exact {
            b.flags.wset = true;
            b.flags.wrelative = width.is_percent();
        }
        b.content.width = dec.length(width, false, 0.0, 0.0, contw);
    }

    let f = b.flags;
    let constraints = [f.wset, f.left_set, f.right_set].iter().filter(|set| **set).count();
    let decorations = b.border.horizontal() + b.padding.horizontal();
    if constraints < 3 {
        b.margin.left = if mleft_auto { 0.0 } else { dec.px(mleft, contw) };
        b.margin.right = if mright_auto { 0.0 } else { dec.px(mright, contw) };
    } else if mleft_auto && mright_auto {
        let rest = contw - b.coords.left - b.coords.right - decorations - b.content.width;
        b.margin.left = (rest + 1.0) / 2.0;
        b.margin.right = rest / 2.0;
    } else if mleft_auto {
        b.margin.right = dec.px(mright, contw);
        b.margin.left = contw - b.coords.right - decorations - b.content.width - b.margin.right;
    } else if mright_auto {
        b.margin.left = dec.px(mleft, contw);
        b.margin.right = contw - b.coords.right - decorations - b.content.width - b.margin.left;
    } else {
        b.margin.left = dec.px(mleft, contw);
        b.margin.right = dec.px(mright, contw);
    }
    b.decl_margin.left = b.margin.left;
    b.decl_margin.right = b.margin.right;

    let remainder = |b: &LayoutBox| contw - decorations - b.content.width - b.margin.horizontal();
    if !f.left_set && !f.right_set {
        b.flags.left_static = true;
        b.coords.right = remainder(b) - b.coords.left;
    } else if !f.left_set {
        b.coords.left = remainder(b) - b.coords.right;
    } else if !f.right_set {
        b.coords.right = remainder(b) - b.coords.left;
    } else if auto {
        b.content.width =
            contw - b.coords.left - b.coords.right - decorations - b.margin.horizontal();
    } else {
        b.coords.right = remainder(b) - b.coords.left;
    }
}

fn compute_heights(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    height: Length,
    auto: bool,
    exact: bool,
    cb: Containing,
    update: bool,
) {
    if b.position.is_out_of_flow() {
        compute_heights_absolute(b, dec, height, auto, exact, cb.size, update);
    } else {
        compute_heights_in_flow(b, dec, height, auto, exact, cb.size, update);
    }
    b.decl_margin.top = b.margin.top;
    b.decl_margin.bottom = b.margin.bottom;
}

fn compute_heights_in_flow(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    height: Length,
    auto: bool,
    exact: bool,
    size: Size,
    update: bool,
) {
    if !auto {
        if exact {
            b.flags.hset = true;
        }
        if !update {
            b.content.height = dec.px(height, size.height);
        }
    } else if exact {
        b.flags.hset = false;
    }
    let (mtop, mbottom) = (b.style.margin_top, b.style.margin_bottom);
    // vertical margin percentages refer to the containing block width
    b.margin.top = if mtop.is_auto() { 0.0 } else { dec.px(mtop, size.width) };
    b.margin.bottom = if mbottom.is_auto() { 0.0 } else { dec.px(mbottom, size.width) };
}

fn compute_heights_absolute(
    b: &mut LayoutBox,
    dec: &CssDecoder<'_>,
    height: Length,
    auto: bool,
    exact: bool,
    size: Size,
    update: bool,
) {
    let (contw, conth) = (size.width, size.height);
    if !auto {
        b.flags.hset = exact;
        if !update {
            b.content.height = dec.px(height, conth);
        }
    } else {
        b.flags.hset = false;
    }
    let (mtop, mbottom) = (b.style.margin_top, b.style.margin_bottom);
    let (mtop_auto, mbottom_auto) = (mtop.is_auto(), mbottom.is_auto());
    let f = b.flags;
    let constraints = [f.hset, f.top_set, f.bottom_set].iter().filter(|set| **set).count();
    let decorations = b.border.vertical() + b.padding.vertical();
    if constraints < 3 {
        b.margin.top = if mtop_auto { 0.0 } else { dec.px(mtop, contw) };
        b.margin.bottom = if mbottom_auto { 0.0 } else { dec.px(mbottom, contw) };
    } else if mtop_auto && mbottom_auto {
        let rest = conth - b.coords.top - b.coords.bottom - decorations - b.content.height;
        b.margin.top = (rest + 1.0) / 2.0;
        b.margin.bottom = rest / 2.0;
    } else if mtop_auto {
        b.margin.bottom = dec.px(mbottom, contw);
        b.margin.top = conth
            - b.coords.top
            - b.coords.bottom
            - decorations
            - b.content.height
            - b.margin.bottom;
    } else if mbottom_auto {
        b.margin.top = dec.px(mtop, contw);
        b.margin.bottom = conth
            - b.coords.top
            - b.coords.bottom
            - decorations
            - b.content.height
            - b.margin.top;
    } else {
        b.margin.top = dec.px(mtop, contw);
        b.margin.bottom = dec.px(mbottom, contw);
    }

    // once collapsed, the effective margins are the ones in use
    let m = if update { b.emargin } else { b.margin };
    let remainder = |b: &LayoutBox| conth - decorations - m.top - m.bottom - b.content.height;
    if !f.top_set && !f.bottom_set {
        b.flags.top_static = true;
        b.coords.bottom = remainder(b) - b.coords.top;
    } else if !f.top_set {
        b.coords.top = remainder(b) - b.coords.bottom;
    } else if !f.bottom_set {
        b.coords.bottom = remainder(b) - b.coords.top;
    } else if auto {
        b.content.height = conth - b.coords.top - b.coords.bottom - decorations - m.top - m.bottom;
    } else {
        b.coords.bottom = remainder(b) - b.coords.top;
    }
}

/// Line height of a box with the given context and style.
pub fn used_line_height(ctx: &VisualContext, style: &ComputedStyle) -> f32 {
    ctx.line_height(style.line_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FontSpec, MonospaceMeasurer};
    use boxkit_css::{Display, Position};
    use std::sync::Arc;

    fn ctx() -> VisualContext {
        VisualContext::new(
            Arc::new(MonospaceMeasurer::default()),
            FontSpec::new("serif", 16.0),
            Size::new(800.0, 600.0),
        )
    }

    fn tree_with(style: ComputedStyle) -> (BoxTree, BoxId) {
        let mut tree = BoxTree::new(Size::new(800.0, 600.0));
        let vp = tree.push(LayoutBox::new(BoxKind::Viewport, ComputedStyle::new(), ctx()));
        tree.set_root(vp);
        load_sizes(&mut tree, vp, false);
        let mut parent_style = ComputedStyle::new();
        parent_style.display = Display::Block;
        parent_style.width = Length::Px(400.0);
        let parent = tree.push(LayoutBox::new(BoxKind::Block, parent_style, ctx()));
        tree.append_child(vp, parent);
        tree[parent].containing_block = Some(vp);
        tree[parent].position = Position::Relative;
        load_sizes(&mut tree, parent, false);
        let child = tree.push(LayoutBox::new(BoxKind::Block, style, ctx()));
        tree.append_child(parent, child);
        tree[child].containing_block = Some(parent);
        load_sizes(&mut tree, child, false);
        (tree, child)
    }

    fn block_style() -> ComputedStyle {
        let mut style = ComputedStyle::new();
        style.display = Display::Block;
        style
    }

    #[test]
    fn test_auto_width_fills_containing_block() {
        let mut style = block_style();
        style.padding_left = Length::Px(10.0);
        style.margin_right = Length::Px(20.0);
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].content.width, 370.0);
        assert!(!tree[id].flags.wset);
    }

    #[test]
    fn test_auto_margins_center() {
        let mut style = block_style();
        style.width = Length::Px(200.0);
        style.margin_left = Length::Auto;
        style.margin_right = Length::Auto;
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].margin.left, 100.0);
        assert_eq!(tree[id].margin.right, 100.0);
    }

    #[test]
    fn test_overconstrained_recomputes_right_margin() {
        let mut style = block_style();
        style.width = Length::Px(300.0);
        style.margin_left = Length::Px(50.0);
        style.margin_right = Length::Px(10.0);
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].margin.right, 50.0);
        assert_eq!(tree[id].decl_margin.right, 10.0);
    }

    #[test]
    fn test_max_width_then_min_width() {
        let mut style = block_style();
        style.width = Length::Px(500.0);
        style.max_width = Length::Px(250.0);
        style.min_width = Length::Px(300.0);
        let (tree, id) = tree_with(style);
        // max below min is raised to min
        assert_eq!(tree[id].limits.max_width, Some(300.0));
        assert_eq!(tree[id].content.width, 300.0);
    }

    #[test]
    fn test_border_box_sizing() {
        let mut style = block_style();
        style.width = Length::Px(100.0);
        style.padding_left = Length::Px(10.0);
        style.padding_right = Length::Px(10.0);
        style.border_left_style = BorderStyle::Solid;
        style.border_left_width = Length::Px(5.0);
        style.box_sizing = BoxSizing::BorderBox;
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].content.width, 75.0);
    }

    #[test]
    fn test_border_width_ignored_without_style() {
        let mut style = block_style();
        style.border_top_width = Length::Px(7.0);
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].border.top, 0.0);
    }

    #[test]
    fn test_percentage_height_against_auto_parent_is_ignored_for_limits() {
        let mut style = block_style();
        style.min_height = Length::Percent(50.0);
        style.max_height = Length::Percent(50.0);
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].limits.min_height, None);
        assert_eq!(tree[id].limits.max_height, None);
    }

    #[test]
    fn test_absolute_with_left_and_width() {
        let mut style = block_style();
        style.position = Position::Absolute;
        style.left = Length::Px(30.0);
        style.width = Length::Px(100.0);
        let (tree, id) = tree_with(style);
        let b = &tree[id];
        assert!(!b.flags.left_static);
        assert_eq!(b.coords.left, 30.0);
        assert_eq!(b.coords.right, 270.0);
        assert!(b.flags.top_static);
    }

    #[test]
    fn test_absolute_auto_margins_split_rest() {
        let mut style = block_style();
        style.position = Position::Absolute;
        style.left = Length::Px(0.0);
        style.right = Length::Px(0.0);
        style.width = Length::Px(101.0);
        style.margin_left = Length::Auto;
        style.margin_right = Length::Auto;
        let (tree, id) = tree_with(style);
        let b = &tree[id];
        assert_eq!(b.margin.left, 150.0);
        assert_eq!(b.margin.right, 149.5);
    }

    #[test]
    fn test_absolute_stretches_between_offsets() {
        let mut style = block_style();
        style.position = Position::Absolute;
        style.left = Length::Px(10.0);
        style.right = Length::Px(30.0);
        let (tree, id) = tree_with(style);
        assert_eq!(tree[id].content.width, 360.0);
    }
}

//! Block container layout.
//!
//! # Rules
//!
//! - An auto width that is not given by the containing block is resolved by
//!   shrink-to-fit: `min(max(min_content, available), max_content)`.
//! - A block holding only inline-level children breaks them into lines;
//!   otherwise the children are stacked vertically with their margins
//!   collapsed.
//! - Floats are placed into the float lists of the enclosing block
//!   formatting context; line boxes and float-avoiding blocks are narrowed
//!   by them.
//! - Block layout always fits.

use boxkit_css::{Clear, Float, TextAlign};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::float_list::{FloatEntry, FloatList, FloatListId};
use crate::intrinsic::{self, inline_metrics};
use crate::line_box::{LineBox, LineContext};
use crate::manager::{layout_box, LayoutCx, LayoutManager, LayoutOutcome};
use crate::margin_collapse::{
    collapsed_margin_height, margins_adjoin, separated_from_bottom, separated_from_top,
};
use crate::sizing::{update_child_sizes, update_sizes};
use crate::tree::{BoxId, BoxKind, BoxTree, LineSlot};
use crate::{Rect, Size};

/// Layout of block containers (blocks, list items, inline-blocks, table
/// cells, captions and the viewport).
pub struct BlockLayout;

/// Progress of stacking the children of one block.
#[derive(Debug, Default)]
struct BlockStatus {
    /// Width of inline content already placed on the current line.
    inline_width: f32,
    y: f32,
    maxw: f32,
    maxh: f32,
    first_separated: Option<BoxId>,
    last_separated: Option<BoxId>,
    last_in_flow: Option<BoxId>,
}

impl LayoutManager for BlockLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        force: bool,
        _line_start: bool,
    ) -> LayoutOutcome {
        {
            let b = &mut cx.tree[id];
            if !b.displayed {
                b.content = Size::zero();
                b.bounds = Rect::zero();
                return LayoutOutcome::fit();
            }
        }
        clear_splitted(cx.tree, id);
        if cx.tree[id].block.float_left.is_none()
            || matches!(cx.tree[id].kind, BoxKind::InlineBlock)
        {
            set_own_floats(cx.tree, id);
        }

        if !cx.tree[id].has_fixed_width() {
            let tree = &*cx.tree;
            let min = intrinsic::minimal_content_width_limit(tree, id)
                .max(intrinsic::minimal_content_width(tree, id));
            let max = intrinsic::maximal_content_width(tree, id);
            let b = &tree[id];
            let availcont = avail_width
                - b.emargin.horizontal()
                - b.border.horizontal()
                - b.padding.horizontal();
            let pref = min.max(availcont).min(max);
            trace!(box_id = id.index(), min, max, availcont, pref, "shrink-to-fit");
            cx.tree[id].set_content_width(pref);
            update_child_sizes(cx.tree, id);
        }
        layout_contents(cx, id);

        if let BoxKind::InlineBlock = cx.tree[id].kind {
            let baseline = intrinsic::last_inline_baseline(cx.tree, id);
            let b = &mut cx.tree[id];
            b.block.baseline = match baseline {
                // overflowing content cannot push the baseline below the box
                Some(base) => (base + b.content_offset_y()).min(b.height()),
                None => b.height(),
            };
            if !force && b.width() > avail_width {
                return LayoutOutcome::failed();
            }
        }
        LayoutOutcome::fit()
    }
}

/// Lay out the children of a block whose content width is already final.
pub(crate) fn layout_contents(cx: &mut LayoutCx<'_>, id: BoxId) {
    {
        let b = &mut cx.tree[id];
        b.flags.width_computed = true;
        b.avail_width = b.total_width();
    }
    if cx.tree[id].block.float_left.is_none() {
        set_own_floats(cx.tree, id);
    }
    if cx.tree[id].block.contains_blocks {
        layout_blocks(cx, id);
    } else {
        layout_inline(cx, id);
    }
}

/// Remove the continuation boxes a previous layout inserted.
pub fn clear_splitted(tree: &mut BoxTree, id: BoxId) {
    let kept: Vec<BoxId> = tree[id]
        .children
        .iter()
        .copied()
        .filter(|&c| !tree[c].splitted)
        .collect();
    let b = &mut tree[id];
    let removed = b.children.len() - kept.len();
    if removed > 0 {
        b.children = kept;
        b.end_child = b.end_child.saturating_sub(removed).min(b.children.len());
        b.end_limit = b.end_child;
    }
}

fn insert_sub_box(tree: &mut BoxTree, parent: BoxId, index: usize, child: BoxId) {
    tree[child].parent = Some(parent);
    let p = &mut tree[parent];
    p.children.insert(index, child);
    p.end_child += 1;
    p.end_limit = p.end_child;
}

pub fn set_floats(
    tree: &mut BoxTree,
    id: BoxId,
    left: FloatListId,
    right: FloatListId,
    xl: f32,
    xr: f32,
    y: f32,
) {
    let s = &mut tree[id].block;
    s.float_left = Some(left);
    s.float_right = Some(right);
    s.float_xl = xl;
    s.float_xr = xr;
    s.float_y = y;
}

/// Give `id` a new pair of float lists (a new block formatting context).
pub fn set_own_floats(tree: &mut BoxTree, id: BoxId) {
    let left = tree.new_float_list(id);
    let right = tree.new_float_list(id);
    set_floats(tree, id, left, right, 0.0, 0.0, 0.0);
}

/// Float state of a block, read once per layout.
#[derive(Debug, Clone, Copy)]
struct Floats {
    left: FloatListId,
    right: FloatListId,
    xl: f32,
    xr: f32,
    y: f32,
}

impl Floats {
    fn of(tree: &mut BoxTree, id: BoxId) -> Self {
        let s = &tree[id].block;
        match (s.float_left, s.float_right) {
            (Some(left), Some(right)) => Self {
                left,
                right,
                xl: s.float_xl,
                xr: s.float_xr,
                y: s.float_y,
            },
            _ => {
                set_own_floats(tree, id);
                Self::of(tree, id)
            }
        }
    }

    /// Left inset of the content at `y` (content coordinates).
    fn left_at(&self, tree: &BoxTree, y: f32) -> f32 {
        (tree.float_list(self.left).width_at(y + self.y) - self.xl).max(0.0)
    }

    fn right_at(&self, tree: &BoxTree, y: f32) -> f32 {
        (tree.float_list(self.right).width_at(y + self.y) - self.xr).max(0.0)
    }

    /// Next Y (list coordinates) where either side may widen.
    fn next_y(&self, tree: &BoxTree, fy: f32) -> Option<f32> {
        FloatList::next_y_of(tree.float_list(self.left), tree.float_list(self.right), fy)
    }
}

fn apply_clearance(tree: &BoxTree, floats: &Floats, child: BoxId, stat: &mut BlockStatus) -> bool {
    let (left, right) = (tree.float_list(floats.left), tree.float_list(floats.right));
    let ny = match tree[child].clear {
        Clear::None => return false,
        Clear::Left => left.max_y() - floats.y,
        Clear::Right => right.max_y() - floats.y,
        Clear::Both => left.max_y().max(right.max_y()) - floats.y,
    };
    if stat.y < ny {
        stat.y = ny;
        true
    } else {
        false
    }
}

fn layout_inline(cx: &mut LayoutCx<'_>, id: BoxId) {
    let floats = Floats::of(cx.tree, id);
    let threshold = cx.config.inflow_space_threshold;
    let (wlimit, line_height, wrapping, indent, ctx) = {
        let b = &cx.tree[id];
        (
            b.available_content_width(),
            b.line_height,
            b.allows_wrapping(),
            b.block.indent,
            b.ctx.clone(),
        )
    };
    let new_line =
        |start: usize, y: f32| LineBox::new(LineContext::new(&ctx, line_height), start, y);

    let mut x1 = floats.left_at(cx.tree, 0.0);
    let mut x2 = floats.right_at(cx.tree, 0.0);
    let minx1 = (-floats.xl).max(0.0);
    let minx2 = (-floats.xr).max(0.0);
    let mut x = x1 + indent;
    let mut y = 0.0f32;
    let mut lnstr = 0usize;
    let mut lastbreak = 0usize;
    let mut lines: Vec<LineBox> = Vec::new();
    let mut curline = cx.tree[id].block.first_line.clone().unwrap_or_else(|| new_line(0, 0.0));

    let mut i = 0;
    while i < cx.tree[id].children.len() {
        let child = cx.tree[id].children[i];
        if cx.tree[child].is_block {
            // only floating or positioned blocks appear among inline content
            let mut stat = BlockStatus {
                inline_width: x - x1,
                y,
                ..BlockStatus::default()
            };
            let at_start = x <= x1;
            apply_clearance(cx.tree, &floats, child, &mut stat);
            if cx.tree[child].is_floating() {
                layout_floating(cx, id, &floats, child, wlimit, &mut stat);
                let fw = cx.tree[child].width();
                if cx.tree[child].float == Float::Left
                    && stat.inline_width > 0.0
                    && curline.start() < i
                {
                    for j in curline.start()..i {
                        let prev = cx.tree[id].children[j];
                        if !cx.tree[prev].is_block {
                            cx.tree[prev].move_right(fw);
                        }
                    }
                    x += fw;
                }
            } else {
                layout_positioned(cx, id, child);
                cx.tree[child].block.static_position = Some((x, y));
            }
            x1 = floats.left_at(cx.tree, y);
            x2 = floats.right_at(cx.tree, y);
            if at_start && x < x1 {
                x = x1;
            }
            i += 1;
            continue;
        }

        if intrinsic::can_split_before(cx.tree, child) {
            lastbreak = i;
        }
        let ignore_ws = i > 0 && {
            let prev = cx.tree[id].children[i - 1];
            !cx.tree[prev].is_block
                && cx.tree[prev].collapses_spaces()
                && intrinsic::ends_with_whitespace(cx.tree, prev)
        };
        crate::inline::set_ignore_initial_whitespace(cx.tree, child, ignore_ws);

        loop {
            let space = wlimit - x1 - x2;
            let narrowed = x1 > minx1 || x2 > minx2;
            let force = (x == x1 || lastbreak == lnstr || !wrapping) && !narrowed;
            let mut outcome = LayoutOutcome::failed();
            if space >= threshold || !narrowed {
                outcome = layout_box(cx, child, wlimit - x - x2, force, x == x1);
            }
            let fit = outcome.fits;
            if fit {
                if cx.tree[child].is_in_flow() {
                    let c = &mut cx.tree[child];
                    c.set_position(x, 0.0);
                    x += c.width();
                }
                curline.consider_box(&inline_metrics(cx.tree, child));
            }
            let over = x > wlimit - x2;
            let linebreak = cx.tree[child].inline.finished_by_line_break;
            let mut again = false;
            if !fit && narrowed && (x == x1 || lastbreak == lnstr) {
                // no room beside the floats: retry on a lower line
                if lnstr < i {
                    lnstr = i;
                    curline.set_end(lnstr);
                    lines.push(std::mem::replace(&mut curline, new_line(lnstr, y)));
                }
                y += line_height;
                curline.set_y(y);
                x1 = floats.left_at(cx.tree, y);
                x2 = floats.right_at(cx.tree, y);
                x = x1;
                again = line_height > 0.0;
            } else if (!fit && lastbreak > lnstr)
                || (fit && (over || linebreak || outcome.rest.is_some()))
            {
                curline.set_width(x - x1);
                curline.set_limits(x1, x2);
                y += curline.max_box_height();
                x1 = floats.left_at(cx.tree, y);
                x2 = floats.right_at(cx.tree, y);
                x = x1;
                if !fit {
                    lnstr = i;
                    again = true;
                } else {
                    if let Some(rest) = outcome.rest {
                        insert_sub_box(cx.tree, id, i + 1, rest);
                    }
                    lnstr = i + 1;
                }
                curline.set_end(lnstr);
                lines.push(std::mem::replace(&mut curline, new_line(lnstr, y)));
                trace!(box_id = id.index(), line = lines.len(), y, "line finished");
            }
            if !again {
                break;
            }
        }
        if intrinsic::can_split_after(cx.tree, child) {
            lastbreak = i + 1;
        }
        i += 1;
    }

    if !cx.tree[id].has_fixed_height() {
        y += curline.max_box_height();
        if cx.tree[id].encloses_floats() {
            let mfy = float_height(cx.tree, id) - floats.y;
            y = y.max(mfy);
        }
        cx.tree[id].set_content_height(y);
        update_sizes(cx.tree, id);
        update_child_sizes(cx.tree, id);
    }
    {
        let b = &mut cx.tree[id];
        let (w, h) = (b.total_width(), b.total_height());
        b.set_size(w, h);
    }
    curline.set_width(x - x1);
    curline.set_limits(x1, x2);
    curline.set_end(cx.tree[id].children.len());
    lines.push(curline);

    let count = lines.len();
    for (n, line) in lines.iter().enumerate() {
        align_line_horizontally(cx.tree, id, line, n + 1 == count);
        align_line_vertically(cx.tree, id, line);
    }
    debug!(
        box_id = id.index(),
        lines = count,
        height = cx.tree[id].content.height,
        "inline content laid out"
    );
}

fn line_children(tree: &BoxTree, id: BoxId, line: &LineBox) -> SmallVec<[BoxId; 8]> {
    let children = &tree[id].children;
    let end = line.end().min(children.len());
    let start = line.start().min(end);
    children[start..end].iter().copied().collect()
}

fn align_line_horizontally(tree: &mut BoxTree, id: BoxId, line: &LineBox, is_last: bool) {
    let b = &tree[id];
    let dif = b.content.width - line.limits() - line.width();
    if dif <= 0.0 {
        return;
    }
    let align = b.style.text_align;
    let children = line_children(tree, id, line);
    match align {
        TextAlign::Left => {}
        TextAlign::Justify => {
            if !is_last {
                justify_line(tree, &children, dif);
            }
        }
        TextAlign::Right | TextAlign::Center => {
            let shift = if align == TextAlign::Right { dif } else { dif / 2.0 };
            for child in children {
                if !tree[child].is_block {
                    tree[child].move_right(shift);
                }
            }
        }
    }
}

/// Spaces inside the inline content of `id`.
fn count_spaces(tree: &BoxTree, id: BoxId) -> usize {
    match &tree[id].kind {
        BoxKind::Text(data) => data.current().matches(' ').count(),
        BoxKind::Inline => tree[id].sub_boxes().iter().map(|&c| count_spaces(tree, c)).sum(),
        _ => 0,
    }
}

fn trailing_spaces(tree: &BoxTree, id: BoxId) -> usize {
    match &tree[id].kind {
        BoxKind::Text(data) => data.current().len() - data.current().trim_end_matches(' ').len(),
        BoxKind::Inline => tree[id].sub_boxes().last().map_or(0, |&c| trailing_spaces(tree, c)),
        _ => 0,
    }
}

fn justify_line(tree: &mut BoxTree, children: &[BoxId], dif: f32) {
    let inline: SmallVec<[BoxId; 8]> =
        children.iter().copied().filter(|&c| !tree[c].is_block).collect();
    let total: usize = inline.iter().map(|&c| count_spaces(tree, c)).sum();
    let trailing = inline.last().map_or(0, |&c| trailing_spaces(tree, c));
    let mut budget = total.saturating_sub(trailing);
    if budget == 0 {
        return;
    }
    let per_space = dif / budget as f32;
    let mut shift = 0.0;
    for child in inline {
        tree[child].move_right(shift);
        shift += widen_spaces(tree, child, per_space, &mut budget);
    }
}

/// Widen the spaces of `id` by `per_space`; returns the width added.
fn widen_spaces(tree: &mut BoxTree, id: BoxId, per_space: f32, budget: &mut usize) -> f32 {
    let added = match &mut tree[id].kind {
        BoxKind::Text(data) => {
            let n = data.current().matches(' ').count().min(*budget);
            *budget -= n;
            data.word_spacing = per_space;
            n as f32 * per_space
        }
        BoxKind::Inline => {
            let children = tree[id].sub_boxes().to_vec();
            let mut shift = 0.0;
            for child in children {
                tree[child].move_right(shift);
                shift += widen_spaces(tree, child, per_space, budget);
            }
            shift
        }
        _ => 0.0,
    };
    let b = &mut tree[id];
    b.content.width += added;
    b.bounds.width += added;
    added
}

fn align_line_vertically(tree: &mut BoxTree, id: BoxId, line: &LineBox) {
    for child in line_children(tree, id, line) {
        if tree[child].is_block {
            continue;
        }
        let metrics = inline_metrics(tree, child);
        let mut dif = line.align_box(&metrics);
        if let BoxKind::Inline = tree[child].kind {
            dif -= tree[child].content_offset_y();
        }
        let c = &mut tree[child];
        if c.is_element() {
            c.inline.slot = Some(LineSlot {
                owner: id,
                y: line.y(),
                height: line.max_box_height(),
            });
        }
        let y = line.y() + line.top_offset() + line.lead() / 2.0 + dif;
        c.move_down(y);
    }
}

fn layout_blocks(cx: &mut LayoutCx<'_>, id: BoxId) {
    let floats = Floats::of(cx.tree, id);
    let wlimit = cx.tree[id].available_content_width();
    let sep_top = separated_from_top(&cx.tree[id]);
    let mut stat = BlockStatus::default();
    let mut mtop = 0.0f32;
    let mut mbottom = 0.0f32;

    let mut i = 0;
    while i < cx.tree[id].children.len() {
        let child = cx.tree[id].children[i];
        let mut nexty = stat.y;
        if cx.tree[child].displayed {
            let clearance = apply_clearance(cx.tree, &floats, child, &mut stat);
            if cx.tree[child].is_in_flow() {
                let empty = margins_adjoin(cx.tree, child);
                let mut border_y = stat.y;
                if let Some(last) = stat.last_in_flow {
                    // the margin was added by the previous placement
                    border_y -= cx.tree[last].emargin.bottom;
                }
                let (ctop, cbottom) = (cx.tree[child].emargin.top, cx.tree[child].emargin.bottom);
                mtop = mtop.max(ctop);
                if stat.first_separated.is_none() && sep_top {
                    border_y += mtop;
                }
                if stat.first_separated.is_some() {
                    border_y += if clearance {
                        mtop + mbottom
                    } else {
                        collapsed_margin_height(mtop, mbottom)
                    };
                }
                stat.last_in_flow = Some(child);
                if !empty {
                    stat.first_separated.get_or_insert(child);
                    stat.last_separated = Some(child);
                    mtop = 0.0;
                    mbottom = cbottom;
                }
                if stat.last_separated.is_some() {
                    mbottom = mbottom.max(cbottom);
                }
                if ctop > 0.0 {
                    stat.y = border_y - ctop;
                }
                let rest = if cx.tree[child].may_overlap_floats() {
                    layout_in_flow(cx, id, &floats, child, wlimit, &mut stat)
                } else {
                    layout_avoiding_floats(cx, id, &floats, child, wlimit, &mut stat)
                };
                if let Some(rest) = rest {
                    insert_sub_box(cx.tree, id, i + 1, rest);
                }
                nexty = stat.y;
            } else if cx.tree[child].is_floating() {
                layout_floating(cx, id, &floats, child, wlimit, &mut stat);
            } else {
                layout_positioned(cx, id, child);
                cx.tree[child].block.static_position = Some((0.0, stat.y));
            }
            stat.y = nexty;
        }
        i += 1;
    }

    if !separated_from_bottom(&cx.tree[id]) {
        stat.y -= mbottom;
    }
    if !cx.tree[id].has_fixed_height() {
        if cx.tree[id].encloses_floats() {
            let mfy = float_height(cx.tree, id) - floats.y;
            stat.y = stat.y.max(mfy);
        }
        cx.tree[id].set_content_height(stat.y);
        update_sizes(cx.tree, id);
        update_child_sizes(cx.tree, id);
    }
    let b = &mut cx.tree[id];
    let (w, h) = (b.total_width(), b.total_height());
    b.set_size(w, h);
    debug!(box_id = id.index(), width = w, height = h, "block content laid out");
}

fn layout_in_flow(
    cx: &mut LayoutCx<'_>,
    _id: BoxId,
    floats: &Floats,
    child: BoxId,
    wlimit: f32,
    stat: &mut BlockStatus,
) -> Option<BoxId> {
    let (mut xl, mut xr, mut fy) = {
        let c = &cx.tree[child];
        (
            floats.xl + c.margin.left + c.border.left + c.padding.left,
            floats.xr + c.margin.right + c.border.right + c.padding.right,
            floats.y + c.emargin.top + c.border.top + c.padding.top,
        )
    };
    if cx.tree[child].is_relative() {
        let (dx, dy) = cx.tree[child].relative_offset();
        xl += dx;
        xr -= dx;
        fy += dy;
    }
    // floats stay inside the parent
    let (xl, xr) = (xl.max(0.0), xr.max(0.0));
    set_floats(cx.tree, child, floats.left, floats.right, xl, xr, stat.y + fy);
    cx.tree[child].set_position(0.0, stat.y);
    let outcome = layout_box(cx, child, wlimit, true, true);
    let c = &cx.tree[child];
    stat.y += c.height();
    stat.maxw = stat.maxw.max(c.width());
    outcome.rest
}

fn layout_avoiding_floats(
    cx: &mut LayoutCx<'_>,
    id: BoxId,
    floats: &Floats,
    child: BoxId,
    wlimit: f32,
    stat: &mut BlockStatus,
) -> Option<BoxId> {
    let minw = intrinsic::minimal_decoration_width(cx.tree, child);
    let line_height = cx.tree[id].line_height;
    let side = |tree: &BoxTree, list: FloatListId, fy: f32, off: f32| {
        (tree.float_list(list).width_at(fy) - off).max(0.0)
    };
    let mut yoffset = Some(stat.y + floats.y);
    let mut outcome = LayoutOutcome::fit();
    while let Some(start) = yoffset {
        let mut fy = start;
        let mut flx = side(cx.tree, floats.left, fy, floats.xl);
        let mut frx = side(cx.tree, floats.right, fy, floats.xr);
        let mut avail = wlimit - flx - frx;
        while (flx > floats.xl || frx > floats.xr) && minw > avail {
            let next = match floats.next_y(cx.tree, fy) {
                Some(ny) => ny,
                None => fy + stat.maxh.max(line_height),
            };
            if next <= fy {
                break;
            }
            fy = next;
            flx = side(cx.tree, floats.left, fy, floats.xl);
            frx = side(cx.tree, floats.right, fy, floats.xr);
            avail = wlimit - flx - frx;
        }
        let margin_top = cx.tree[child].margin.top;
        if fy > start && margin_top != 0.0 {
            fy = (fy - margin_top).max(start);
        }
        stat.y = fy - floats.y;
        set_own_floats(cx.tree, child);
        {
            let c = &mut cx.tree[child];
            c.set_position(flx, stat.y);
            c.set_width_adjust(-flx - frx);
        }
        outcome = layout_box(cx, child, avail, true, true);
        let height = cx.tree[child].bounds.height;
        let (l, r) = compute_float_limits(cx.tree, floats, fy, fy + height, (flx, frx));
        let availw = wlimit - l - r;
        yoffset = if minw > availw { floats.next_y(cx.tree, fy) } else { None };
    }
    let c = &cx.tree[child];
    stat.y += c.height();
    stat.maxw = stat.maxw.max(c.width());
    outcome.rest
}

/// Horizontal offset of a new float: the floats already at this side, or
/// the content edge when there are none.
fn float_offset(width: f32, edge: f32) -> f32 {
    if width == 0.0 {
        edge
    } else {
        width.max(edge)
    }
}

fn layout_floating(
    cx: &mut LayoutCx<'_>,
    id: BoxId,
    floats: &Floats,
    child: BoxId,
    wlimit: f32,
    stat: &mut BlockStatus,
) {
    set_own_floats(cx.tree, child);
    layout_box(cx, child, wlimit, true, true);
    let left = cx.tree[child].float == Float::Left;
    let (own, opposite) = if left {
        (floats.left, floats.right)
    } else {
        (floats.right, floats.left)
    };
    let (float_x, ofloat_x) = if left { (floats.xl, floats.xr) } else { (floats.xr, floats.xl) };
    let line_height = cx.tree[id].line_height;
    let width = cx.tree[child].width();

    let mut fy = (stat.y + floats.y).max(cx.tree.float_list(own).last_y());
    let mut fx = float_offset(cx.tree.float_list(own).width_at(fy), float_x);
    let mut ofx = float_offset(cx.tree.float_list(opposite).width_at(fy), ofloat_x);
    while (fx > float_x || ofx > ofloat_x || stat.inline_width > 0.0)
        && stat.inline_width + fx - float_x + ofx - ofloat_x + width > wlimit
    {
        let next = match floats.next_y(cx.tree, fy) {
            Some(ny) => ny,
            None => fy + stat.maxh.max(line_height),
        };
        if next <= fy {
            break;
        }
        fy = next;
        fx = float_offset(cx.tree.float_list(own).width_at(fy), float_x);
        ofx = float_offset(cx.tree.float_list(opposite).width_at(fy), ofloat_x);
        stat.inline_width = 0.0;
    }

    cx.tree[child].set_position(fx, fy);
    let entry = {
        let c = &cx.tree[child];
        FloatEntry {
            id: child,
            bounds: c.bounds,
            containing_block: c.containing_block,
            visible: c.visible,
        }
    };
    cx.tree.float_list_mut(own).add(entry);
    cx.tree[child].block.float_owner = Some(own);
    trace!(box_id = child.index(), left, x = fx, y = fy, width, "float placed");

    let height = cx.tree[child].height();
    let floatw = max_float_width(cx.tree, floats, fy, fy + height);
    stat.maxw = stat.maxw.max(floatw).min(wlimit);
}

fn layout_positioned(cx: &mut LayoutCx<'_>, id: BoxId, child: BoxId) {
    let mut wlimit = cx.tree[id].avail_width;
    {
        let c = &cx.tree[child];
        if c.flags.left_set {
            wlimit -= c.coords.left;
        }
        if c.flags.right_set {
            wlimit -= c.coords.right;
        }
    }
    set_own_floats(cx.tree, child);
    layout_box(cx, child, wlimit, true, true);
}

/// Bottom of the floats owned by `id` and its in-flow descendants sharing
/// its float lists, in float list coordinates.
pub fn float_height(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    let (Some(left), Some(right)) = (b.block.float_left, b.block.float_right) else {
        return 0.0;
    };
    let mut mfy = tree
        .float_list(left)
        .max_y_for_owner(id, true)
        .max(tree.float_list(right).max_y_for_owner(id, true));
    if b.block.contains_blocks {
        for &child in b.sub_boxes() {
            let c = &tree[child];
            if c.is_block && !c.is_positioned() && c.block.float_left == Some(left) {
                mfy = mfy.max(float_height(tree, child));
            }
        }
    }
    mfy
}

fn max_float_width(tree: &BoxTree, floats: &Floats, y1: f32, y2: f32) -> f32 {
    let mut ret = 0.0f32;
    let mut fy = y1;
    while fy < y2 {
        let w = tree.float_list(floats.left).width_at(fy)
            + tree.float_list(floats.right).width_at(fy);
        ret = ret.max(w);
        match floats.next_y(tree, fy) {
            Some(ny) if ny > fy => fy = ny,
            _ => break,
        }
    }
    ret
}

/// Widest float insets between `y1` and `y2`, starting from `fx`.
fn compute_float_limits(
    tree: &BoxTree,
    floats: &Floats,
    y1: f32,
    y2: f32,
    fx: (f32, f32),
) -> (f32, f32) {
    let (mut l, mut r) = fx;
    let mut fy = y1;
    while fy < y2 {
        match floats.next_y(tree, fy) {
            Some(ny) if ny > fy => fy = ny,
            _ => break,
        }
        if fy < y2 {
            let flx = (tree.float_list(floats.left).width_at(fy) - floats.xl).max(0.0);
            let frx = (tree.float_list(floats.right).width_at(fy) - floats.xr).max(0.0);
            l = l.max(flx);
            r = r.max(frx);
        }
    }
    (l, r)
}

/// Let the first line of `id` (or of its first in-flow block descendant)
/// start with the strut of `from`.
pub fn init_first_line(tree: &mut BoxTree, id: BoxId, from: BoxId) {
    let (ctx, line_height) = (tree[from].ctx.clone(), tree[from].line_height);
    {
        let b = &mut tree[id];
        let lc = LineContext::new(&b.ctx, b.line_height);
        b.block
            .first_line
            .get_or_insert_with(|| LineBox::new(lc, 0, 0.0))
            .consider_box_properties(&ctx, line_height);
    }
    let first = tree[id].sub_boxes().iter().copied().find(|&c| tree[c].is_in_flow());
    if let Some(child) = first {
        if tree[child].is_block && tree[child].kind.is_block_container() {
            init_first_line(tree, child, from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::StyledNode;

    #[test]
    fn test_float_offset_without_floats_uses_edge() {
        assert_eq!(float_offset(0.0, 12.0), 12.0);
        assert_eq!(float_offset(0.0, -5.0), -5.0);
        assert_eq!(float_offset(40.0, 12.0), 40.0);
        assert_eq!(float_offset(5.0, 12.0), 12.0);
    }

    #[test]
    fn test_block_status_starts_at_top() {
        let stat = BlockStatus::default();
        assert_eq!(stat.y, 0.0);
        assert!(stat.first_separated.is_none());
    }

    fn style(css: &str) -> boxkit_css::ComputedStyle {
        let mut s = boxkit_css::ComputedStyle::new();
        s.apply_declarations("font-size: 10px; line-height: 20px").expect("font");
        s.apply_declarations(css).expect("valid declarations");
        s
    }

    fn inline_block_tree(css: &str) -> (crate::LayoutEngine, BoxTree, BoxId) {
        let engine = crate::LayoutEngine::new(crate::LayoutConfig::with_viewport(400.0, 300.0));
        let doc = StyledNode::element("p", style("display: block; margin: 0")).with_child(
            StyledNode::element("span", style(css)).with_child(StyledNode::text("abc")),
        );
        let tree = engine.layout(&doc).expect("layout");
        let id = tree
            .ids()
            .find(|&id| matches!(tree[id].kind, BoxKind::InlineBlock))
            .expect("inline-block box");
        (engine, tree, id)
    }

    #[test]
    fn test_inline_block_does_not_fit_unless_forced() {
        let (engine, mut tree, id) =
            inline_block_tree("display: inline-block; width: 60px; height: 20px");
        let config = engine.config().clone();
        let mut cx = LayoutCx::new(&mut tree, &config);
        assert!(!BlockLayout.layout(&mut cx, id, 30.0, false, false).fits);
        assert!(BlockLayout.layout(&mut cx, id, 30.0, true, false).fits);
        assert!(BlockLayout.layout(&mut cx, id, 100.0, false, false).fits);
    }

    #[test]
    fn test_inline_block_baseline_stays_inside_box() {
        let (_, tree, id) = inline_block_tree("display: inline-block; width: 60px; height: 2px");
        let b = &tree[id];
        assert_eq!(b.height(), 2.0);
        assert_eq!(b.block.baseline, b.height());

        let (_, tree, id) = inline_block_tree("display: inline-block; width: 60px");
        let b = &tree[id];
        assert!(b.block.baseline > 0.0);
        assert!(b.block.baseline <= b.height());
    }
}

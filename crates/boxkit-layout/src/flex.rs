//! Flexbox layout.
//!
//! The algorithm follows the CSS Flexible Box Layout Module in these steps:
//! 1. Sort the items by `order`
//! 2. Compute the hypothetical main size of every item
//! 3. Collect the items into lines
//! 4. Resolve flexible lengths (grow/shrink) per line
//! 5. Lay out the items at their final main size
//! 6. Determine the line cross sizes and distribute them (align-content)
//! 7. Align items in their line (align-items, align-self)
//! 8. Distribute the main axis free space (justify-content)
//!
//! Everything that depends on the axis goes through the [`FlexLine`] trait,
//! implemented by [`FlexLineRow`] and [`FlexLineColumn`].

use boxkit_css::{
    AlignContent, AlignItems, AlignSelf, ComputedStyle, FlexBasis, FlexDirection, FlexWrap,
    JustifyContent, Length,
};
use tracing::{debug, trace};

use crate::block::set_own_floats;
use crate::intrinsic;
use crate::manager::{layout_box, LayoutCx, LayoutManager, LayoutOutcome};
use crate::sizing::update_child_sizes;
use crate::tree::{BoxId, BoxKind, BoxTree, LayoutBox};
use crate::{Rect, Size};

/// Flex container state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexData {
    pub direction: FlexDirection,
    pub wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,
    /// Main size used by the last layout.
    pub main_size: f32,
    /// Cross size used by the last layout.
    pub cross_size: f32,
    /// The main size is not known in advance and grows with the content
    /// (a column container with an auto height).
    pub main_by_content: bool,
    /// Items of every line of the last layout, in line order.
    pub lines: Vec<Vec<BoxId>>,
}

impl FlexData {
    pub fn new(style: &ComputedStyle) -> Self {
        Self {
            direction: style.flex_direction,
            wrap: style.flex_wrap,
            justify_content: style.justify_content,
            align_items: style.align_items,
            align_content: style.align_content,
            ..Self::default()
        }
    }

    pub fn is_row(&self) -> bool {
        self.direction.is_row()
    }

    pub fn is_wrapping(&self) -> bool {
        self.wrap != FlexWrap::NoWrap
    }

    pub fn is_wrap_reverse(&self) -> bool {
        self.wrap == FlexWrap::WrapReverse
    }
}

/// Flex item state kept on the item box.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexItem {
    pub order: i32,
    pub grow: f32,
    pub shrink: f32,
    pub basis: FlexBasis,
    pub align_self: AlignSelf,
    /// Flex base size.
    pub base_size: f32,
    /// Base size clamped by min/max.
    pub hypothetical: f32,
    /// Final main size.
    pub target: f32,
    pub frozen: bool,
    /// Lower bound used while shrinking.
    pub min_main: f32,
    pub max_main: Option<f32>,
}

impl FlexItem {
    pub fn new(style: &ComputedStyle) -> Self {
        Self {
            order: style.order,
            grow: style.flex_grow,
            shrink: style.flex_shrink,
            basis: style.flex_basis,
            align_self: style.align_self,
            base_size: 0.0,
            hypothetical: 0.0,
            target: 0.0,
            frozen: false,
            min_main: 0.0,
            max_main: None,
        }
    }
}

/// Items of one line and the line's place on the cross axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineState {
    pub items: Vec<BoxId>,
    pub cross_size: f32,
    pub cross_position: f32,
    /// Main size not used by the items registered so far.
    pub remaining: f32,
}

/// A flex line; implemented once per main axis.
pub trait FlexLine {
    fn new(main_size: f32) -> Self
    where
        Self: Sized;

    fn state(&self) -> &LineState;

    fn state_mut(&mut self) -> &mut LineState;

    /// Outer size of `b` along the main axis.
    fn outer_main(&self, b: &LayoutBox) -> f32;

    /// Outer size of `b` along the cross axis.
    fn outer_cross(&self, b: &LayoutBox) -> f32;

    fn set_main_position(&self, b: &mut LayoutBox, pos: f32);

    fn set_cross_position(&self, b: &mut LayoutBox, pos: f32);

    /// The cross size of `b` is `auto` and may be stretched.
    fn cross_auto(&self, b: &LayoutBox) -> bool;

    /// Resize `b` so that its outer cross size is `outer`.
    fn set_outer_cross(&self, b: &mut LayoutBox, outer: f32);

    /// Distance from the cross-start margin edge to the first baseline, when
    /// baselines can be compared along the cross axis.
    fn baseline(&self, tree: &BoxTree, id: BoxId) -> Option<f32>;

    /// Try to add an item. The first item is always accepted; others only
    /// if they fit, unless the container does not wrap or grows with its
    /// content.
    fn register_item(
        &mut self,
        b: &LayoutBox,
        id: BoxId,
        wrapping: bool,
        main_by_content: bool,
    ) -> bool {
        let size = self.outer_main(b);
        let state = self.state_mut();
        if !state.items.is_empty() && wrapping && !main_by_content && size > state.remaining {
            return false;
        }
        state.remaining = (state.remaining - size).max(0.0);
        state.items.push(id);
        true
    }

    /// Sum of the outer main sizes of the items.
    fn main_extent(&self, tree: &BoxTree) -> f32 {
        self.state().items.iter().map(|&i| self.outer_main(&tree[i])).sum()
    }

    /// Cross size of the line: the container's for a definite single line,
    /// the largest item otherwise.
    fn set_line_cross_size(&mut self, tree: &BoxTree, single_line_cross: Option<f32>) {
        let size = match single_line_cross {
            Some(cross) => cross,
            None => self
                .state()
                .items
                .iter()
                .map(|&i| self.outer_cross(&tree[i]))
                .fold(0.0, f32::max),
        };
        self.state_mut().cross_size = size;
    }

    /// Position the items inside the line on the cross axis.
    fn align_items(&self, tree: &mut BoxTree, data: &FlexData) {
        let state = self.state();
        let (top, size) = (state.cross_position, state.cross_size);
        let mut modes = Vec::with_capacity(state.items.len());
        let mut max_baseline = 0.0f32;
        for &id in &state.items {
            let b = &tree[id];
            let align_self = b.flex_item.as_ref().map_or(AlignSelf::Auto, |f| f.align_self);
            let mut mode = align_self.resolve(data.align_items);
            if data.is_wrap_reverse() {
                mode = match mode {
                    AlignItems::FlexStart => AlignItems::FlexEnd,
                    AlignItems::FlexEnd => AlignItems::FlexStart,
                    other => other,
                };
            }
            let baseline = match mode {
                AlignItems::Baseline => self.baseline(tree, id),
                _ => None,
            };
            if let Some(base) = baseline {
                max_baseline = max_baseline.max(base);
            }
            modes.push((mode, baseline));
        }

        for (&id, (mode, baseline)) in state.items.iter().zip(modes) {
            if mode == AlignItems::Stretch && self.cross_auto(&tree[id]) {
                self.set_outer_cross(&mut tree[id], size);
            }
            let outer = self.outer_cross(&tree[id]);
            let offset = match (mode, baseline) {
                (AlignItems::FlexEnd, _) => size - outer,
                (AlignItems::Center, _) => (size - outer) / 2.0,
                (AlignItems::Baseline, Some(base)) => max_baseline - base,
                _ => 0.0,
            };
            self.set_cross_position(&mut tree[id], top + offset);
        }
    }

    /// Position the items along the main axis.
    fn justify_content(&self, tree: &mut BoxTree, data: &FlexData, main_size: f32) {
        let items = &self.state().items;
        if items.is_empty() {
            return;
        }
        let n = items.len() as f32;
        let free = (main_size - self.main_extent(tree)).max(0.0);
        let (start, spacing) = match data.justify_content {
            JustifyContent::FlexStart => (0.0, 0.0),
            JustifyContent::FlexEnd => (free, 0.0),
            JustifyContent::Center => (free / 2.0, 0.0),
            JustifyContent::SpaceBetween if items.len() > 1 => (0.0, free / (n - 1.0)),
            JustifyContent::SpaceBetween => (0.0, 0.0),
            JustifyContent::SpaceAround => (free / n / 2.0, free / n),
        };
        let reversed = data.direction.is_reverse();
        let mut pos = start;
        for &id in items {
            let outer = self.outer_main(&tree[id]);
            let at = if reversed { main_size - pos - outer } else { pos };
            self.set_main_position(&mut tree[id], at);
            pos += outer + spacing;
        }
    }
}

/// A line of a row container.
#[derive(Debug, Clone, Default)]
pub struct FlexLineRow {
    state: LineState,
}

impl FlexLine for FlexLineRow {
    fn new(main_size: f32) -> Self {
        Self {
            state: LineState {
                remaining: main_size,
                ..LineState::default()
            },
        }
    }

    fn state(&self) -> &LineState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LineState {
        &mut self.state
    }

    fn outer_main(&self, b: &LayoutBox) -> f32 {
        b.emargin.horizontal() + b.border.horizontal() + b.padding.horizontal() + b.content.width
    }

    fn outer_cross(&self, b: &LayoutBox) -> f32 {
        b.emargin.vertical() + b.border.vertical() + b.padding.vertical() + b.content.height
    }

    fn set_main_position(&self, b: &mut LayoutBox, pos: f32) {
        b.bounds.x = pos;
    }

    fn set_cross_position(&self, b: &mut LayoutBox, pos: f32) {
        b.bounds.y = pos;
    }

    fn cross_auto(&self, b: &LayoutBox) -> bool {
        b.style.height.is_auto() && !b.kind.is_replaced()
    }

    fn set_outer_cross(&self, b: &mut LayoutBox, outer: f32) {
        let inner = outer - b.emargin.vertical() - b.border.vertical() - b.padding.vertical();
        b.set_content_height(inner.max(0.0));
        b.flags.hset = true;
        b.bounds.height = self.outer_cross(b);
    }

    fn baseline(&self, tree: &BoxTree, id: BoxId) -> Option<f32> {
        let b = &tree[id];
        let inner = intrinsic::first_inline_baseline(tree, id)
            .unwrap_or_else(|| b.ctx.baseline_offset());
        Some(b.content_offset_y() + inner)
    }
}

/// A line of a column container.
#[derive(Debug, Clone, Default)]
pub struct FlexLineColumn {
    state: LineState,
}

impl FlexLine for FlexLineColumn {
    fn new(main_size: f32) -> Self {
        Self {
            state: LineState {
                remaining: main_size,
                ..LineState::default()
            },
        }
    }

    fn state(&self) -> &LineState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LineState {
        &mut self.state
    }

    fn outer_main(&self, b: &LayoutBox) -> f32 {
        b.emargin.vertical() + b.border.vertical() + b.padding.vertical() + b.content.height
    }

    fn outer_cross(&self, b: &LayoutBox) -> f32 {
        b.emargin.horizontal() + b.border.horizontal() + b.padding.horizontal() + b.content.width
    }

    fn set_main_position(&self, b: &mut LayoutBox, pos: f32) {
        b.bounds.y = pos;
    }

    fn set_cross_position(&self, b: &mut LayoutBox, pos: f32) {
        b.bounds.x = pos;
    }

    fn cross_auto(&self, b: &LayoutBox) -> bool {
        b.style.width.is_auto() && !b.kind.is_replaced()
    }

    fn set_outer_cross(&self, b: &mut LayoutBox, outer: f32) {
        let inner = outer - b.emargin.horizontal() - b.border.horizontal() - b.padding.horizontal();
        b.set_content_width(inner.max(0.0));
        b.bounds.width = self.outer_cross(b);
    }

    fn baseline(&self, _tree: &BoxTree, _id: BoxId) -> Option<f32> {
        // baselines run across a column; items fall back to flex-start
        None
    }
}

/// Container geometry fixed before the items are placed.
#[derive(Debug, Clone, Copy)]
struct Frame {
    main_size: f32,
    main_by_content: bool,
    cross_size: f32,
    cross_definite: bool,
}

/// Layout of flex containers.
pub struct FlexLayout;

impl LayoutManager for FlexLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        _force: bool,
        _line_start: bool,
    ) -> LayoutOutcome {
        {
            let b = &mut cx.tree[id];
            if !b.displayed {
                b.content = Size::zero();
                b.bounds = Rect::zero();
                return LayoutOutcome::fit();
            }
            b.avail_width = avail_width;
        }
        if !cx.tree[id].has_fixed_width() {
            let tree = &*cx.tree;
            let min = minimal_content_width(tree, id);
            let max = maximal_content_width(tree, id);
            let b = &tree[id];
            let availcont = avail_width
                - b.emargin.horizontal()
                - b.border.horizontal()
                - b.padding.horizontal();
            let pref = min.max(availcont).min(max);
            cx.tree[id].set_content_width(pref);
        }
        cx.tree[id].flags.width_computed = true;

        let Some(data) = cx.tree[id].kind.flex().cloned() else {
            return LayoutOutcome::fit();
        };
        let b = &cx.tree[id];
        let frame = if data.is_row() {
            Frame {
                main_size: b.content.width,
                main_by_content: false,
                cross_size: if b.flags.hset { b.content.height } else { 0.0 },
                cross_definite: b.flags.hset,
            }
        } else {
            let by_content = height_from_content(cx.tree, id);
            Frame {
                main_size: if by_content { 0.0 } else { b.content.height },
                main_by_content: by_content,
                cross_size: b.content.width,
                cross_definite: true,
            }
        };

        let (mut items, positioned): (Vec<BoxId>, Vec<BoxId>) = b
            .sub_boxes()
            .iter()
            .copied()
            .filter(|&c| cx.tree[c].displayed)
            .partition(|&c| !cx.tree[c].is_positioned());
        items.sort_by_key(|&c| cx.tree[c].flex_item.as_ref().map_or(0, |f| f.order));

        let (lines, frame) = if data.is_row() {
            layout_lines::<FlexLineRow>(cx, id, &data, &items, frame)
        } else {
            layout_lines::<FlexLineColumn>(cx, id, &data, &items, frame)
        };

        for p in positioned {
            set_own_floats(cx.tree, p);
            let width = cx.tree[id].content.width;
            layout_box(cx, p, width, true, true);
            cx.tree[p].block.static_position = Some((0.0, 0.0));
        }

        let b = &mut cx.tree[id];
        if data.is_row() {
            if !b.flags.hset {
                b.set_content_height(frame.cross_size);
            }
        } else if frame.main_by_content {
            b.set_content_height(frame.main_size);
        }
        let (w, h) = (b.total_width(), b.total_height());
        b.set_size(w, h);
        if let BoxKind::Flex(d) = &mut b.kind {
            d.main_size = frame.main_size;
            d.cross_size = frame.cross_size;
            d.main_by_content = frame.main_by_content;
            d.lines = lines;
        }
        debug!(box_id = id.index(), width = w, height = h, "flex container laid out");
        LayoutOutcome::fit()
    }
}

/// A column container takes its height from the items when the height is
/// auto, or a percentage of a containing block whose height is not fixed.
fn height_from_content(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    let height = b.style.height;
    !b.flags.hset
        || height.is_auto()
        || (height.is_percent() && !tree.containing_block_fixed_height(id))
}

fn layout_lines<L: FlexLine>(
    cx: &mut LayoutCx<'_>,
    id: BoxId,
    data: &FlexData,
    items: &[BoxId],
    mut frame: Frame,
) -> (Vec<Vec<BoxId>>, Frame) {
    let row = data.is_row();
    for &item in items {
        prepare_item(cx, item, row, &frame, data.align_items);
    }

    let mut lines: Vec<L> = Vec::new();
    let mut current = L::new(frame.main_size);
    for &item in items {
        if !current.register_item(&cx.tree[item], item, data.is_wrapping(), frame.main_by_content) {
            lines.push(current);
            current = L::new(frame.main_size);
            current.register_item(&cx.tree[item], item, data.is_wrapping(), frame.main_by_content);
        }
    }
    if !current.state().items.is_empty() {
        lines.push(current);
    }
    if data.is_wrap_reverse() {
        lines.reverse();
    }

    if frame.main_by_content {
        frame.main_size = lines.iter().map(|l| l.main_extent(cx.tree)).fold(0.0, f32::max);
    } else {
        for line in &lines {
            resolve_flexible_lengths(cx.tree, line, frame.main_size);
        }
    }
    for &item in items {
        apply_main_size(cx, item, row);
    }

    let single = if !data.is_wrapping() && frame.cross_definite {
        Some(frame.cross_size)
    } else {
        None
    };
    for line in &mut lines {
        line.set_line_cross_size(cx.tree, single);
    }
    distribute_lines(&mut lines, data, &mut frame);
    for line in &lines {
        line.align_items(cx.tree, data);
        line.justify_content(cx.tree, data, frame.main_size);
    }
    let ids = lines.iter().map(|l| l.state().items.clone()).collect::<Vec<_>>();
    trace!(
        box_id = id.index(),
        lines = ids.len(),
        main = frame.main_size,
        cross = frame.cross_size,
        "flex lines"
    );
    (ids, frame)
}

/// Resolve the flex base size and the hypothetical main size of an item and
/// give it that size along the main axis.
fn prepare_item(
    cx: &mut LayoutCx<'_>,
    item: BoxId,
    row: bool,
    frame: &Frame,
    align_items: AlignItems,
) {
    let mut fi = cx.tree[item]
        .flex_item
        .clone()
        .unwrap_or_else(|| FlexItem::new(&cx.tree[item].style));
    set_own_floats(cx.tree, item);
    {
        // drop the stretch of a previous layout
        let b = &mut cx.tree[item];
        b.flags.hset = !b.style.height.is_auto();
    }

    let base = if row {
        let b = &cx.tree[item];
        match fi.basis {
            FlexBasis::Length(l) => l,
            FlexBasis::Percent(p) => p / 100.0 * frame.main_size,
            _ if b.kind.is_replaced() || !b.style.width.is_auto() => b.content.width,
            _ => intrinsic::maximal_content_width(cx.tree, item),
        }
    } else {
        set_cross_width(cx.tree, item, frame.cross_size, fi.align_self.resolve(align_items));
        let outer = cx.tree[item].total_width();
        layout_box(cx, item, outer, true, true);
        let b = &cx.tree[item];
        match fi.basis {
            FlexBasis::Length(l) => l,
            FlexBasis::Percent(p) if !frame.main_by_content => p / 100.0 * frame.main_size,
            _ => b.content.height,
        }
    };

    let b = &mut cx.tree[item];
    let (hyp, min_main, max_main) = if row {
        let min = match b.style.min_width {
            Length::Zero | Length::Auto => None,
            _ => b.limits.min_width,
        };
        (b.limits.clamp_width(base), min, b.limits.max_width)
    } else {
        (b.limits.clamp_height(base), b.limits.min_height, b.limits.max_height)
    };
    fi.base_size = base;
    fi.hypothetical = hyp;
    fi.target = hyp;
    fi.frozen = false;
    fi.max_main = max_main;
    fi.min_main = min_main.unwrap_or(0.0);
    if row {
        b.content.width = hyp;
    } else {
        b.content.height = hyp;
    }
    b.flex_item = Some(fi);
    if row && min_main.is_none() {
        // automatic minimum size
        let floor = intrinsic::minimal_content_width(cx.tree, item);
        if let Some(f) = cx.tree[item].flex_item.as_mut() {
            f.min_main = floor.min(f.hypothetical);
        }
    }
    trace!(box_id = item.index(), base, hypothetical = hyp, "flex item prepared");
}

/// Width of an item of a column container.
fn set_cross_width(tree: &mut BoxTree, item: BoxId, cross: f32, mode: AlignItems) {
    let b = &tree[item];
    if b.kind.is_replaced() || !b.style.width.is_auto() {
        return;
    }
    let decorations = b.emargin.horizontal() + b.border.horizontal() + b.padding.horizontal();
    let avail = (cross - decorations).max(0.0);
    let width = if mode == AlignItems::Stretch {
        avail
    } else {
        let min = intrinsic::minimal_content_width(tree, item);
        let max = intrinsic::maximal_content_width(tree, item);
        min.max(avail).min(max)
    };
    tree[item].set_content_width(width);
    update_child_sizes(tree, item);
}

/// Grow or shrink the items of a line to fill `main_size`.
fn resolve_flexible_lengths<L: FlexLine>(tree: &mut BoxTree, line: &L, main_size: f32) {
    let items = &line.state().items;
    let used = line.main_extent(tree);
    let free = main_size - used;
    if free.abs() < 0.01 {
        return;
    }
    let grow = free > 0.0;
    loop {
        let mut weight = 0.0f32;
        let mut remaining = main_size;
        for &id in items {
            let b = &tree[id];
            let Some(fi) = b.flex_item.as_ref() else {
                continue;
            };
            let decorations = line.outer_main(b) - fi.hypothetical;
            if fi.frozen {
                remaining -= fi.target + decorations;
            } else {
                remaining -= fi.hypothetical + decorations;
                weight += if grow { fi.grow } else { fi.shrink * fi.base_size };
            }
        }
        if weight <= 0.0 {
            break;
        }
        let mut clamped = false;
        for &id in items {
            let Some(fi) = tree[id].flex_item.as_mut() else {
                continue;
            };
            if fi.frozen {
                continue;
            }
            let share = if grow {
                fi.grow / weight
            } else {
                fi.shrink * fi.base_size / weight
            };
            let mut size = fi.hypothetical + remaining * share;
            if let Some(max) = fi.max_main {
                if size > max {
                    size = max;
                    fi.frozen = true;
                    clamped = true;
                }
            }
            if size < fi.min_main {
                size = fi.min_main;
                fi.frozen = true;
                clamped = true;
            }
            fi.target = size;
        }
        if !clamped {
            break;
        }
    }
}

/// Give an item its final main size and lay it out.
fn apply_main_size(cx: &mut LayoutCx<'_>, item: BoxId, row: bool) {
    let Some(target) = cx.tree[item].flex_item.as_ref().map(|f| f.target) else {
        return;
    };
    if row {
        {
            let b = &mut cx.tree[item];
            b.content.width = target;
            b.flags.width_computed = true;
        }
        update_child_sizes(cx.tree, item);
        let outer = cx.tree[item].total_width();
        layout_box(cx, item, outer, true, true);
        let b = &mut cx.tree[item];
        b.content.width = target;
        b.bounds.width = b.total_width();
    } else {
        let b = &mut cx.tree[item];
        b.content.height = target;
        b.flags.hset = true;
        b.bounds.height =
            b.emargin.vertical() + b.border.vertical() + b.padding.vertical() + target;
    }
}

/// Place the lines on the cross axis (align-content) and settle the
/// container cross size.
fn distribute_lines<L: FlexLine>(lines: &mut [L], data: &FlexData, frame: &mut Frame) {
    let total: f32 = lines.iter().map(|l| l.state().cross_size).sum();
    if !frame.cross_definite {
        frame.cross_size = total;
    }
    let free = if data.is_wrapping() {
        (frame.cross_size - total).max(0.0)
    } else {
        0.0
    };
    let n = lines.len().max(1) as f32;
    let mut mode = data.align_content;
    if data.is_wrap_reverse() {
        mode = match mode {
            AlignContent::FlexStart => AlignContent::FlexEnd,
            AlignContent::FlexEnd => AlignContent::FlexStart,
            other => other,
        };
    }
    let (start, spacing) = match mode {
        AlignContent::FlexStart => (0.0, 0.0),
        AlignContent::FlexEnd => (free, 0.0),
        AlignContent::Center => (free / 2.0, 0.0),
        AlignContent::SpaceBetween if lines.len() > 1 => (0.0, free / (n - 1.0)),
        AlignContent::SpaceBetween if data.is_wrap_reverse() => (free, 0.0),
        AlignContent::SpaceBetween => (0.0, 0.0),
        AlignContent::SpaceAround => (free / n / 2.0, free / n),
        AlignContent::Stretch => {
            for line in lines.iter_mut() {
                line.state_mut().cross_size += free / n;
            }
            (0.0, 0.0)
        }
    };
    let mut pos = start;
    for line in lines.iter_mut() {
        let state = line.state_mut();
        state.cross_position = pos;
        pos += state.cross_size + spacing;
    }
}

/// Minimal content width of a flex container.
pub fn minimal_content_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    let Some(data) = b.kind.flex() else {
        return 0.0;
    };
    let widths = in_flow_items(tree, id).map(|c| intrinsic::minimal_width(tree, c));
    if data.is_row() && !data.is_wrapping() {
        widths.sum()
    } else {
        widths.fold(0.0, f32::max)
    }
}

/// Maximal content width of a flex container.
pub fn maximal_content_width(tree: &BoxTree, id: BoxId) -> f32 {
    let b = &tree[id];
    let Some(data) = b.kind.flex() else {
        return 0.0;
    };
    let widths = in_flow_items(tree, id).map(|c| intrinsic::maximal_width(tree, c));
    if data.is_row() {
        widths.sum()
    } else {
        widths.fold(0.0, f32::max)
    }
}

fn in_flow_items(tree: &BoxTree, id: BoxId) -> impl Iterator<Item = BoxId> + '_ {
    tree[id]
        .sub_boxes()
        .iter()
        .copied()
        .filter(move |&c| tree[c].displayed && !tree[c].is_positioned())
}

//! Absolute positions.
//!
//! Layout places every box relative to the content box of its parent, floats
//! relative to the owner of their float list. This pass walks the finished
//! tree top-down and turns those local coordinates into page coordinates.

use boxkit_css::{Float, Position, VerticalAlign};
use tracing::trace;

use crate::tree::{BoxId, BoxKind, BoxTree};
use crate::Rect;

/// Compute `abs_bounds` for `id` and all boxes below it.
///
/// The parent of `id` (and every containing block it refers to) must
/// already have its absolute bounds.
pub fn absolute_positions(tree: &mut BoxTree, id: BoxId) {
    if !tree[id].displayed {
        return;
    }
    let (x, y) = origin(tree, id);
    let b = &mut tree[id];
    b.abs_bounds = Rect::new(x, y, b.bounds.width, b.bounds.height);
    trace!(box_id = id.index(), kind = b.kind.name(), x, y, "absolute position");

    // rows walk their logical cells; anonymous cells may sit outside the child range
    let children: Vec<BoxId> = match &tree[id].kind {
        BoxKind::TableRow(row) => row.cells.clone(),
        _ => tree[id].sub_boxes().to_vec(),
    };
    for child in children {
        absolute_positions(tree, child);
    }
}

/// Top-left corner of the margin box of `id` in page coordinates.
fn origin(tree: &BoxTree, id: BoxId) -> (f32, f32) {
    let b = &tree[id];
    let Some(parent) = b.parent else {
        return (b.bounds.x, b.bounds.y);
    };

    let (mut x, mut y) = if b.is_positioned() {
        positioned_origin(tree, id, parent)
    } else if b.is_floating() {
        float_origin(tree, id, parent)
    } else {
        let p = &tree[parent];
        (p.abs_content_x() + b.bounds.x, p.abs_content_y() + b.bounds.y)
    };

    if let Some(slot) = b.inline.slot {
        let owner_y = tree[slot.owner].abs_content_y();
        match b.vertical_align() {
            VerticalAlign::Top => y = owner_y + slot.y,
            VerticalAlign::Bottom => y = owner_y + slot.y + slot.height - b.height(),
            _ => {}
        }
    }

    if b.is_relative() {
        let (dx, dy) = b.relative_offset();
        x += dx;
        y += dy;
    }
    (x, y)
}

fn positioned_origin(tree: &BoxTree, id: BoxId, parent: BoxId) -> (f32, f32) {
    let b = &tree[id];
    let reference = match (b.position, b.containing_block) {
        (Position::Fixed, _) | (_, None) => viewport_box(tree),
        (_, Some(cb)) => tree[cb].abs_padding_box(),
    };
    let p = &tree[parent];
    let (sx, sy) = b.block.static_position.unwrap_or((0.0, 0.0));
    let x = if b.flags.left_static {
        p.abs_content_x() + sx
    } else {
        reference.x + b.coords.left
    };
    let y = if b.flags.top_static {
        p.abs_content_y() + sy
    } else {
        reference.y + b.coords.top
    };
    (x, y)
}

fn float_origin(tree: &BoxTree, id: BoxId, parent: BoxId) -> (f32, f32) {
    let b = &tree[id];
    let owner = match b.block.float_owner {
        Some(list) => &tree[tree.float_list(list).owner()],
        None => &tree[parent],
    };
    let x = if b.float == Float::Right {
        owner.abs_content_x() + owner.content.width - b.bounds.x - b.width()
    } else {
        owner.abs_content_x() + b.bounds.x
    };
    (x, owner.abs_content_y() + b.bounds.y)
}

/// Padding box of the viewport, or the viewport size at the origin.
fn viewport_box(tree: &BoxTree) -> Rect {
    match tree.root() {
        Some(root) => tree[root].abs_padding_box(),
        None => {
            let size = tree.viewport_size();
            Rect::new(0.0, 0.0, size.width, size.height)
        }
    }
}

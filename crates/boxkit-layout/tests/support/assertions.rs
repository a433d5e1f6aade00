//! Geometry assertions.

use boxkit_layout::{BoxId, BoxTree, Rect};

const EPSILON: f32 = 0.01;

#[track_caller]
pub fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "{what}: expected {expected}, got {actual}"
    );
}

/// Top-left corner of the margin box in document coordinates.
#[track_caller]
pub fn assert_abs_origin(tree: &BoxTree, id: BoxId, x: f32, y: f32) {
    let r = tree[id].abs_bounds;
    assert!(
        (r.x - x).abs() < EPSILON && (r.y - y).abs() < EPSILON,
        "box {} ({}) at ({}, {}), expected ({x}, {y})",
        id.index(),
        tree[id].kind.name(),
        r.x,
        r.y
    );
}

#[track_caller]
pub fn assert_content_size(tree: &BoxTree, id: BoxId, width: f32, height: f32) {
    let c = tree[id].content;
    assert!(
        (c.width - width).abs() < EPSILON && (c.height - height).abs() < EPSILON,
        "box {} ({}) content {}x{}, expected {width}x{height}",
        id.index(),
        tree[id].kind.name(),
        c.width,
        c.height
    );
}

#[track_caller]
pub fn assert_zero_geometry(tree: &BoxTree, id: BoxId) {
    let b = &tree[id];
    assert_eq!(b.bounds, Rect::zero(), "bounds of box {}", id.index());
    assert_eq!((b.content.width, b.content.height), (0.0, 0.0), "content of box {}", id.index());
}

/// `inner` lies inside `outer` (absolute margin boxes).
#[track_caller]
pub fn assert_inside(tree: &BoxTree, inner: BoxId, outer: BoxId) {
    let (i, o) = (tree[inner].abs_bounds, tree[outer].abs_bounds);
    assert!(
        i.x >= o.x - EPSILON
            && i.y >= o.y - EPSILON
            && i.right() <= o.right() + EPSILON
            && i.bottom() <= o.bottom() + EPSILON,
        "box {} {:?} is not inside box {} {:?}",
        inner.index(),
        i,
        outer.index(),
        o
    );
}

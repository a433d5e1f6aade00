//! Float tracking for one block formatting context.
//!
//! Each block formatting context owns two lists, one per side. Float
//! rectangles are stored in the coordinate space of the list owner's content
//! box; for the right list `x` is measured from the owner's right content edge.

use crate::tree::BoxId;
use crate::Rect;

/// Index of a float list inside a [`crate::BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatListId(pub(crate) usize);

/// A placed float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatEntry {
    pub id: BoxId,
    /// Margin box in list-owner coordinates.
    pub bounds: Rect,
    /// Containing block of the float.
    pub containing_block: Option<BoxId>,
    /// Whether the float is declared visible.
    pub visible: bool,
}

/// Floats of one side of a block formatting context.
#[derive(Debug, Clone)]
pub struct FloatList {
    owner: BoxId,
    floats: Vec<FloatEntry>,
    /// Index of the float with the lowest bottom edge.
    bottom: Option<usize>,
    /// Index of the float placed lowest; new floats never go above its top.
    last: Option<usize>,
}

impl FloatList {
    pub fn new(owner: BoxId) -> Self {
        Self {
            owner,
            floats: Vec::new(),
            bottom: None,
            last: None,
        }
    }

    /// The block that owns this list.
    pub fn owner(&self) -> BoxId {
        self.owner
    }

    /// Add a placed float, updating the cached bottom-most and last boxes.
    pub fn add(&mut self, entry: FloatEntry) {
        let index = self.floats.len();
        let bottom = entry.bounds.bottom();
        let top = entry.bounds.y;
        self.floats.push(entry);
        if bottom > self.max_y() {
            self.bottom = Some(index);
        }
        if top > self.last_y() {
            self.last = Some(index);
        }
    }

    pub fn len(&self) -> usize {
        self.floats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FloatEntry> {
        self.floats.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FloatEntry> {
        self.floats.iter()
    }

    /// Bottom edge of the lowest float, 0 when empty.
    pub fn max_y(&self) -> f32 {
        self.bottom
            .map(|i| self.floats[i].bounds.bottom())
            .unwrap_or(0.0)
    }

    /// Top edge of the float placed lowest, 0 when empty.
    pub fn last_y(&self) -> f32 {
        self.last.map(|i| self.floats[i].bounds.y).unwrap_or(0.0)
    }

    /// Rightmost extent of the floats whose vertical span contains `y`.
    pub fn width_at(&self, y: f32) -> f32 {
        self.floats
            .iter()
            .filter(|f| f.bounds.y <= y && f.bounds.bottom() > y)
            .map(|f| f.bounds.right())
            .fold(0.0, f32::max)
    }

    /// Bottom edge of the widest float at `y`; `None` when no float covers `y`.
    pub fn next_y(&self, y: f32) -> Option<f32> {
        let mut max_x = 0.0;
        let mut next = None;
        for f in self.floats.iter().filter(|f| f.bounds.y <= y && f.bounds.bottom() > y) {
            let wx = f.bounds.right();
            if wx > max_x {
                max_x = wx;
                next = Some(f.bounds.bottom());
            }
        }
        next
    }

    /// The nearest Y below `y` where either side may widen.
    pub fn next_y_of(left: &FloatList, right: &FloatList, y: f32) -> Option<f32> {
        match (left.next_y(y), right.next_y(y)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Bottom edge of the lowest float whose containing block is `owner`.
    pub fn max_y_for_owner(&self, owner: BoxId, require_visible: bool) -> f32 {
        self.floats
            .iter()
            .filter(|f| (!require_visible || f.visible) && f.containing_block == Some(owner))
            .map(|f| f.bounds.bottom())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: usize, x: f32, y: f32, w: f32, h: f32) -> FloatEntry {
        FloatEntry {
            id: BoxId(id),
            bounds: Rect::new(x, y, w, h),
            containing_block: Some(BoxId(0)),
            visible: true,
        }
    }

    #[test]
    fn test_empty_list() {
        let list = FloatList::new(BoxId(0));
        assert_eq!(list.max_y(), 0.0);
        assert_eq!(list.last_y(), 0.0);
        assert_eq!(list.width_at(10.0), 0.0);
        assert_eq!(list.next_y(10.0), None);
    }

    #[test]
    fn test_width_is_monotonic_past_bottoms() {
        let mut list = FloatList::new(BoxId(0));
        list.add(entry(1, 0.0, 0.0, 100.0, 30.0));
        list.add(entry(2, 100.0, 0.0, 50.0, 10.0));
        list.add(entry(3, 0.0, 30.0, 40.0, 20.0));

        assert_eq!(list.max_y(), 50.0);
        let mut prev = f32::MAX;
        for y in [0.0, 9.0, 10.0, 29.0, 30.0, 49.0, 50.0, 80.0] {
            let w = list.width_at(y);
            assert!(w <= prev, "width grew at {}", y);
            prev = w;
        }
        assert_eq!(list.width_at(5.0), 150.0);
        assert_eq!(list.width_at(15.0), 100.0);
        assert_eq!(list.width_at(50.0), 0.0);
    }

    #[test]
    fn test_next_y_follows_widest_float() {
        let mut list = FloatList::new(BoxId(0));
        list.add(entry(1, 0.0, 0.0, 100.0, 30.0));
        list.add(entry(2, 100.0, 0.0, 50.0, 10.0));
        assert_eq!(list.next_y(0.0), Some(10.0));
        assert_eq!(list.next_y(10.0), Some(30.0));
        assert_eq!(list.next_y(30.0), None);
    }

    #[test]
    fn test_combined_next_y() {
        let mut left = FloatList::new(BoxId(0));
        let mut right = FloatList::new(BoxId(0));
        left.add(entry(1, 0.0, 0.0, 20.0, 40.0));
        right.add(entry(2, 0.0, 0.0, 20.0, 25.0));
        assert_eq!(FloatList::next_y_of(&left, &right, 0.0), Some(25.0));
        assert_eq!(FloatList::next_y_of(&left, &right, 30.0), Some(40.0));
        assert_eq!(FloatList::next_y_of(&left, &right, 40.0), None);
    }

    #[test]
    fn test_last_y_tracks_lowest_top() {
        let mut list = FloatList::new(BoxId(0));
        list.add(entry(1, 0.0, 20.0, 10.0, 10.0));
        list.add(entry(2, 10.0, 5.0, 10.0, 100.0));
        assert_eq!(list.last_y(), 20.0);
        assert_eq!(list.max_y(), 105.0);
    }

    #[test]
    fn test_max_y_for_owner_filters() {
        let mut list = FloatList::new(BoxId(0));
        list.add(entry(1, 0.0, 0.0, 10.0, 40.0));
        let mut nested = entry(2, 0.0, 0.0, 10.0, 90.0);
        nested.containing_block = Some(BoxId(7));
        list.add(nested);
        let mut hidden = entry(3, 0.0, 0.0, 10.0, 60.0);
        hidden.visible = false;
        list.add(hidden);

        assert_eq!(list.max_y_for_owner(BoxId(0), false), 60.0);
        assert_eq!(list.max_y_for_owner(BoxId(0), true), 40.0);
        assert_eq!(list.max_y_for_owner(BoxId(7), true), 90.0);
    }
}

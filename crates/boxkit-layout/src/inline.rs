//! Inline element layout.
//!
//! An inline box packs its children into the space left on the current line
//! of the enclosing block. When a child overflows, the box is split: the part
//! that fit stays in this box and a continuation box holding the remaining
//! children is returned to the caller, which places it on the next line.

use tracing::trace;

use crate::intrinsic::{self, inline_metrics};
use crate::line_box::{LineBox, LineContext};
use crate::manager::{layout_box, LayoutCx, LayoutManager, LayoutOutcome};
use crate::tree::{BoxId, BoxKind, BoxTree};
use crate::{Rect, Size};

/// Layout of inline (non-replaced, non-atomic) boxes.
pub struct InlineLayout;

impl LayoutManager for InlineLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        force: bool,
        line_start: bool,
    ) -> LayoutOutcome {
        {
            let b = &mut cx.tree[id];
            if !b.displayed {
                b.content = Size::zero();
                b.bounds = Rect::zero();
                return LayoutOutcome::fit();
            }
            b.end_child = b.end_limit.min(b.children.len());
            b.avail_width = avail_width;
            b.inline.finished_by_line_break = false;
        }
        cx.tree.adopt_children(id);

        let (start, end, wlimit) = {
            let b = &cx.tree[id];
            (b.start_child, b.end_child, b.available_content_width())
        };
        let mut x = 0.0f32;
        let mut lastbreak = start;
        let mut rest = None;
        let mut fits = true;

        let mut i = start;
        while i < end {
            let child = cx.tree[id].children[i];
            if intrinsic::can_split_before(cx.tree, child) {
                lastbreak = i;
            }
            let f = force && (i == start || lastbreak == start);
            let ignore_ws = i > start && {
                let prev = cx.tree[id].children[i - 1];
                cx.tree[prev].collapses_spaces() && intrinsic::ends_with_whitespace(cx.tree, prev)
            };
            set_ignore_initial_whitespace(cx.tree, child, ignore_ws);

            if !cx.tree[child].is_in_flow() && cx.tree[child].is_block {
                // out-of-flow content keeps its static position on the line
                layout_box(cx, child, wlimit, true, false);
                let c = &mut cx.tree[child];
                c.set_position(x, 0.0);
                c.block.static_position = Some((x, 0.0));
                i += 1;
                continue;
            }

            let outcome = layout_box(cx, child, wlimit - x, f, line_start && i == start);
            if outcome.fits {
                if cx.tree[child].is_in_flow() {
                    let c = &mut cx.tree[child];
                    c.set_position(x, 0.0);
                    x += c.width();
                }
                if let Some(r) = outcome.rest {
                    let copy = cx.tree.copy_box(id);
                    {
                        let c = &mut cx.tree[copy];
                        c.start_child = i;
                        c.children[i] = r;
                    }
                    cx.tree.adopt_children(copy);
                    cx.tree[id].end_child = i + 1;
                    rest = Some(copy);
                    break;
                }
                if cx.tree[child].inline.finished_by_line_break {
                    cx.tree[id].inline.finished_by_line_break = true;
                    if i + 1 < end {
                        let copy = cx.tree.copy_box(id);
                        cx.tree[copy].start_child = i + 1;
                        cx.tree.adopt_children(copy);
                        cx.tree[id].end_child = i + 1;
                        rest = Some(copy);
                    }
                    break;
                }
            } else if lastbreak > start {
                let copy = cx.tree.copy_box(id);
                cx.tree[copy].start_child = lastbreak;
                cx.tree.adopt_children(copy);
                cx.tree[id].end_child = lastbreak;
                rest = Some(copy);
                break;
            } else {
                fits = false;
                break;
            }
            if intrinsic::can_split_after(cx.tree, child) {
                lastbreak = i + 1;
            }
            i += 1;
        }

        finish_inline(cx.tree, id);
        if let Some(r) = rest {
            trace!(
                box_id = id.index(),
                rest = r.index(),
                end_child = cx.tree[id].end_child,
                "inline box split"
            );
        }
        LayoutOutcome { fits, rest }
    }
}

/// Mark `id` (and its first descendant on an inline path) to skip leading whitespace.
pub fn set_ignore_initial_whitespace(tree: &mut BoxTree, id: BoxId, value: bool) {
    tree[id].inline.ignore_initial_ws = value;
    if let BoxKind::Inline = tree[id].kind {
        if let Some(&first) = tree[id].sub_boxes().first() {
            set_ignore_initial_whitespace(tree, first, value);
        }
    }
}

/// Compute the metrics and size of an inline box from its placed children.
fn finish_inline(tree: &mut BoxTree, id: BoxId) {
    let children = tree[id].sub_boxes().to_vec();
    let (ctx, line_height) = (tree[id].ctx.clone(), tree[id].line_height);
    let mut line = LineBox::new(LineContext::new(&ctx, line_height), tree[id].start_child, 0.0);
    line.consider_box_properties(&ctx, line_height);
    let mut width = 0.0f32;
    let mut collapsed = true;
    for &child in &children {
        let c = &tree[child];
        if !c.is_in_flow() {
            continue;
        }
        width += c.width();
        let metrics = inline_metrics(tree, child);
        collapsed &= metrics.collapsed || !c.displayed;
        line.consider_box(&metrics);
    }
    line.set_end(tree[id].end_child);

    let font_height = ctx.font_height();
    let ascent = ctx.baseline_offset();
    {
        let b = &mut tree[id];
        b.content.width = width;
        b.content.height = (font_height * 1.1).round();
        b.inline.half_lead = (b.content.height - font_height) / 2.0;
        b.inline.baseline_offset = line.baseline_offset();
        b.inline.below_baseline = line.below_baseline();
        b.inline.max_line_height = line_height.max(line.max_aligned_height());
        b.inline.linebox_offset = line.baseline_offset() - ascent - b.inline.half_lead;
    }

    let own_offset = tree[id].inline.linebox_offset;
    for &child in &children {
        if !tree[child].is_in_flow() {
            continue;
        }
        let metrics = inline_metrics(tree, child);
        let mut dif = line.align_box(&metrics) - own_offset;
        if let BoxKind::Inline = tree[child].kind {
            dif -= tree[child].content_offset_y();
        }
        tree[child].move_down(dif);
    }

    let b = &mut tree[id];
    let decorated = b.margin.horizontal() + b.border.horizontal() + b.padding.horizontal() > 0.0;
    b.inline.collapsed = collapsed && width == 0.0 && !decorated;
    b.inline.line = Some(line);
    let w = b.total_width();
    let h = b.border.vertical() + b.padding.vertical() + b.content.height;
    b.set_size(w, h);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::context::{FontSpec, MonospaceMeasurer, VisualContext};
    use crate::text::TextData;
    use crate::tree::LayoutBox;
    use boxkit_css::{ComputedStyle, Display, WhiteSpace};
    use std::sync::Arc;

    fn ctx() -> VisualContext {
        VisualContext::new(
            Arc::new(MonospaceMeasurer::default()),
            FontSpec::new("serif", 20.0),
            Size::new(800.0, 600.0),
        )
    }

    fn inline_with_words(words: &[&str]) -> (BoxTree, BoxId) {
        let mut tree = BoxTree::new(Size::new(800.0, 600.0));
        let mut style = ComputedStyle::new();
        style.display = Display::Inline;
        let span = tree.push(LayoutBox::new(BoxKind::Inline, style.clone(), ctx()));
        for w in words {
            let data = TextData::new(w, WhiteSpace::Normal, &ctx());
            let text = tree.push(LayoutBox::new(BoxKind::Text(data), style.clone(), ctx()));
            tree.append_child(span, text);
        }
        (tree, span)
    }

    #[test]
    fn test_children_placed_side_by_side() {
        let (mut tree, span) = inline_with_words(&["ab ", "cd"]);
        let config = LayoutConfig::default();
        let mut cx = LayoutCx::new(&mut tree, &config);
        let out = InlineLayout.layout(&mut cx, span, 500.0, false, true);
        assert!(out.fits);
        assert!(out.rest.is_none());
        let kids = tree[span].children.clone();
        assert_eq!(tree[kids[0]].bounds.x, 0.0);
        assert_eq!(tree[kids[1]].bounds.x, 30.0);
        assert_eq!(tree[span].content.width, 50.0);
    }

    #[test]
    fn test_split_at_last_break() {
        let (mut tree, span) = inline_with_words(&["aaaa ", "bbbb ", "cccc"]);
        let config = LayoutConfig::default();
        let mut cx = LayoutCx::new(&mut tree, &config);
        let out = InlineLayout.layout(&mut cx, span, 100.0, false, true);
        assert!(out.fits);
        let rest = out.rest.expect("continuation");
        assert!(tree[rest].splitted);
        assert_eq!(tree[span].end_child, 2);
        assert_eq!(tree[rest].start_child, 2);
    }

    #[test]
    fn test_nothing_fits_without_break() {
        let (mut tree, span) = inline_with_words(&["unbreakable"]);
        let config = LayoutConfig::default();
        let mut cx = LayoutCx::new(&mut tree, &config);
        let out = InlineLayout.layout(&mut cx, span, 50.0, false, true);
        assert!(!out.fits);
        let mut cx = LayoutCx::new(&mut tree, &config);
        let out = InlineLayout.layout(&mut cx, span, 50.0, true, true);
        assert!(out.fits);
        assert_eq!(tree[span].content.width, 110.0);
    }

    #[test]
    fn test_relayout_is_idempotent() {
        let (mut tree, span) = inline_with_words(&["aaaa ", "bbbb ", "cccc"]);
        let config = LayoutConfig::default();
        let mut cx = LayoutCx::new(&mut tree, &config);
        InlineLayout.layout(&mut cx, span, 100.0, false, true);
        let first: Vec<f32> = tree[span].sub_boxes().iter().map(|&c| tree[c].bounds.x).collect();
        let mut cx = LayoutCx::new(&mut tree, &config);
        InlineLayout.layout(&mut cx, span, 100.0, false, true);
        let second: Vec<f32> = tree[span].sub_boxes().iter().map(|&c| tree[c].bounds.x).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_whitespace_only_collapses() {
        let (mut tree, span) = inline_with_words(&["   "]);
        let config = LayoutConfig::default();
        let mut cx = LayoutCx::new(&mut tree, &config);
        let out = InlineLayout.layout(&mut cx, span, 100.0, false, true);
        assert!(out.fits);
        assert!(out.rest.is_none());
        assert_eq!(tree[span].content.width, 0.0);
        assert!(tree[span].inline.collapsed);
    }
}

//! Draw-stage protocol.
//!
//! A finished, absolutely positioned tree is handed to a [`BoxRenderer`] in
//! CSS painting order. Every stacking context draws, in turn:
//!
//! 1. its own background
//! 2. child contexts with a negative `z-index`
//! 3. backgrounds of in-flow block-level descendants ([`DrawStage::BlockBackgrounds`])
//! 4. floats, each as if it formed a context ([`DrawStage::Floats`])
//! 5. inline-level content ([`DrawStage::Inline`])
//! 6. child contexts with `z-index` zero or auto, then positive ones ([`DrawStage::Positioned`])
//!
//! Contexts of the same level are drawn in box creation order.

use boxkit_css::{Color, Float};
use tracing::{debug, trace};
use url::Url;

use crate::background::BackgroundPlacement;
use crate::tree::{BoxId, BoxKind, BoxTree};
use crate::Rect;

/// Painting pass over the children of a stacking context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStage {
    /// In-flow, non-inline, non-positioned content.
    BlockBackgrounds,
    /// Non-positioned floats.
    Floats,
    /// In-flow inline-level content, including inline-blocks.
    Inline,
    /// Positioned descendants, ordered by `z-index`.
    Positioned,
}

/// Consumer of the finished box tree.
///
/// `start_element_contents` and `finish_element_contents` bracket the
/// content of an element; the other calls paint one part of one box.
pub trait BoxRenderer {
    fn start_element_contents(&mut self, tree: &BoxTree, id: BoxId);

    fn finish_element_contents(&mut self, tree: &BoxTree, id: BoxId);

    /// Background color, background image and borders of an element.
    fn render_element_background(&mut self, tree: &BoxTree, id: BoxId);

    fn render_text_content(&mut self, tree: &BoxTree, id: BoxId);

    fn render_replaced_content(&mut self, tree: &BoxTree, id: BoxId);

    /// Finish drawing; no calls follow.
    fn close(&mut self);
}

/// Draw the tree rooted at `root` and close the renderer.
pub fn draw_tree(tree: &BoxTree, root: BoxId, renderer: &mut dyn BoxRenderer) {
    debug!(root = root.index(), boxes = tree.len(), "drawing box tree");
    let mut painter = Painter { tree, renderer };
    painter.draw_stacking_context(root, true);
    painter.renderer.close();
}

/// Positioned boxes form a stacking context; the root always does.
fn forms_stacking_context(tree: &BoxTree, id: BoxId) -> bool {
    let b = &tree[id];
    b.parent.is_none() || b.position.is_positioned()
}

fn z_index(tree: &BoxTree, id: BoxId) -> i32 {
    tree[id].style.z_index.unwrap_or(0)
}

struct Painter<'a> {
    tree: &'a BoxTree,
    renderer: &'a mut dyn BoxRenderer,
}

impl Painter<'_> {
    fn draw_stacking_context(&mut self, id: BoxId, context: bool) {
        let b = &self.tree[id];
        if !b.displayed {
            return;
        }
        let children = if context { self.child_contexts(id) } else { Vec::new() };
        trace!(box_id = id.index(), contexts = children.len(), "stacking context");

        if context && b.visible && renders_background(&b.kind) {
            self.renderer.render_element_background(self.tree, id);
        }
        self.renderer.start_element_contents(self.tree, id);
        if b.kind.is_replaced() && b.visible {
            self.renderer.render_replaced_content(self.tree, id);
        }

        let split = children.partition_point(|&c| z_index(self.tree, c) < 0);
        for &child in &children[..split] {
            self.draw_stacking_context(child, true);
        }
        for stage in [
            DrawStage::BlockBackgrounds,
            DrawStage::Floats,
            DrawStage::Inline,
            DrawStage::Positioned,
        ] {
            if stage == DrawStage::Positioned {
                for &child in &children[split..] {
                    self.draw_stacking_context(child, true);
                }
            } else {
                self.draw_children(id, stage);
            }
        }

        self.renderer.finish_element_contents(self.tree, id);
    }

    /// Positioned descendants that belong to the context of `id`, sorted by
    /// `z-index` and then creation order.
    fn child_contexts(&self, id: BoxId) -> Vec<BoxId> {
        let mut found = Vec::new();
        let mut stack: Vec<BoxId> = self.tree[id].sub_boxes().iter().rev().copied().collect();
        while let Some(child) = stack.pop() {
            if !self.tree[child].displayed {
                continue;
            }
            if forms_stacking_context(self.tree, child) {
                found.push(child);
            } else {
                stack.extend(self.tree[child].sub_boxes().iter().rev().copied());
            }
        }
        found.sort_by_key(|&c| (z_index(self.tree, c), self.tree[c].order));
        found
    }

    fn draw_children(&mut self, id: BoxId, stage: DrawStage) {
        for &child in self.tree[id].sub_boxes() {
            self.draw(child, stage);
        }
    }

    fn draw(&mut self, id: BoxId, stage: DrawStage) {
        let b = &self.tree[id];
        // positioned boxes are drawn by their stacking context
        if !b.displayed || forms_stacking_context(self.tree, id) {
            return;
        }
        let floating = b.float != Float::None;
        match &b.kind {
            BoxKind::Text(_) => {
                if stage == DrawStage::Inline && b.visible {
                    self.renderer.render_text_content(self.tree, id);
                }
            }
            BoxKind::Inline => {
                if stage == DrawStage::Inline && b.visible {
                    self.renderer.render_element_background(self.tree, id);
                    self.renderer.start_element_contents(self.tree, id);
                    self.draw_children(id, stage);
                    self.renderer.finish_element_contents(self.tree, id);
                }
            }
            BoxKind::InlineBlock => {
                if stage == DrawStage::Inline {
                    if b.visible {
                        self.renderer.render_element_background(self.tree, id);
                    }
                    self.draw_stacking_context(id, false);
                }
            }
            BoxKind::Replaced(data) if !data.block => {
                if stage == DrawStage::Inline && b.visible {
                    self.renderer.render_element_background(self.tree, id);
                    self.renderer.start_element_contents(self.tree, id);
                    self.renderer.render_replaced_content(self.tree, id);
                    self.renderer.finish_element_contents(self.tree, id);
                }
            }
            BoxKind::Replaced(_) => match stage {
                DrawStage::BlockBackgrounds if !floating && b.visible => {
                    self.renderer.render_element_background(self.tree, id);
                }
                DrawStage::Floats if floating && b.visible => {
                    self.renderer.render_element_background(self.tree, id);
                    self.draw_stacking_context(id, false);
                }
                DrawStage::Inline if !floating && b.visible => {
                    self.renderer.start_element_contents(self.tree, id);
                    self.renderer.render_replaced_content(self.tree, id);
                    self.renderer.finish_element_contents(self.tree, id);
                }
                _ => {}
            },
            _ => match stage {
                DrawStage::BlockBackgrounds => {
                    if !floating {
                        if b.visible && renders_background(&b.kind) {
                            self.renderer.render_element_background(self.tree, id);
                        }
                        self.draw_children(id, stage);
                    }
                }
                DrawStage::Floats => {
                    if floating {
                        if b.visible && renders_background(&b.kind) {
                            self.renderer.render_element_background(self.tree, id);
                        }
                        self.draw_stacking_context(id, false);
                    } else {
                        self.draw_children(id, stage);
                    }
                }
                DrawStage::Inline => {
                    if !floating {
                        self.renderer.start_element_contents(self.tree, id);
                        self.draw_children(id, stage);
                        self.renderer.finish_element_contents(self.tree, id);
                    }
                }
                DrawStage::Positioned => {}
            },
        }
    }
}

/// Table wrappers, rows and column boxes never paint a background of their own.
fn renders_background(kind: &BoxKind) -> bool {
    !matches!(
        kind,
        BoxKind::TableWrapper(_)
            | BoxKind::TableBody(_)
            | BoxKind::TableRow(_)
            | BoxKind::TableColumn(_)
            | BoxKind::TableColumnGroup(_)
    )
}

/// A recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    StartElement {
        id: BoxId,
        tag: Option<String>,
    },
    FinishElement {
        id: BoxId,
    },
    Background {
        id: BoxId,
        /// Absolute border box.
        rect: Rect,
        color: Color,
        border_widths: crate::EdgeSizes,
        image: Option<(Url, BackgroundPlacement)>,
    },
    Text {
        id: BoxId,
        text: String,
        x: f32,
        /// Baseline position.
        y: f32,
        width: f32,
    },
    Replaced {
        id: BoxId,
        /// Absolute content box.
        rect: Rect,
        url: Option<Url>,
        loaded: bool,
    },
}

impl DisplayCommand {
    pub fn box_id(&self) -> BoxId {
        match self {
            DisplayCommand::StartElement { id, .. }
            | DisplayCommand::FinishElement { id }
            | DisplayCommand::Background { id, .. }
            | DisplayCommand::Text { id, .. }
            | DisplayCommand::Replaced { id, .. } => *id,
        }
    }
}

/// Renderer that records every call as a [`DisplayCommand`].
#[derive(Debug, Default, Clone)]
pub struct DisplayList {
    pub commands: Vec<DisplayCommand>,
    closed: bool,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the drawing of a finished tree.
    pub fn build(tree: &BoxTree, root: BoxId) -> Self {
        let mut list = DisplayList::new();
        draw_tree(tree, root, &mut list);
        list
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Boxes in the order their text or replaced content was painted.
    pub fn content_order(&self) -> Vec<BoxId> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::Text { .. } | DisplayCommand::Replaced { .. }))
            .map(DisplayCommand::box_id)
            .collect()
    }

    /// Boxes in the order their backgrounds were painted.
    pub fn background_order(&self) -> Vec<BoxId> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::Background { .. }))
            .map(DisplayCommand::box_id)
            .collect()
    }
}

impl BoxRenderer for DisplayList {
    fn start_element_contents(&mut self, tree: &BoxTree, id: BoxId) {
        self.commands.push(DisplayCommand::StartElement {
            id,
            tag: tree[id].tag.clone(),
        });
    }

    fn finish_element_contents(&mut self, _tree: &BoxTree, id: BoxId) {
        self.commands.push(DisplayCommand::FinishElement { id });
    }

    fn render_element_background(&mut self, tree: &BoxTree, id: BoxId) {
        let b = &tree[id];
        let image = b
            .background
            .as_ref()
            .map(|bg| (bg.url.clone(), bg.compute_placement(tree, id)));
        self.commands.push(DisplayCommand::Background {
            id,
            rect: b.abs_border_box(),
            color: b.style.background_color,
            border_widths: b.border,
            image,
        });
    }

    fn render_text_content(&mut self, tree: &BoxTree, id: BoxId) {
        let b = &tree[id];
        if let Some(text) = b.kind.text() {
            self.commands.push(DisplayCommand::Text {
                id,
                text: text.current().to_string(),
                x: b.abs_content_x(),
                y: b.abs_content_y() + b.ctx.baseline_offset(),
                width: b.content.width,
            });
        }
    }

    fn render_replaced_content(&mut self, tree: &BoxTree, id: BoxId) {
        let b = &tree[id];
        if let Some(data) = b.kind.replaced() {
            self.commands.push(DisplayCommand::Replaced {
                id,
                rect: b.abs_content_box(),
                url: data.content.url().cloned(),
                loaded: data.content.is_loaded(),
            });
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FontSpec, MonospaceMeasurer, VisualContext};
    use crate::text::TextData;
    use crate::tree::LayoutBox;
    use crate::Size;
    use boxkit_css::{ComputedStyle, Display, Position, WhiteSpace};
    use std::sync::Arc;

    fn ctx() -> VisualContext {
        VisualContext::new(
            Arc::new(MonospaceMeasurer::default()),
            FontSpec::new("serif", 16.0),
            Size::new(800.0, 600.0),
        )
    }

    fn element(
        tree: &mut BoxTree,
        parent: Option<BoxId>,
        kind: BoxKind,
        style: ComputedStyle,
    ) -> BoxId {
        let id = tree.push(LayoutBox::new(kind, style, ctx()));
        if let Some(p) = parent {
            tree.append_child(p, id);
        }
        id
    }

    fn block(tree: &mut BoxTree, parent: BoxId) -> BoxId {
        let mut style = ComputedStyle::new();
        style.display = Display::Block;
        element(tree, Some(parent), BoxKind::Block, style)
    }

    fn text(tree: &mut BoxTree, parent: BoxId, s: &str) -> BoxId {
        let data = TextData::new(s, WhiteSpace::Normal, &ctx());
        element(tree, Some(parent), BoxKind::Text(data), ComputedStyle::new())
    }

    fn positioned(tree: &mut BoxTree, parent: BoxId, z: Option<i32>) -> BoxId {
        let mut style = ComputedStyle::new();
        style.display = Display::Block;
        style.position = Position::Absolute;
        style.z_index = z;
        element(tree, Some(parent), BoxKind::Block, style)
    }

    #[test]
    fn test_painting_order_of_stages() {
        let mut tree = BoxTree::new(Size::new(800.0, 600.0));
        let root = element(&mut tree, None, BoxKind::Viewport, ComputedStyle::new());
        let body = block(&mut tree, root);
        let para = block(&mut tree, body);
        let words = text(&mut tree, para, "hello");
        let mut float_style = ComputedStyle::new();
        float_style.display = Display::Block;
        float_style.float = Float::Left;
        let float = element(&mut tree, Some(body), BoxKind::Block, float_style);
        let float_text = text(&mut tree, float, "side");
        let top = positioned(&mut tree, body, Some(5));
        let bottom = positioned(&mut tree, body, Some(-1));

        let list = DisplayList::build(&tree, root);
        assert!(list.is_closed());
        assert_eq!(list.background_order(), vec![root, bottom, body, para, float, top]);
        assert_eq!(list.content_order(), vec![float_text, words]);
    }

    #[test]
    fn test_equal_z_index_keeps_creation_order() {
        let mut tree = BoxTree::new(Size::new(800.0, 600.0));
        let root = element(&mut tree, None, BoxKind::Viewport, ComputedStyle::new());
        let body = block(&mut tree, root);
        let a = positioned(&mut tree, body, None);
        let b = positioned(&mut tree, body, Some(0));
        let c = positioned(&mut tree, root, None);

        let list = DisplayList::build(&tree, root);
        assert_eq!(list.background_order(), vec![root, body, a, b, c]);
    }

    #[test]
    fn test_hidden_boxes_are_skipped() {
        let mut tree = BoxTree::new(Size::new(800.0, 600.0));
        let root = element(&mut tree, None, BoxKind::Viewport, ComputedStyle::new());
        let mut style = ComputedStyle::new();
        style.display = Display::None;
        let gone = element(&mut tree, Some(root), BoxKind::Block, style);
        text(&mut tree, gone, "never drawn");

        let list = DisplayList::build(&tree, root);
        assert!(list.content_order().is_empty());
        assert_eq!(list.background_order(), vec![root]);
    }

    #[test]
    fn test_start_and_finish_are_balanced() {
        let mut tree = BoxTree::new(Size::new(800.0, 600.0));
        let root = element(&mut tree, None, BoxKind::Viewport, ComputedStyle::new());
        let body = block(&mut tree, root);
        text(&mut tree, body, "a b");
        positioned(&mut tree, body, Some(2));

        let list = DisplayList::build(&tree, root);
        let starts = list
            .commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::StartElement { .. }))
            .count();
        let finishes = list
            .commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::FinishElement { .. }))
            .count();
        assert_eq!(starts, finishes);
        assert!(matches!(
            list.commands.first(),
            Some(DisplayCommand::Background { id, .. }) if *id == root
        ));
    }
}

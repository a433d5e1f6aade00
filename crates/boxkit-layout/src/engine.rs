//! Layout sessions.
//!
//! A [`LayoutEngine`] owns the collaborators one session shares between its
//! layouts: the configuration, the text measurer, the image cache and the
//! image loader. It runs the whole pipeline: box tree construction, size
//! initialization, layout of the viewport and the absolute position pass.

use std::sync::Arc;

use boxkit_image::{ImageCache, ImageLoader, StaticImageLoader};
use tracing::{debug, info};

use crate::block::{init_first_line, set_own_floats};
use crate::config::LayoutConfig;
use crate::context::{MonospaceMeasurer, TextMeasurer};
use crate::factory::{BoxFactory, StyledNode};
use crate::manager::{layout_box, LayoutCx, LayoutOutcome};
use crate::position::absolute_positions;
use crate::render::DisplayList;
use crate::sizing::initialize_subtree;
use crate::tree::{BoxId, BoxKind, BoxTree};
use crate::LayoutError;

/// The layout pipeline of one session.
pub struct LayoutEngine {
    config: LayoutConfig,
    measurer: Arc<dyn TextMeasurer>,
    images: Arc<ImageCache>,
    loader: Arc<dyn ImageLoader>,
}

impl LayoutEngine {
    /// Create an engine with a monospace measurer, a fresh image cache and a
    /// loader that knows no images.
    pub fn new(config: LayoutConfig) -> Self {
        LayoutEngineBuilder::new().config(config).build()
    }

    pub fn builder() -> LayoutEngineBuilder {
        LayoutEngineBuilder::new()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The image cache shared by every tree this engine builds.
    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// Build the box tree of `document` without laying it out.
    pub fn build_tree(&self, document: &StyledNode) -> Result<BoxTree, LayoutError> {
        let mut factory = BoxFactory::new(
            self.config.clone(),
            Arc::clone(&self.measurer),
            Arc::clone(&self.images),
            Arc::clone(&self.loader),
        );
        factory.build(document)
    }

    /// Build and lay out the box tree of `document`.
    pub fn layout(&self, document: &StyledNode) -> Result<BoxTree, LayoutError> {
        let mut tree = self.build_tree(document)?;
        self.layout_tree(&mut tree)?;
        Ok(tree)
    }

    /// Lay out a built tree from its viewport and compute absolute positions.
    ///
    /// The tree may be laid out again; continuations and float lists of the
    /// previous layout are discarded first.
    pub fn layout_tree(&self, tree: &mut BoxTree) -> Result<(), LayoutError> {
        let root = tree.root().ok_or(LayoutError::EmptyTree)?;
        let ids: Vec<BoxId> = tree.ids().collect();
        for &id in &ids {
            let state = &mut tree[id].block;
            state.float_left = None;
            state.float_right = None;
            state.float_owner = None;
        }

        initialize_subtree(tree, root);
        for &id in &ids {
            // list items start their first line with their own strut
            if matches!(tree[id].kind, BoxKind::ListItem) && !tree[id].splitted {
                init_first_line(tree, id, id);
            }
        }
        set_own_floats(tree, root);

        let width = tree.viewport_size().width;
        let mut cx = LayoutCx::new(tree, &self.config);
        let outcome = layout_box(&mut cx, root, width, true, true);
        debug!(fits = outcome.fits, "viewport laid out");

        absolute_positions(tree, root);
        let b = &tree[root];
        info!(
            boxes = tree.len(),
            width = b.bounds.width,
            height = b.bounds.height,
            "layout finished"
        );
        Ok(())
    }

    /// Lay out one subtree again into `avail_width` and recompute its
    /// absolute positions.
    ///
    /// The parent of `id` must have been laid out already.
    pub fn layout_subtree(
        &self,
        tree: &mut BoxTree,
        id: BoxId,
        avail_width: f32,
    ) -> Result<LayoutOutcome, LayoutError> {
        if tree.get(id).is_none() {
            return Err(LayoutError::UnknownBox(id));
        }
        let mut cx = LayoutCx::new(tree, &self.config);
        let outcome = layout_box(&mut cx, id, avail_width, true, true);
        absolute_positions(tree, id);
        Ok(outcome)
    }

    /// Record the draw calls for a laid-out tree.
    pub fn display_list(&self, tree: &BoxTree) -> Result<DisplayList, LayoutError> {
        let root = tree.root().ok_or(LayoutError::EmptyTree)?;
        Ok(DisplayList::build(tree, root))
    }
}

/// Builder for [`LayoutEngine`].
pub struct LayoutEngineBuilder {
    config: LayoutConfig,
    measurer: Option<Arc<dyn TextMeasurer>>,
    images: Option<Arc<ImageCache>>,
    loader: Option<Arc<dyn ImageLoader>>,
}

impl LayoutEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            measurer: None,
            images: None,
            loader: None,
        }
    }

    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    /// Set the text measurer.
    pub fn measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = Some(measurer);
        self
    }

    /// Share an existing image cache with this engine.
    pub fn image_cache(mut self, images: Arc<ImageCache>) -> Self {
        self.images = Some(images);
        self
    }

    /// Set the loader used on cache misses.
    pub fn image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn build(self) -> LayoutEngine {
        LayoutEngine {
            config: self.config,
            measurer: self
                .measurer
                .unwrap_or_else(|| Arc::new(MonospaceMeasurer::default())),
            images: self.images.unwrap_or_else(ImageCache::shared),
            loader: self.loader.unwrap_or_else(|| Arc::new(StaticImageLoader::new())),
        }
    }
}

impl Default for LayoutEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Size;
    use boxkit_css::ComputedStyle;

    fn style(css: &str) -> ComputedStyle {
        let mut s = ComputedStyle::new();
        s.apply_declarations(css).expect("valid declarations");
        s
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::new(LayoutConfig::with_viewport(400.0, 300.0))
    }

    fn document() -> StyledNode {
        StyledNode::element("body", style("display: block; margin: 0")).with_children([
            StyledNode::element("div", style("display: block; height: 50px")),
            StyledNode::element("div", style("display: none; height: 50px")),
            StyledNode::element("div", style("display: block; height: 20px; margin-top: 10px")),
        ])
    }

    #[test]
    fn test_layout_stacks_blocks() {
        let tree = engine().layout(&document()).expect("layout");
        let vp = tree.root().expect("root");
        assert_eq!(tree[vp].content, Size::new(400.0, 300.0));
        let body = tree[vp].children[0];
        let kids = tree[body].children.clone();
        assert_eq!(tree[kids[0]].abs_bounds.y, 0.0);
        assert_eq!(tree[kids[0]].content.width, 400.0);
        assert_eq!(tree[kids[1]].bounds, crate::Rect::zero());
        assert_eq!(tree[kids[2]].abs_bounds.y, 50.0);
        assert_eq!(tree[kids[2]].content.height, 20.0);
    }

    #[test]
    fn test_relayout_is_idempotent() {
        let engine = engine();
        let doc = StyledNode::element("p", style("display: block; margin: 0"))
            .with_child(StyledNode::text(
                "some words that wrap across several short lines of text",
            ));
        let mut tree = engine.build_tree(&doc).expect("tree");
        // continuations are appended to the arena; compare the built boxes
        let built = tree.len();
        engine.layout_tree(&mut tree).expect("first layout");
        let first: Vec<_> = tree.ids().take(built).map(|id| tree[id].abs_bounds).collect();
        engine.layout_tree(&mut tree).expect("second layout");
        let second: Vec<_> = tree.ids().take(built).map(|id| tree[id].abs_bounds).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let mut tree = BoxTree::new(Size::new(100.0, 100.0));
        assert!(matches!(engine().layout_tree(&mut tree), Err(LayoutError::EmptyTree)));
    }

    #[test]
    fn test_unknown_box_is_an_error() {
        let engine = engine();
        let mut tree = engine.layout(&document()).expect("layout");
        let missing = BoxId(tree.len() + 10);
        assert!(matches!(
            engine.layout_subtree(&mut tree, missing, 100.0),
            Err(LayoutError::UnknownBox(_))
        ));
    }

    #[test]
    fn test_display_list_is_closed() {
        let engine = engine();
        let tree = engine.layout(&document()).expect("layout");
        let list = engine.display_list(&tree).expect("display list");
        assert!(list.is_closed());
        assert!(!list.is_empty());
    }
}

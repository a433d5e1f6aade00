//! Box tree construction.
//!
//! The factory turns a tree of styled nodes into a [`BoxTree`]: a viewport
//! box at the root, one box per displayed element or text node below it,
//! and the anonymous boxes CSS requires around mixed content and table
//! parts. Boxes get their creation-order ordinals from the arena.

use std::sync::Arc;

use boxkit_css::{ComputedStyle, Display, Float, Length, Position};
use boxkit_image::{resolve_url, ImageCache, ImageLoader};
use tracing::{debug, trace, warn};

use crate::background::BackgroundImage;
use crate::config::LayoutConfig;
use crate::context::{FontSpec, TextMeasurer, VisualContext};
use crate::flex::{FlexData, FlexItem};
use crate::intrinsic;
use crate::replaced::{ReplacedContent, ReplacedData};
use crate::table::{self, TableCellData, TableColumn, TableData, TableWrapperData};
use crate::text::TextData;
use crate::tree::{BoxId, BoxKind, BoxTree, LayoutBox, NodeId};
use crate::{LayoutError, Size};

/// A node of the styled document tree.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        style: ComputedStyle,
        children: Vec<StyledNode>,
    },
    Text(String),
}

impl StyledNode {
    pub fn element(tag: impl Into<String>, style: ComputedStyle) -> Self {
        StyledNode::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            style,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        StyledNode::Text(text.into())
    }

    /// Add an attribute; text nodes are returned unchanged.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let StyledNode::Element { attributes, .. } = &mut self {
            attributes.push((name.into(), value.into()));
        }
        self
    }

    /// Append a child; text nodes are returned unchanged.
    pub fn with_child(mut self, child: StyledNode) -> Self {
        if let StyledNode::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new: impl IntoIterator<Item = StyledNode>) -> Self {
        if let StyledNode::Element { children, .. } = &mut self {
            children.extend(new);
        }
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            StyledNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            StyledNode::Text(_) => None,
        }
    }
}

/// Boxes the children of a new box refer to.
#[derive(Debug, Clone, Copy)]
struct Status {
    /// Parent the new box is appended to.
    parent: BoxId,
    /// Containing block of in-flow and floating boxes.
    contbox: BoxId,
    /// Containing block of absolutely positioned boxes.
    absbox: BoxId,
    viewport: BoxId,
}

/// Builds box trees from styled nodes.
pub struct BoxFactory {
    config: LayoutConfig,
    measurer: Arc<dyn TextMeasurer>,
    images: Arc<ImageCache>,
    loader: Arc<dyn ImageLoader>,
    next_node: usize,
}

impl BoxFactory {
    pub fn new(
        config: LayoutConfig,
        measurer: Arc<dyn TextMeasurer>,
        images: Arc<ImageCache>,
        loader: Arc<dyn ImageLoader>,
    ) -> Self {
        Self {
            config,
            measurer,
            images,
            loader,
            next_node: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Build the box tree of a document whose root element is `root`.
    ///
    /// The returned tree has the viewport as its root and the root element
    /// box as the only child of the viewport.
    pub fn build(&mut self, root: &StyledNode) -> Result<BoxTree, LayoutError> {
        if !matches!(root, StyledNode::Element { .. }) {
            return Err(LayoutError::InvalidNode(
                "the document root must be an element".to_string(),
            ));
        }
        self.next_node = 0;
        let size = Size::new(self.config.viewport_width, self.config.viewport_height);
        let mut tree = BoxTree::new(size);

        let ctx = VisualContext::new(
            Arc::clone(&self.measurer),
            FontSpec::new(self.config.default_font_family.clone(), self.config.default_font_size),
            size,
        );
        let mut vp_style = ComputedStyle::new();
        vp_style.display = Display::Block;
        let mut vp = LayoutBox::new(BoxKind::Viewport, vp_style, ctx);
        vp.tag = Some("viewport".to_string());
        vp.anonymous = true;
        let viewport = tree.push(vp);
        tree.set_root(viewport);

        let status = Status {
            parent: viewport,
            contbox: viewport,
            absbox: viewport,
            viewport,
        };
        if let Some(root_box) = self.create_subtree(&mut tree, root, status) {
            tree[root_box].is_root = true;
            // the canvas takes the background of the root element
            if tree[viewport].background.is_none() {
                tree[viewport].background = tree[root_box].background.clone();
            }
        }
        normalize_block_children(&mut tree, viewport);
        debug!(boxes = tree.len(), nodes = self.next_node, "box tree created");
        Ok(tree)
    }

    fn create_subtree(
        &mut self,
        tree: &mut BoxTree,
        node: &StyledNode,
        st: Status,
    ) -> Option<BoxId> {
        let node_id = NodeId(self.next_node);
        self.next_node += 1;
        match node {
            StyledNode::Text(raw) => self.create_text(tree, raw, node_id, st),
            StyledNode::Element {
                tag,
                style,
                children,
                ..
            } => {
                let id = self.create_element(tree, node, tag, style, node_id, st);
                if tree[id].displayed && !tree[id].kind.is_replaced() {
                    let inner = match &tree[id].kind {
                        BoxKind::TableWrapper(data) => data.table.unwrap_or(id),
                        _ => id,
                    };
                    let b = &tree[inner];
                    let child_st = Status {
                        parent: inner,
                        contbox: if matches!(b.kind, BoxKind::Inline) { st.contbox } else { inner },
                        absbox: if b.position.is_positioned() { inner } else { st.absbox },
                        viewport: st.viewport,
                    };
                    for child in children {
                        self.create_subtree(tree, child, child_st);
                    }
                    self.finish_element(tree, id, inner);
                }
                tree.append_child(st.parent, id);
                Some(id)
            }
        }
    }

    fn create_text(
        &mut self,
        tree: &mut BoxTree,
        raw: &str,
        node: NodeId,
        st: Status,
    ) -> Option<BoxId> {
        let parent = &tree[st.parent];
        let mut style = ComputedStyle::inherit_from(&parent.style);
        style.display = Display::Inline;
        if raw.trim().is_empty() && style.white_space.collapses_spaces() {
            let prev = parent.sub_boxes().iter().rev().find(|&&c| tree[c].is_in_flow());
            let after_space = match prev {
                None => true,
                Some(&prev) => tree[prev].is_block || intrinsic::ends_with_whitespace(tree, prev),
            };
            if after_space {
                trace!(node = node.0, "collapsed whitespace node dropped");
                return None;
            }
        }
        let ctx = parent.ctx.clone();
        let data = TextData::new(raw, style.white_space, &ctx);
        let mut b = LayoutBox::new(BoxKind::Text(data), style, ctx);
        b.node = Some(node);
        b.containing_block = Some(st.contbox);
        let id = tree.push(b);
        tree.append_child(st.parent, id);
        Some(id)
    }

    fn create_element(
        &mut self,
        tree: &mut BoxTree,
        node: &StyledNode,
        tag: &str,
        style: &ComputedStyle,
        node_id: NodeId,
        st: Status,
    ) -> BoxId {
        let in_flex = matches!(tree[st.parent].kind, BoxKind::Flex(_));
        let mut style = style.clone();
        if in_flex {
            style.float = Float::None;
            style.display = style.display.blockified();
        } else if style.float != Float::None || style.position.is_out_of_flow() {
            style.display = style.display.blockified();
        }
        if style.display.is_table_part()
            && !accepts_table_part(&tree[st.parent].kind, style.display)
        {
            debug!(tag, display = ?style.display, "table part outside a table treated as a block");
            style.display = Display::Block;
        }
        let ctx = tree[st.parent].ctx.derive(&style);

        let kind = if tag.eq_ignore_ascii_case("img") {
            BoxKind::Replaced(self.replaced_data(node, &style))
        } else {
            match style.display {
                Display::Inline => BoxKind::Inline,
                Display::InlineBlock => BoxKind::InlineBlock,
                Display::ListItem => BoxKind::ListItem,
                Display::Flex | Display::InlineFlex => BoxKind::Flex(FlexData::new(&style)),
                Display::Table | Display::InlineTable => {
                    BoxKind::TableWrapper(TableWrapperData::default())
                }
                Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup => {
                    BoxKind::TableBody(Default::default())
                }
                Display::TableRow => BoxKind::TableRow(Default::default()),
                Display::TableCell => BoxKind::TableCell(TableCellData::new(
                    attr_count(node, "colspan"),
                    attr_count(node, "rowspan"),
                )),
                Display::TableCaption => BoxKind::TableCaption,
                Display::TableColumn => BoxKind::TableColumn(column_spec(node, &style)),
                Display::TableColumnGroup => BoxKind::TableColumnGroup(column_spec(node, &style)),
                Display::Block | Display::None => BoxKind::Block,
            }
        };

        let containing_block = match style.position {
            Position::Absolute => st.absbox,
            Position::Fixed => st.viewport,
            _ => st.contbox,
        };
        let background = self.background_image(&style);
        let is_wrapper = matches!(kind, BoxKind::TableWrapper(_));
        let table_style = is_wrapper.then(|| grid_style(&style));

        let mut b = LayoutBox::new(kind, style, ctx);
        b.node = Some(node_id);
        b.tag = Some(tag.to_ascii_lowercase());
        b.containing_block = Some(containing_block);
        if in_flex && !b.is_positioned() {
            b.flex_item = Some(FlexItem::new(&b.style));
        }
        if !is_wrapper {
            b.background = background.clone();
        }
        let id = tree.push(b);

        if let Some(table_style) = table_style {
            let mut t = LayoutBox::new(
                BoxKind::Table(TableData::default()),
                table_style,
                tree[id].ctx.clone(),
            );
            t.node = Some(node_id);
            t.tag = tree[id].tag.clone();
            t.containing_block = Some(containing_block);
            t.background = background;
            let table = tree.push(t);
            tree.append_child(id, table);
            if let BoxKind::TableWrapper(data) = &mut tree[id].kind {
                data.table = Some(table);
            }
        }
        trace!(box_id = id.index(), tag, kind = tree[id].kind.name(), "element box created");
        id
    }

    /// Normalize the children of a finished element.
    fn finish_element(&mut self, tree: &mut BoxTree, id: BoxId, inner: BoxId) {
        if matches!(tree[id].kind, BoxKind::Inline) {
            let blocks =
                tree[id].children.iter().any(|&c| tree[c].is_block && tree[c].is_in_flow());
            if blocks {
                debug!(box_id = id.index(), "inline box with block content promoted to a block");
                let b = &mut tree[id];
                b.kind = BoxKind::Block;
                b.is_block = true;
                for child in tree[id].children.clone() {
                    if tree[child].is_in_flow() || tree[child].is_floating() {
                        tree[child].containing_block = Some(id);
                    }
                }
            }
        }
        let wrapper = matches!(tree[id].kind, BoxKind::TableWrapper(_));
        let container = tree[inner].kind.is_block_container()
            || matches!(tree[inner].kind, BoxKind::Flex(_));
        if wrapper {
            table::organize(tree, id);
        } else if container {
            normalize_block_children(tree, inner);
        }
    }

    fn replaced_data(&self, node: &StyledNode, style: &ComputedStyle) -> ReplacedData {
        let block = !matches!(style.display, Display::Inline | Display::InlineBlock);
        let url = node
            .attr("src")
            .and_then(|src| match resolve_url(self.config.base_url.as_ref(), src) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(src, error = %err, "invalid image source");
                    None
                }
            });
        let content = match url {
            Some(url) if self.config.load_images => {
                match self.images.get_or_load(&url, self.loader.as_ref()) {
                    Ok(image) => ReplacedContent::Image { url, image },
                    Err(_) => ReplacedContent::Missing { url: Some(url) },
                }
            }
            url => ReplacedContent::Missing { url },
        };
        let mut data = ReplacedData::new(block, content);
        data.attr_width = node.attr("width").and_then(parse_pixels);
        data.attr_height = node.attr("height").and_then(parse_pixels);
        data
    }

    fn background_image(&self, style: &ComputedStyle) -> Option<BackgroundImage> {
        if !self.config.load_backgrounds {
            return None;
        }
        let reference = style.background_image.as_deref()?;
        let url = match resolve_url(self.config.base_url.as_ref(), reference) {
            Ok(url) => url,
            Err(err) => {
                warn!(reference, error = %err, "invalid background image URL");
                return None;
            }
        };
        match self.images.get_or_load(&url, self.loader.as_ref()) {
            Ok(image) => Some(BackgroundImage::new(url, image, style)),
            Err(_) => None,
        }
    }
}

/// Whether a box of `kind` may directly hold a table part with `display`.
fn accepts_table_part(kind: &BoxKind, display: Display) -> bool {
    match kind {
        BoxKind::Table(_) => true,
        BoxKind::TableBody(_) => matches!(display, Display::TableRow | Display::TableCell),
        BoxKind::TableRow(_) => display == Display::TableCell,
        BoxKind::TableColumnGroup(_) => display == Display::TableColumn,
        _ => false,
    }
}

/// Style of the table grid inside its wrapper: the wrapper takes the
/// position, float and margins.
fn grid_style(style: &ComputedStyle) -> ComputedStyle {
    let mut grid = style.clone();
    grid.position = Position::Static;
    grid.float = Float::None;
    grid.top = Length::Auto;
    grid.right = Length::Auto;
    grid.bottom = Length::Auto;
    grid.left = Length::Auto;
    grid.margin_top = Length::Zero;
    grid.margin_right = Length::Zero;
    grid.margin_bottom = Length::Zero;
    grid.margin_left = Length::Zero;
    grid
}

fn attr_count(node: &StyledNode, name: &str) -> usize {
    node.attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Column width from the `width` attribute, else from the style.
fn column_spec(node: &StyledNode, style: &ComputedStyle) -> TableColumn {
    let attr = node.attr("width").and_then(|v| {
        let v = v.trim();
        match v.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f32>().ok().map(Length::Percent),
            None => parse_pixels(v).map(Length::Px),
        }
    });
    let specified = attr.or(match style.width {
        Length::Auto => None,
        len => Some(len),
    });
    TableColumn::new(attr_count(node, "span"), specified)
}

fn parse_pixels(value: &str) -> Option<f32> {
    let v = value.trim();
    v.strip_suffix("px").unwrap_or(v).trim().parse::<f32>().ok()
}

/// Wrap runs of inline-level children of `id` into anonymous blocks when
/// `id` also holds in-flow blocks (or is a flex container, whose items are
/// all blocks). Runs made of whitespace only are dropped.
pub(crate) fn normalize_block_children(tree: &mut BoxTree, id: BoxId) {
    let children = tree[id].children.clone();
    let flex = matches!(tree[id].kind, BoxKind::Flex(_));
    tree[id].block.any_in_flow = children.iter().any(|&c| tree[c].is_in_flow());
    let contains_blocks =
        flex || children.iter().any(|&c| tree[c].is_block && tree[c].is_in_flow());
    tree[id].block.contains_blocks = contains_blocks;
    if !contains_blocks {
        remove_trailing_whitespace(tree, id);
        return;
    }

    let mut nest = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if tree[child].is_block {
            wrap_inline_run(tree, id, &mut run, &mut nest);
            nest.push(child);
        } else if !run.is_empty() || !intrinsic::is_whitespace(tree, child) {
            run.push(child);
        }
    }
    wrap_inline_run(tree, id, &mut run, &mut nest);
    tree.set_children(id, nest);
}

fn wrap_inline_run(tree: &mut BoxTree, parent: BoxId, run: &mut Vec<BoxId>, nest: &mut Vec<BoxId>) {
    if run.is_empty() {
        return;
    }
    let boxes = std::mem::take(run);
    if boxes.iter().all(|&b| intrinsic::is_whitespace(tree, b)) {
        return;
    }
    let p = &tree[parent];
    let style = ComputedStyle::anonymous(&p.style, Display::Block);
    let mut b = LayoutBox::new(BoxKind::Block, style, p.ctx.clone());
    b.anonymous = true;
    b.node = p.node;
    b.containing_block = Some(parent);
    if matches!(p.kind, BoxKind::Flex(_)) {
        b.flex_item = Some(FlexItem::new(&b.style));
    }
    b.block.any_in_flow = true;
    let anon = tree.push(b);
    for &child in &boxes {
        if !tree[child].is_positioned() {
            tree[child].containing_block = Some(anon);
        }
    }
    tree.set_children(anon, boxes);
    tree[anon].parent = Some(parent);
    remove_trailing_whitespace(tree, anon);
    trace!(parent = parent.index(), anonymous = anon.index(), "anonymous block created");
    nest.push(anon);
}

/// Drop trailing collapsible whitespace of an inline formatting context.
fn remove_trailing_whitespace(tree: &mut BoxTree, id: BoxId) {
    if !tree[id].collapses_spaces() {
        return;
    }
    let mut children = tree[id].children.clone();
    while let Some(&last) = children.last() {
        let c = &tree[last];
        if !c.is_in_flow() || c.is_block || !c.collapses_spaces() {
            break;
        }
        if c.kind.is_text() && intrinsic::is_whitespace(tree, last) {
            children.pop();
            continue;
        }
        if matches!(c.kind, BoxKind::Inline) {
            remove_trailing_whitespace(tree, last);
        }
        break;
    }
    if children.len() != tree[id].children.len() {
        tree.set_children(id, children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MonospaceMeasurer;
    use boxkit_image::{DecodedImage, StaticImageLoader};
    use url::Url;

    fn style(css: &str) -> ComputedStyle {
        let mut s = ComputedStyle::new();
        s.apply_declarations(css).expect("valid declarations");
        s
    }

    fn factory(loader: StaticImageLoader) -> BoxFactory {
        BoxFactory::new(
            LayoutConfig::with_viewport(800.0, 600.0),
            Arc::new(MonospaceMeasurer::default()),
            ImageCache::shared(),
            Arc::new(loader),
        )
    }

    fn kinds(tree: &BoxTree, id: BoxId) -> Vec<&'static str> {
        tree[id].children.iter().map(|&c| tree[c].kind.name()).collect()
    }

    #[test]
    fn test_viewport_wraps_root_element() {
        let doc = StyledNode::element("html", style("display: block"));
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let vp = tree.root().expect("root");
        assert!(matches!(tree[vp].kind, BoxKind::Viewport));
        let root = tree[vp].children[0];
        assert!(tree[root].is_root);
        assert_eq!(tree[root].containing_block, Some(vp));
        assert!(tree[vp].order < tree[root].order);
    }

    #[test]
    fn test_text_root_is_rejected() {
        let err = factory(StaticImageLoader::new()).build(&StyledNode::text("x"));
        assert!(matches!(err, Err(LayoutError::InvalidNode(_))));
    }

    #[test]
    fn test_mixed_content_gets_anonymous_blocks() {
        let doc = StyledNode::element("div", style("display: block")).with_children([
            StyledNode::text("before"),
            StyledNode::element("p", style("display: block")).with_child(StyledNode::text("para")),
            StyledNode::text("   "),
            StyledNode::element("span", style("display: inline"))
                .with_child(StyledNode::text("after")),
        ]);
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let div = tree[tree.root().expect("root")].children[0];
        assert_eq!(kinds(&tree, div), vec!["block", "block", "block"]);
        let first = tree[div].children[0];
        assert!(tree[first].anonymous);
        assert!(tree[div].block.contains_blocks);
        assert!(!tree[first].block.contains_blocks);
        let last = tree[div].children[2];
        assert_eq!(kinds(&tree, last), vec!["inline"]);
    }

    #[test]
    fn test_floats_are_blockified() {
        let doc = StyledNode::element("div", style("display: block"))
            .with_child(
                StyledNode::element("span", style("float: left")).with_child(StyledNode::text("f")),
            );
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let div = tree[tree.root().expect("root")].children[0];
        let span = tree[div].children[0];
        assert!(tree[span].is_block);
        assert!(tree[span].is_floating());
        // a float is not in flow, so the div keeps inline content
        assert!(!tree[div].block.contains_blocks);
    }

    #[test]
    fn test_image_boxes_use_the_cache() {
        let url = Url::parse("https://example.com/a.png").expect("url");
        let loader =
            StaticImageLoader::new().with_image(url.clone(), DecodedImage::new(40.0, 30.0));
        let doc = StyledNode::element("p", style("display: block")).with_children([
            StyledNode::element("img", style("display: inline"))
                .with_attr("src", "https://example.com/a.png"),
            StyledNode::element("img", style("display: inline"))
                .with_attr("src", "https://example.com/missing.png"),
        ]);
        let tree = factory(loader).build(&doc).expect("tree");
        let p = tree[tree.root().expect("root")].children[0];
        let ok = tree[tree[p].children[0]].kind.replaced().expect("replaced");
        assert_eq!(
            ok.content,
            ReplacedContent::Image { url, image: DecodedImage::new(40.0, 30.0) }
        );
        let missing = tree[tree[p].children[1]].kind.replaced().expect("replaced");
        assert!(!missing.content.is_loaded());
    }

    #[test]
    fn test_flex_children_become_items() {
        let doc = StyledNode::element("div", style("display: flex")).with_children([
            StyledNode::element("span", style("display: inline; float: right"))
                .with_child(StyledNode::text("a")),
            StyledNode::text("loose text"),
            StyledNode::element("div", style("display: block; position: absolute")),
        ]);
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let flex = tree[tree.root().expect("root")].children[0];
        let children = tree[flex].children.clone();
        assert_eq!(children.len(), 3);
        assert!(tree[children[0]].flex_item.is_some());
        assert!(!tree[children[0]].is_floating());
        assert!(tree[children[1]].anonymous && tree[children[1]].flex_item.is_some());
        assert!(tree[children[2]].flex_item.is_none());
    }

    #[test]
    fn test_table_gets_wrapper_and_anonymous_parts() {
        let doc = StyledNode::element("table", style("display: table")).with_children([
            StyledNode::element("caption", style("display: table-caption")),
            StyledNode::element("td", style("display: table-cell"))
                .with_attr("colspan", "2")
                .with_child(StyledNode::text("x")),
        ]);
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let wrapper = tree[tree.root().expect("root")].children[0];
        assert_eq!(kinds(&tree, wrapper), vec!["table-caption", "table"]);
        let table = tree[wrapper].children[1];
        assert_eq!(kinds(&tree, table), vec!["table-row-group"]);
        let body = tree[table].children[0];
        let row = tree[body].children[0];
        let cell = tree[row].children[0];
        assert_eq!(tree[cell].kind.cell().map(|c| c.colspan), Some(2));
    }

    #[test]
    fn test_orphan_table_cell_is_a_block() {
        let doc = StyledNode::element("div", style("display: block"))
            .with_child(StyledNode::element("td", style("display: table-cell")));
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let div = tree[tree.root().expect("root")].children[0];
        assert_eq!(kinds(&tree, div), vec!["block"]);
    }

    #[test]
    fn test_display_none_has_no_children() {
        let doc = StyledNode::element("div", style("display: block")).with_child(
            StyledNode::element("div", style("display: none"))
                .with_child(StyledNode::text("hidden")),
        );
        let tree = factory(StaticImageLoader::new()).build(&doc).expect("tree");
        let div = tree[tree.root().expect("root")].children[0];
        let hidden = tree[div].children[0];
        assert!(!tree[hidden].displayed);
        assert!(tree[hidden].children.is_empty());
    }
}

//! Box tree arena.
//!
//! Every box of one layout pass lives in a [`BoxTree`] and is addressed by a
//! [`BoxId`]. A parent owns its children through its `children` list; the
//! child keeps a plain back-reference to the parent. Continuation boxes
//! created by line breaking are ordinary arena nodes flagged as `splitted`.

use std::ops::{Index, IndexMut};

use boxkit_css::{
    Clear, ComputedStyle, Display, Float, Position, VerticalAlign, Visibility, WhiteSpace,
};
use tracing::trace;

use crate::background::BackgroundImage;
use crate::context::VisualContext;
use crate::flex::{FlexData, FlexItem};
use crate::float_list::{FloatList, FloatListId};
use crate::line_box::LineBox;
use crate::replaced::ReplacedData;
use crate::table::{
    TableBodyData, TableCellData, TableColumn, TableData, TableRowData, TableWrapperData,
};
use crate::text::TextData;
use crate::{EdgeSizes, Rect, Size};

/// Handle of a box in a [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub(crate) usize);

impl BoxId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of the styled node a box was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Box variant with its kind-specific state.
#[derive(Debug, Clone)]
pub enum BoxKind {
    /// Root box representing the initial containing block.
    Viewport,
    Block,
    ListItem,
    InlineBlock,
    Inline,
    Text(TextData),
    Replaced(ReplacedData),
    TableWrapper(TableWrapperData),
    Table(TableData),
    TableBody(TableBodyData),
    TableRow(TableRowData),
    TableCell(TableCellData),
    TableCaption,
    TableColumn(TableColumn),
    TableColumnGroup(TableColumn),
    Flex(FlexData),
}

impl BoxKind {
    /// Short name used in logs and geometry dumps.
    pub fn name(&self) -> &'static str {
        match self {
            BoxKind::Viewport => "viewport",
            BoxKind::Block => "block",
            BoxKind::ListItem => "list-item",
            BoxKind::InlineBlock => "inline-block",
            BoxKind::Inline => "inline",
            BoxKind::Text(_) => "text",
            BoxKind::Replaced(_) => "replaced",
            BoxKind::TableWrapper(_) => "table-wrapper",
            BoxKind::Table(_) => "table",
            BoxKind::TableBody(_) => "table-row-group",
            BoxKind::TableRow(_) => "table-row",
            BoxKind::TableCell(_) => "table-cell",
            BoxKind::TableCaption => "table-caption",
            BoxKind::TableColumn(_) => "table-column",
            BoxKind::TableColumnGroup(_) => "table-column-group",
            BoxKind::Flex(_) => "flex",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, BoxKind::Text(_))
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self, BoxKind::Replaced(_))
    }

    /// Kinds laid out by the block layout manager.
    pub fn is_block_container(&self) -> bool {
        matches!(
            self,
            BoxKind::Viewport
                | BoxKind::Block
                | BoxKind::ListItem
                | BoxKind::InlineBlock
                | BoxKind::TableCell(_)
                | BoxKind::TableCaption
        )
    }

    pub fn text(&self) -> Option<&TextData> {
        match self {
            BoxKind::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextData> {
        match self {
            BoxKind::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn replaced(&self) -> Option<&ReplacedData> {
        match self {
            BoxKind::Replaced(data) => Some(data),
            _ => None,
        }
    }

    pub fn cell(&self) -> Option<&TableCellData> {
        match self {
            BoxKind::TableCell(data) => Some(data),
            _ => None,
        }
    }

    pub fn flex(&self) -> Option<&FlexData> {
        match self {
            BoxKind::Flex(data) => Some(data),
            _ => None,
        }
    }
}

/// Resolved minimum and maximum content sizes; `None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeLimits {
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
}

impl SizeLimits {
    pub fn clamp_width(&self, width: f32) -> f32 {
        let mut w = width;
        if let Some(max) = self.max_width {
            w = w.min(max);
        }
        if let Some(min) = self.min_width {
            w = w.max(min);
        }
        w
    }

    pub fn clamp_height(&self, height: f32) -> f32 {
        let mut h = height;
        if let Some(max) = self.max_height {
            h = h.min(max);
        }
        if let Some(min) = self.min_height {
            h = h.max(min);
        }
        h
    }
}

/// Flags produced by width and height computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizingFlags {
    /// Width given explicitly.
    pub wset: bool,
    /// Height given explicitly.
    pub hset: bool,
    /// Explicit width is a percentage.
    pub wrelative: bool,
    /// The width has been computed by a layout at least once.
    pub width_computed: bool,
    pub mleft_auto: bool,
    pub mright_auto: bool,
    pub left_set: bool,
    pub right_set: bool,
    pub top_set: bool,
    pub bottom_set: bool,
    /// Horizontal position comes from the static position.
    pub left_static: bool,
    /// Vertical position comes from the static position.
    pub top_static: bool,
}

/// The line a box was placed on, needed to place `top`/`bottom` aligned boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSlot {
    /// Block that owns the line.
    pub owner: BoxId,
    /// Line top in the owner's content coordinates.
    pub y: f32,
    /// Maximal box height on the line.
    pub height: f32,
}

/// Line participation state of inline-level boxes.
#[derive(Debug, Clone, Default)]
pub struct InlineState {
    /// Distance from the top of the box to its baseline.
    pub baseline_offset: f32,
    pub below_baseline: f32,
    pub max_line_height: f32,
    /// Offset of the content box from the top of the box's own line box.
    pub linebox_offset: f32,
    pub half_lead: f32,
    pub finished_by_line_break: bool,
    /// Nothing but collapsed whitespace was placed.
    pub collapsed: bool,
    pub ignore_initial_ws: bool,
    /// Internal line of an inline element; holds its ascent and descent.
    pub line: Option<LineBox>,
    pub slot: Option<LineSlot>,
}

/// Block container state.
#[derive(Debug, Clone, Default)]
pub struct BlockState {
    /// All in-flow children are block-level.
    pub contains_blocks: bool,
    /// Some child participates in the flow.
    pub any_in_flow: bool,
    pub float_left: Option<FloatListId>,
    pub float_right: Option<FloatListId>,
    /// Offset of the content box from the left float list origin.
    pub float_xl: f32,
    /// Offset of the content box from the right float list origin.
    pub float_xr: f32,
    /// Offset of the content box from the float list top.
    pub float_y: f32,
    /// The list this box was added to when floating.
    pub float_owner: Option<FloatListId>,
    pub width_adjust: f32,
    pub indent: f32,
    /// Metrics the first line starts with, inherited from enclosing blocks.
    pub first_line: Option<LineBox>,
    /// Where an absolutely positioned box would have been in the flow, in
    /// the content coordinates of its parent.
    pub static_position: Option<(f32, f32)>,
    /// Baseline of an inline-block, from its top margin edge.
    pub baseline: f32,
}

/// One box of the tree.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub kind: BoxKind,
    pub style: ComputedStyle,
    pub ctx: VisualContext,
    pub node: Option<NodeId>,
    pub tag: Option<String>,
    pub parent: Option<BoxId>,
    pub containing_block: Option<BoxId>,
    pub children: Vec<BoxId>,
    pub start_child: usize,
    pub end_child: usize,
    /// End of the child range before any line breaking truncated it.
    pub end_limit: usize,
    /// Creation order, shared by continuations of the same box.
    pub order: u32,
    pub anonymous: bool,
    /// Block-level box (as opposed to inline-level).
    pub is_block: bool,
    pub displayed: bool,
    pub visible: bool,
    pub is_root: bool,
    pub position: Position,
    pub float: Float,
    pub clear: Clear,
    pub splitted: bool,
    pub split_id: u32,
    /// Margin box relative to the parent's content box.
    pub bounds: Rect,
    pub content: Size,
    pub margin: EdgeSizes,
    /// Effective margins after collapsing.
    pub emargin: EdgeSizes,
    /// Margins as declared, before auto margins were resolved.
    pub decl_margin: EdgeSizes,
    pub border: EdgeSizes,
    pub padding: EdgeSizes,
    /// Resolved `top`/`right`/`bottom`/`left`.
    pub coords: EdgeSizes,
    /// Margin box in document coordinates.
    pub abs_bounds: Rect,
    pub avail_width: f32,
    pub limits: SizeLimits,
    pub flags: SizingFlags,
    pub line_height: f32,
    pub inline: InlineState,
    pub block: BlockState,
    pub flex_item: Option<FlexItem>,
    pub background: Option<BackgroundImage>,
}

impl LayoutBox {
    pub fn new(kind: BoxKind, style: ComputedStyle, ctx: VisualContext) -> Self {
        let displayed = style.display != Display::None;
        let mut position = style.position;
        let mut float = style.float;
        if !displayed {
            position = Position::Static;
            float = Float::None;
        } else if position.is_out_of_flow() {
            float = Float::None;
        }
        let is_block = match &kind {
            BoxKind::Inline | BoxKind::InlineBlock | BoxKind::Text(_) => false,
            BoxKind::Replaced(data) => data.block,
            _ => true,
        };
        let line_height = ctx.line_height(style.line_height);
        Self {
            kind,
            visible: style.visibility == Visibility::Visible,
            clear: style.clear,
            style,
            ctx,
            node: None,
            tag: None,
            parent: None,
            containing_block: None,
            children: Vec::new(),
            start_child: 0,
            end_child: 0,
            end_limit: 0,
            order: 0,
            anonymous: false,
            is_block,
            displayed,
            is_root: false,
            position,
            float,
            splitted: false,
            split_id: 0,
            bounds: Rect::zero(),
            content: Size::zero(),
            margin: EdgeSizes::default(),
            emargin: EdgeSizes::default(),
            decl_margin: EdgeSizes::default(),
            border: EdgeSizes::default(),
            padding: EdgeSizes::default(),
            coords: EdgeSizes::default(),
            abs_bounds: Rect::zero(),
            avail_width: 0.0,
            limits: SizeLimits::default(),
            flags: SizingFlags::default(),
            line_height,
            inline: InlineState::default(),
            block: BlockState::default(),
            flex_item: None,
            background: None,
        }
    }

    /// Child ids of the current range.
    pub fn sub_boxes(&self) -> &[BoxId] {
        let end = self.end_child.min(self.children.len());
        let start = self.start_child.min(end);
        &self.children[start..end]
    }

    pub fn is_floating(&self) -> bool {
        self.displayed && self.float != Float::None
    }

    /// Absolutely or fixed positioned.
    pub fn is_positioned(&self) -> bool {
        self.displayed && self.position.is_out_of_flow()
    }

    pub fn is_in_flow(&self) -> bool {
        match self.kind {
            BoxKind::Text(_) | BoxKind::Inline => self.displayed,
            _ => self.displayed && self.float == Float::None && !self.position.is_out_of_flow(),
        }
    }

    pub fn is_relative(&self) -> bool {
        self.position == Position::Relative
    }

    /// Inline-level box participating in line layout.
    pub fn is_inline_level(&self) -> bool {
        !self.is_block
    }

    pub fn is_element(&self) -> bool {
        !self.kind.is_text()
    }

    pub fn white_space(&self) -> WhiteSpace {
        self.style.white_space
    }

    pub fn vertical_align(&self) -> VerticalAlign {
        self.style.vertical_align
    }

    pub fn collapses_spaces(&self) -> bool {
        self.style.white_space.collapses_spaces()
    }

    pub fn preserves_line_breaks(&self) -> bool {
        self.style.white_space.preserves_line_breaks()
    }

    pub fn allows_wrapping(&self) -> bool {
        self.style.white_space.allows_wrapping()
    }

    pub fn has_fixed_width(&self) -> bool {
        match self.kind {
            BoxKind::Replaced(_) => true,
            BoxKind::Viewport => true,
            BoxKind::InlineBlock | BoxKind::TableCell(_) | BoxKind::Table(_) => self.flags.wset,
            _ if self.is_block => {
                self.flags.wset
                    || self.is_in_flow()
                    || (self.is_positioned()
                        && !self.flags.mleft_auto
                        && !self.flags.mright_auto
                        && self.flags.left_set
                        && self.flags.right_set)
            }
            _ => false,
        }
    }

    pub fn has_fixed_height(&self) -> bool {
        match self.kind {
            BoxKind::Replaced(_) | BoxKind::Viewport => true,
            _ => self.flags.hset,
        }
    }

    pub fn width(&self) -> f32 {
        self.bounds.width
    }

    pub fn height(&self) -> f32 {
        self.bounds.height
    }

    pub fn total_width(&self) -> f32 {
        self.emargin.horizontal()
            + self.border.horizontal()
            + self.padding.horizontal()
            + self.content.width
    }

    /// Total height; an empty block with no borders or padding collapses to its larger margin.
    pub fn total_height(&self) -> f32 {
        if self.is_block
            && !self.kind.is_replaced()
            && self.border.vertical() == 0.0
            && self.padding.vertical() == 0.0
            && self.content.height == 0.0
        {
            self.emargin.top.max(self.emargin.bottom)
        } else {
            self.emargin.vertical()
                + self.border.vertical()
                + self.padding.vertical()
                + self.content.height
        }
    }

    pub fn content_offset_x(&self) -> f32 {
        self.emargin.left + self.border.left + self.padding.left
    }

    pub fn content_offset_y(&self) -> f32 {
        self.emargin.top + self.border.top + self.padding.top
    }

    /// Content box X relative to the parent's content box.
    pub fn content_x(&self) -> f32 {
        self.bounds.x + self.content_offset_x()
    }

    pub fn content_y(&self) -> f32 {
        self.bounds.y + self.content_offset_y()
    }

    pub fn abs_content_x(&self) -> f32 {
        self.abs_bounds.x + self.content_offset_x()
    }

    pub fn abs_content_y(&self) -> f32 {
        self.abs_bounds.y + self.content_offset_y()
    }

    pub fn abs_content_box(&self) -> Rect {
        Rect::new(
            self.abs_content_x(),
            self.abs_content_y(),
            self.content.width,
            self.content.height,
        )
    }

    pub fn abs_padding_box(&self) -> Rect {
        self.abs_content_box().expand(&self.padding)
    }

    pub fn abs_border_box(&self) -> Rect {
        self.abs_padding_box().expand(&self.border)
    }

    /// Border box relative to the parent's content box.
    pub fn border_box(&self) -> Rect {
        Rect::new(self.content_x(), self.content_y(), self.content.width, self.content.height)
            .expand(&self.padding)
            .expand(&self.border)
    }

    /// Width left for the content when the box is offered `avail_width`.
    pub fn available_content_width(&self) -> f32 {
        let ret = self.avail_width
            - self.margin.horizontal()
            - self.border.horizontal()
            - self.padding.horizontal();
        match self.limits.max_width {
            Some(max) if self.is_block && ret > max => max,
            _ => ret,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.bounds.width = width;
        self.bounds.height = height;
    }

    pub fn move_right(&mut self, dx: f32) {
        self.bounds.x += dx;
    }

    pub fn move_down(&mut self, dy: f32) {
        self.bounds.y += dy;
    }

    /// Set the content width honoring min/max limits.
    pub fn set_content_width(&mut self, width: f32) {
        self.content.width = self.limits.clamp_width(width);
    }

    /// Set the content height honoring min/max limits.
    pub fn set_content_height(&mut self, height: f32) {
        self.content.height = self.limits.clamp_height(height);
    }

    /// Narrow (negative) or restore the width by the space taken by floats.
    pub fn set_width_adjust(&mut self, adjust: f32) {
        if !self.flags.wset {
            let w = self.content.width - self.block.width_adjust + adjust;
            self.set_content_width(w);
        }
        self.block.width_adjust = adjust;
    }

    /// Relative position offset.
    pub fn relative_offset(&self) -> (f32, f32) {
        let dx = if self.flags.left_set { self.coords.left } else { -self.coords.right };
        let dy = if self.flags.top_set { self.coords.top } else { -self.coords.bottom };
        (dx, dy)
    }

    /// Floats stay inside the box unless its overflow is visible.
    pub fn encloses_floats(&self) -> bool {
        self.style.overflow_x.clips_content()
            || self.style.overflow_y.clips_content()
            || self.float != Float::None
            || self.position.is_out_of_flow()
            || matches!(self.kind, BoxKind::InlineBlock | BoxKind::TableCell(_) | BoxKind::Viewport)
    }

    /// In-flow boxes that do not start a formatting context may overlap floats.
    pub fn may_overlap_floats(&self) -> bool {
        !self.style.overflow_x.clips_content()
            && !self.style.overflow_y.clips_content()
            && !matches!(
                self.kind,
                BoxKind::TableWrapper(_) | BoxKind::Flex(_) | BoxKind::Replaced(_)
            )
    }
}

/// Arena holding the boxes of one layout pass.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    boxes: Vec<LayoutBox>,
    root: Option<BoxId>,
    float_lists: Vec<FloatList>,
    next_order: u32,
    viewport: Size,
}

impl BoxTree {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    pub fn root(&self) -> Option<BoxId> {
        self.root
    }

    pub fn set_root(&mut self, id: BoxId) {
        self.root = Some(id);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        self.boxes.get_mut(id.0)
    }

    /// Add a box, assigning the next creation order.
    pub fn push(&mut self, mut layout_box: LayoutBox) -> BoxId {
        layout_box.order = self.next_order;
        self.next_order += 1;
        let id = BoxId(self.boxes.len());
        self.boxes.push(layout_box);
        id
    }

    pub fn append_child(&mut self, parent: BoxId, child: BoxId) {
        self[child].parent = Some(parent);
        let p = &mut self[parent];
        p.children.push(child);
        p.end_child = p.children.len();
        p.end_limit = p.end_child;
    }

    /// Replace the children of `parent`.
    pub fn set_children(&mut self, parent: BoxId, children: Vec<BoxId>) {
        for &child in &children {
            self[child].parent = Some(parent);
        }
        let p = &mut self[parent];
        p.children = children;
        p.start_child = 0;
        p.end_child = p.children.len();
        p.end_limit = p.end_child;
    }

    /// Point the children of the current range back to `id`.
    pub fn adopt_children(&mut self, id: BoxId) {
        let children = self[id].sub_boxes().to_vec();
        for child in children {
            self[child].parent = Some(id);
        }
    }

    /// Create a continuation of `id`: a shallow copy sharing the style and
    /// the child list, marked as splitted.
    pub fn copy_box(&mut self, id: BoxId) -> BoxId {
        let mut copy = self[id].clone();
        copy.splitted = true;
        copy.split_id += 1;
        copy.inline.line = None;
        copy.inline.slot = None;
        let new_id = BoxId(self.boxes.len());
        self.boxes.push(copy);
        trace!(source = id.0, copy = new_id.0, "continuation box created");
        new_id
    }

    pub fn new_float_list(&mut self, owner: BoxId) -> FloatListId {
        let id = FloatListId(self.float_lists.len());
        self.float_lists.push(FloatList::new(owner));
        id
    }

    pub fn float_list(&self, id: FloatListId) -> &FloatList {
        &self.float_lists[id.0]
    }

    pub fn float_list_mut(&mut self, id: FloatListId) -> &mut FloatList {
        &mut self.float_lists[id.0]
    }

    /// Iterate over all box ids in creation order of the arena.
    pub fn ids(&self) -> impl Iterator<Item = BoxId> {
        (0..self.boxes.len()).map(BoxId)
    }

    /// Size of the containing block of `id`.
    ///
    /// Absolutely positioned boxes use the padding box of their containing
    /// block, fixed boxes the viewport, everything else the content box.
    pub fn containing_block_size(&self, id: BoxId) -> Size {
        let b = &self[id];
        if b.position == Position::Fixed {
            return self.viewport;
        }
        match b.containing_block {
            Some(cb) => {
                let cbox = &self[cb];
                if b.position == Position::Absolute {
                    Size::new(
                        cbox.content.width + cbox.padding.horizontal(),
                        cbox.content.height + cbox.padding.vertical(),
                    )
                } else {
                    cbox.content
                }
            }
            None => self.viewport,
        }
    }

    /// Whether the containing block of `id` has a known height.
    pub fn containing_block_fixed_height(&self, id: BoxId) -> bool {
        match self[id].containing_block {
            Some(cb) => self[cb].has_fixed_height(),
            None => true,
        }
    }

    /// Whether the containing block may grow wider than offered.
    pub fn containing_block_can_grow(&self, id: BoxId) -> bool {
        match self[id].containing_block {
            Some(cb) => matches!(self[cb].kind, BoxKind::TableCell(_)),
            None => false,
        }
    }

    /// The nearest ancestor (or self) that is a block container.
    pub fn enclosing_block(&self, id: BoxId) -> Option<BoxId> {
        let mut cur = self[id].parent;
        while let Some(p) = cur {
            if self[p].kind.is_block_container()
                || matches!(self[p].kind, BoxKind::Flex(_) | BoxKind::TableWrapper(_))
            {
                return Some(p);
            }
            cur = self[p].parent;
        }
        None
    }
}

impl Index<BoxId> for BoxTree {
    type Output = LayoutBox;

    fn index(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.boxes[id.0]
    }
}

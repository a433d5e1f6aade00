//! # BoxKit CSS
//!
//! Resolved style values consumed by the BoxKit layout engine.
//!
//! Cascade and selector matching happen upstream; a [`ComputedStyle`] holds
//! the result for one element. Keyword properties are enums whose `Default`
//! is the CSS initial value, and [`ComputedStyle::inherit_from`] carries the
//! inherited properties to a child. [`ComputedStyle::apply_declarations`]
//! applies a `name: value; ...` list on top, which fixtures and tools use in
//! place of a stylesheet.

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while applying style declarations.
#[derive(Error, Debug, PartialEq)]
pub enum CssError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {property}: {value}")]
    InvalidValue { property: String, value: String },

    #[error("Unknown property: {0}")]
    UnknownProperty(String),
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 1.0,
    };

    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Whether painting this color has no visible effect.
    pub fn is_transparent(&self) -> bool {
        self.a == 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A specified length, resolved to pixels during layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Multiple of the element's font size.
    Em(f32),
    /// Multiple of the root font size.
    Rem(f32),
    /// Ex (relative to the x-height of the font).
    Ex(f32),
    /// Ch (relative to the advance of the "0" glyph).
    Ch(f32),
    /// Percentage of the reference length.
    Percent(f32),
    /// Hundredths of the viewport width.
    Vw(f32),
    /// Hundredths of the viewport height.
    Vh(f32),
    /// Auto.
    Auto,
    /// Zero.
    #[default]
    Zero,
}

impl Length {
    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, Length::Percent(_))
    }

    /// Compute the absolute pixel value for units that need no font metrics.
    ///
    /// `ex` and `ch` fall back to half an em; the layout engine resolves them
    /// against real font metrics instead.
    pub fn to_px(&self, font_size: f32, root_font_size: f32, container_size: f32) -> f32 {
        self.to_px_with_viewport(font_size, root_font_size, container_size, 0.0, 0.0)
    }

    /// Resolve to pixels, with vh/vw taken against the given viewport.
    pub fn to_px_with_viewport(
        &self,
        font_size: f32,
        root_font_size: f32,
        container_size: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> f32 {
        match self {
            Length::Px(px) => *px,
            Length::Em(em) => em * font_size,
            Length::Rem(rem) => rem * root_font_size,
            Length::Ex(ex) => ex * font_size * 0.5,
            Length::Ch(ch) => ch * font_size * 0.5,
            Length::Percent(pct) => pct / 100.0 * container_size,
            Length::Vw(vw) => vw / 100.0 * viewport_width,
            Length::Vh(vh) => vh / 100.0 * viewport_height,
            Length::Auto => 0.0, // Context-dependent
            Length::Zero => 0.0,
        }
    }
}

/// Outer and inner display type of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    Block,
    #[default]
    Inline,
    InlineBlock,
    ListItem,
    Flex,
    InlineFlex,
    Table,
    InlineTable,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
    TableColumn,
    TableColumnGroup,
    TableCaption,
    None,
}

impl Display {
    /// True for `flex` and `inline-flex`.
    pub fn is_flex(self) -> bool {
        matches!(self, Display::Flex | Display::InlineFlex)
    }

    /// Check if this is an inline-block.
    pub fn is_inline_block(self) -> bool {
        matches!(self, Display::InlineBlock)
    }

    /// Check if this is one of the internal table display values.
    pub fn is_table_part(self) -> bool {
        matches!(
            self,
            Display::TableRowGroup
                | Display::TableHeaderGroup
                | Display::TableFooterGroup
                | Display::TableRow
                | Display::TableCell
                | Display::TableColumn
                | Display::TableColumnGroup
                | Display::TableCaption
        )
    }

    /// Check if this is a row group (header, footer or body).
    pub fn is_row_group(self) -> bool {
        matches!(
            self,
            Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup
        )
    }

    /// The display value used when the box floats or is absolutely positioned
    /// (CSS 2.1 §9.7).
    pub fn blockified(self) -> Display {
        match self {
            Display::InlineTable => Display::Table,
            Display::InlineFlex => Display::Flex,
            Display::Inline
            | Display::InlineBlock
            | Display::TableRowGroup
            | Display::TableHeaderGroup
            | Display::TableFooterGroup
            | Display::TableRow
            | Display::TableCell
            | Display::TableColumn
            | Display::TableColumnGroup
            | Display::TableCaption => Display::Block,
            other => other,
        }
    }
}

/// Positioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

impl Position {
    /// Absolute and fixed boxes are taken out of the flow.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }

    /// Positioned boxes establish containing blocks for absolute descendants.
    pub fn is_positioned(self) -> bool {
        !matches!(self, Position::Static)
    }
}

/// CSS float property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

/// CSS clear property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clear {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl Clear {
    pub fn clears_left(self) -> bool {
        matches!(self, Clear::Left | Clear::Both)
    }

    pub fn clears_right(self) -> bool {
        matches!(self, Clear::Right | Clear::Both)
    }
}

/// `text-align`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// `overflow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

impl Overflow {
    /// True unless overflow is `visible`.
    pub fn clips_content(self) -> bool {
        !matches!(self, Overflow::Visible)
    }
}

/// Visibility of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// `white-space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    /// Sequences of white space collapse into one space.
    pub fn collapses_spaces(self) -> bool {
        matches!(self, WhiteSpace::Normal | WhiteSpace::Nowrap | WhiteSpace::PreLine)
    }

    /// Line feeds in the source force line breaks.
    pub fn preserves_line_breaks(self) -> bool {
        !matches!(self, WhiteSpace::Normal | WhiteSpace::Nowrap)
    }

    /// Lines may wrap at soft break opportunities.
    pub fn allows_wrapping(self) -> bool {
        matches!(self, WhiteSpace::Normal | WhiteSpace::PreWrap | WhiteSpace::PreLine)
    }
}

/// `vertical-align` of inline content and table cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Sub,
    Super,
    Top,
    TextTop,
    Middle,
    Bottom,
    TextBottom,
    /// A length or percentage (of the line height) raising the box.
    Length(Length),
}

impl VerticalAlign {
    /// Top and bottom alignment are resolved against the line box, not the baseline.
    pub fn is_line_relative(self) -> bool {
        matches!(self, VerticalAlign::Top | VerticalAlign::Bottom)
    }
}

/// `box-sizing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

/// Border line style. Only `none` and `hidden` matter for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Hidden,
    Solid,
    Dotted,
    Dashed,
    Double,
}

impl BorderStyle {
    /// Whether the border occupies space.
    pub fn is_visible(self) -> bool {
        !matches!(self, BorderStyle::None | BorderStyle::Hidden)
    }
}

/// Line height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    /// Derived from the font (1.2 × font size, rounded).
    #[default]
    Normal,
    /// Multiple of the font size.
    Number(f32),
    /// Absolute or relative length (percentages refer to the font size).
    Length(Length),
}

/// Table caption placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionSide {
    #[default]
    Top,
    Bottom,
}

// Flex container and item values

/// `flex-direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    /// True for the `-reverse` directions.
    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }

    /// True when the main axis is horizontal.
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    /// True when the main axis is vertical.
    pub fn is_column(self) -> bool {
        matches!(self, FlexDirection::Column | FlexDirection::ColumnReverse)
    }
}

/// `flex-wrap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// `justify-content`: distribution of free space along the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
}

/// `align-items`: default cross-axis placement of flex items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
}

/// `align-content`: packing of flex lines along the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    #[default]
    Stretch,
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
}

/// `align-self`: per-item override of `align-items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignSelf {
    #[default]
    Auto,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
    Stretch,
}

impl AlignSelf {
    /// Resolve `auto` against the container's `align-items`.
    pub fn resolve(self, container: AlignItems) -> AlignItems {
        match self {
            AlignSelf::Auto => container,
            AlignSelf::FlexStart => AlignItems::FlexStart,
            AlignSelf::FlexEnd => AlignItems::FlexEnd,
            AlignSelf::Center => AlignItems::Center,
            AlignSelf::Baseline => AlignItems::Baseline,
            AlignSelf::Stretch => AlignItems::Stretch,
        }
    }
}

/// `flex-basis`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FlexBasis {
    /// Take the main size from `width` or `height`.
    #[default]
    Auto,
    /// Max-content size of the item.
    Content,
    /// Explicit length.
    Length(f32),
    /// Percentage of the containing block dimension.
    Percent(f32),
}

// ==================== Background Types ====================

/// Background tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundRepeat {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

impl BackgroundRepeat {
    pub fn repeats_x(self) -> bool {
        matches!(self, BackgroundRepeat::Repeat | BackgroundRepeat::RepeatX)
    }

    pub fn repeats_y(self) -> bool {
        matches!(self, BackgroundRepeat::Repeat | BackgroundRepeat::RepeatY)
    }
}

/// One axis of `background-position`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionComponent {
    /// `left` or `top`.
    #[default]
    Start,
    Center,
    /// `right` or `bottom`.
    End,
    /// Length or percentage of (container − image).
    Length(Length),
}

/// `background-position` for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundPosition {
    pub x: PositionComponent,
    pub y: PositionComponent,
}

/// One value of a `background-size` list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeComponent {
    Auto,
    Length(Length),
}

/// `background-size`.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSize {
    Cover,
    Contain,
    /// Explicit value list. Two values are expected; any other count is malformed.
    Values(SmallVec<[SizeComponent; 2]>),
}

impl Default for BackgroundSize {
    fn default() -> Self {
        BackgroundSize::Values(SmallVec::from_slice(&[SizeComponent::Auto, SizeComponent::Auto]))
    }
}

/// Reference box for `background-position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundOrigin {
    BorderBox,
    #[default]
    PaddingBox,
    ContentBox,
}

/// `background-attachment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundAttachment {
    #[default]
    Scroll,
    Fixed,
    Local,
}

// ==================== Computed Style ====================

/// Resolved style of one element.
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    // Box model
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub clear: Clear,
    pub box_sizing: BoxSizing,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,

    pub margin_top: Length,
    pub margin_right: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,

    pub padding_top: Length,
    pub padding_right: Length,
    pub padding_bottom: Length,
    pub padding_left: Length,

    pub border_top_width: Length,
    pub border_right_width: Length,
    pub border_bottom_width: Length,
    pub border_left_width: Length,
    pub border_top_style: BorderStyle,
    pub border_right_style: BorderStyle,
    pub border_bottom_style: BorderStyle,
    pub border_left_style: BorderStyle,
    pub border_color: Color,

    // Offsets
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
    pub z_index: Option<i32>,

    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub visibility: Visibility,

    // Text
    pub color: Color,
    pub font_family: String,
    pub font_size: Length,
    pub font_weight: u16,
    pub italic: bool,
    pub line_height: LineHeight,
    pub text_align: TextAlign,
    pub text_indent: Length,
    pub white_space: WhiteSpace,
    pub vertical_align: VerticalAlign,

    // Background
    pub background_color: Color,
    pub background_image: Option<String>,
    pub background_position: BackgroundPosition,
    pub background_size: BackgroundSize,
    pub background_repeat: BackgroundRepeat,
    pub background_origin: BackgroundOrigin,
    pub background_attachment: BackgroundAttachment,

    // Flexbox container
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,

    // Flexbox item
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: FlexBasis,
    pub align_self: AlignSelf,
    pub order: i32,

    // Tables
    pub caption_side: CaptionSide,
    pub border_spacing: Length,
}

impl ComputedStyle {
    /// Create the initial style.
    pub fn new() -> Self {
        Self {
            font_size: Length::Px(16.0),
            font_weight: 400,
            font_family: "serif".to_string(),
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            border_color: Color::BLACK,
            // Flexbox item defaults
            flex_shrink: 1.0, // Default is 1, not 0
            // auto sizes
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Zero,
            min_height: Length::Zero,
            max_width: Length::Auto, // No max constraint
            max_height: Length::Auto,
            top: Length::Auto,
            right: Length::Auto,
            bottom: Length::Auto,
            left: Length::Auto,
            border_top_width: Length::Px(3.0), // medium
            border_right_width: Length::Px(3.0),
            border_bottom_width: Length::Px(3.0),
            border_left_width: Length::Px(3.0),
            ..Default::default()
        }
    }

    /// Initial style for a child of `parent`, carrying the inherited properties over.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            // Inherited properties
            color: parent.color,
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            italic: parent.italic,
            line_height: parent.line_height,
            text_align: parent.text_align,
            text_indent: parent.text_indent,
            white_space: parent.white_space,
            visibility: parent.visibility,
            caption_side: parent.caption_side,
            border_spacing: parent.border_spacing,

            // Non-inherited get initial values
            ..Self::new()
        }
    }

    /// Style of an anonymous box generated inside `parent` (CSS 2.1 §9.2.1.1).
    pub fn anonymous(parent: &ComputedStyle, display: Display) -> Self {
        let mut style = Self::inherit_from(parent);
        style.display = display;
        style
    }

    /// Apply a `name: value; name: value` declaration block.
    pub fn apply_declarations(&mut self, block: &str) -> Result<(), CssError> {
        for decl in block.split(';') {
            let decl = decl.trim();
            if decl.is_empty() {
                continue;
            }
            let (name, value) = decl
                .split_once(':')
                .ok_or_else(|| CssError::ParseError(decl.to_string()))?;
            self.set_property(name.trim(), value.trim())?;
        }
        Ok(())
    }

    /// Set one property from its textual value.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), CssError> {
        let invalid = || CssError::InvalidValue {
            property: name.to_string(),
            value: value.to_string(),
        };
        let length = || parse_length(value).ok_or_else(invalid);
        debug!(property = name, value, "apply declaration");

        match name {
            "display" => self.display = parse_display(value).ok_or_else(invalid)?,
            "position" => {
                self.position = match value {
                    "static" => Position::Static,
                    "relative" => Position::Relative,
                    "absolute" => Position::Absolute,
                    "fixed" => Position::Fixed,
                    _ => return Err(invalid()),
                }
            }
            "float" => {
                self.float = match value {
                    "none" => Float::None,
                    "left" => Float::Left,
                    "right" => Float::Right,
                    _ => return Err(invalid()),
                }
            }
            "clear" => {
                self.clear = match value {
                    "none" => Clear::None,
                    "left" => Clear::Left,
                    "right" => Clear::Right,
                    "both" => Clear::Both,
                    _ => return Err(invalid()),
                }
            }
            "box-sizing" => {
                self.box_sizing = match value {
                    "content-box" => BoxSizing::ContentBox,
                    "border-box" => BoxSizing::BorderBox,
                    _ => return Err(invalid()),
                }
            }
            "width" => self.width = length()?,
            "height" => self.height = length()?,
            "min-width" => self.min_width = length()?,
            "min-height" => self.min_height = length()?,
            "max-width" => self.max_width = parse_max_length(value).ok_or_else(invalid)?,
            "max-height" => self.max_height = parse_max_length(value).ok_or_else(invalid)?,
            "margin" => {
                let [t, r, b, l] = parse_edges(value).ok_or_else(invalid)?;
                self.margin_top = t;
                self.margin_right = r;
                self.margin_bottom = b;
                self.margin_left = l;
            }
            "margin-top" => self.margin_top = length()?,
            "margin-right" => self.margin_right = length()?,
            "margin-bottom" => self.margin_bottom = length()?,
            "margin-left" => self.margin_left = length()?,
            "padding" => {
                let [t, r, b, l] = parse_edges(value).ok_or_else(invalid)?;
                self.padding_top = t;
                self.padding_right = r;
                self.padding_bottom = b;
                self.padding_left = l;
            }
            "padding-top" => self.padding_top = length()?,
            "padding-right" => self.padding_right = length()?,
            "padding-bottom" => self.padding_bottom = length()?,
            "padding-left" => self.padding_left = length()?,
            "border-width" => {
                let [t, r, b, l] = parse_edges(value).ok_or_else(invalid)?;
                self.border_top_width = t;
                self.border_right_width = r;
                self.border_bottom_width = b;
                self.border_left_width = l;
            }
            "border-style" => {
                let style = parse_border_style(value).ok_or_else(invalid)?;
                self.border_top_style = style;
                self.border_right_style = style;
                self.border_bottom_style = style;
                self.border_left_style = style;
            }
            "border" => {
                // width and style, e.g. "2px solid"
                for part in value.split_whitespace() {
                    if parse_border_style(part).is_some() {
                        self.set_property("border-style", part)?;
                    } else if let Some(color) = parse_color(part) {
                        self.border_color = color;
                    } else {
                        self.set_property("border-width", part)?;
                    }
                }
            }
            "top" => self.top = length()?,
            "right" => self.right = length()?,
            "bottom" => self.bottom = length()?,
            "left" => self.left = length()?,
            "z-index" => {
                self.z_index = match value {
                    "auto" => None,
                    v => Some(v.parse().map_err(|_| invalid())?),
                }
            }
            "overflow" => {
                let overflow = parse_overflow(value).ok_or_else(invalid)?;
                self.overflow_x = overflow;
                self.overflow_y = overflow;
            }
            "visibility" => {
                self.visibility = match value {
                    "visible" => Visibility::Visible,
                    "hidden" => Visibility::Hidden,
                    "collapse" => Visibility::Collapse,
                    _ => return Err(invalid()),
                }
            }
            "color" => self.color = parse_color(value).ok_or_else(invalid)?,
            "font-family" => self.font_family = value.trim_matches('"').to_string(),
            "font-size" => self.font_size = length()?,
            "font-weight" => {
                self.font_weight = match value {
                    "normal" => 400,
                    "bold" => 700,
                    v => v.parse().map_err(|_| invalid())?,
                }
            }
            "font-style" => self.italic = matches!(value, "italic" | "oblique"),
            "line-height" => {
                self.line_height = if value == "normal" {
                    LineHeight::Normal
                } else if let Ok(n) = value.parse::<f32>() {
                    LineHeight::Number(n)
                } else {
                    LineHeight::Length(length()?)
                }
            }
            "text-align" => {
                self.text_align = match value {
                    "left" => TextAlign::Left,
                    "right" => TextAlign::Right,
                    "center" => TextAlign::Center,
                    "justify" => TextAlign::Justify,
                    _ => return Err(invalid()),
                }
            }
            "text-indent" => self.text_indent = length()?,
            "white-space" => {
                self.white_space = match value {
                    "normal" => WhiteSpace::Normal,
                    "nowrap" => WhiteSpace::Nowrap,
                    "pre" => WhiteSpace::Pre,
                    "pre-wrap" => WhiteSpace::PreWrap,
                    "pre-line" => WhiteSpace::PreLine,
                    _ => return Err(invalid()),
                }
            }
            "vertical-align" => {
                self.vertical_align = match value {
                    "baseline" => VerticalAlign::Baseline,
                    "sub" => VerticalAlign::Sub,
                    "super" => VerticalAlign::Super,
                    "top" => VerticalAlign::Top,
                    "text-top" => VerticalAlign::TextTop,
                    "middle" => VerticalAlign::Middle,
                    "bottom" => VerticalAlign::Bottom,
                    "text-bottom" => VerticalAlign::TextBottom,
                    _ => VerticalAlign::Length(length()?),
                }
            }
            "background-color" => self.background_color = parse_color(value).ok_or_else(invalid)?,
            "background-image" => {
                self.background_image = match value {
                    "none" => None,
                    v => Some(parse_url(v).ok_or_else(invalid)?),
                }
            }
            "background-position" => {
                self.background_position = parse_background_position(value).ok_or_else(invalid)?
            }
            "background-size" => {
                self.background_size = parse_background_size(value).ok_or_else(invalid)?
            }
            "background-repeat" => {
                self.background_repeat = match value {
                    "repeat" => BackgroundRepeat::Repeat,
                    "repeat-x" => BackgroundRepeat::RepeatX,
                    "repeat-y" => BackgroundRepeat::RepeatY,
                    "no-repeat" => BackgroundRepeat::NoRepeat,
                    _ => return Err(invalid()),
                }
            }
            "background-origin" => {
                self.background_origin = match value {
                    "border-box" => BackgroundOrigin::BorderBox,
                    "padding-box" => BackgroundOrigin::PaddingBox,
                    "content-box" => BackgroundOrigin::ContentBox,
                    _ => return Err(invalid()),
                }
            }
            "background-attachment" => {
                self.background_attachment = match value {
                    "scroll" => BackgroundAttachment::Scroll,
                    "fixed" => BackgroundAttachment::Fixed,
                    "local" => BackgroundAttachment::Local,
                    _ => return Err(invalid()),
                }
            }
            "flex-direction" => {
                self.flex_direction = match value {
                    "row" => FlexDirection::Row,
                    "row-reverse" => FlexDirection::RowReverse,
                    "column" => FlexDirection::Column,
                    "column-reverse" => FlexDirection::ColumnReverse,
                    _ => return Err(invalid()),
                }
            }
            "flex-wrap" => {
                self.flex_wrap = match value {
                    "nowrap" => FlexWrap::NoWrap,
                    "wrap" => FlexWrap::Wrap,
                    "wrap-reverse" => FlexWrap::WrapReverse,
                    _ => return Err(invalid()),
                }
            }
            "justify-content" => {
                self.justify_content = match value {
                    "flex-start" | "start" => JustifyContent::FlexStart,
                    "flex-end" | "end" => JustifyContent::FlexEnd,
                    "center" => JustifyContent::Center,
                    "space-between" => JustifyContent::SpaceBetween,
                    "space-around" => JustifyContent::SpaceAround,
                    _ => return Err(invalid()),
                }
            }
            "align-items" => {
                self.align_items = match value {
                    "stretch" => AlignItems::Stretch,
                    "flex-start" | "start" => AlignItems::FlexStart,
                    "flex-end" | "end" => AlignItems::FlexEnd,
                    "center" => AlignItems::Center,
                    "baseline" => AlignItems::Baseline,
                    _ => return Err(invalid()),
                }
            }
            "align-content" => {
                self.align_content = match value {
                    "stretch" => AlignContent::Stretch,
                    "flex-start" | "start" => AlignContent::FlexStart,
                    "flex-end" | "end" => AlignContent::FlexEnd,
                    "center" => AlignContent::Center,
                    "space-between" => AlignContent::SpaceBetween,
                    "space-around" => AlignContent::SpaceAround,
                    _ => return Err(invalid()),
                }
            }
            "align-self" => {
                self.align_self = match value {
                    "auto" => AlignSelf::Auto,
                    "stretch" => AlignSelf::Stretch,
                    "flex-start" | "start" => AlignSelf::FlexStart,
                    "flex-end" | "end" => AlignSelf::FlexEnd,
                    "center" => AlignSelf::Center,
                    "baseline" => AlignSelf::Baseline,
                    _ => return Err(invalid()),
                }
            }
            "flex-grow" => self.flex_grow = value.parse().map_err(|_| invalid())?,
            "flex-shrink" => self.flex_shrink = value.parse().map_err(|_| invalid())?,
            "flex-basis" => {
                self.flex_basis = match parse_length(value) {
                    _ if value == "content" => FlexBasis::Content,
                    Some(Length::Auto) => FlexBasis::Auto,
                    Some(Length::Px(px)) => FlexBasis::Length(px),
                    Some(Length::Zero) => FlexBasis::Length(0.0),
                    Some(Length::Percent(pct)) => FlexBasis::Percent(pct),
                    _ => return Err(invalid()),
                }
            }
            "order" => self.order = value.parse().map_err(|_| invalid())?,
            "caption-side" => {
                self.caption_side = match value {
                    "top" => CaptionSide::Top,
                    "bottom" => CaptionSide::Bottom,
                    _ => return Err(invalid()),
                }
            }
            "border-spacing" => self.border_spacing = length()?,
            _ => return Err(CssError::UnknownProperty(name.to_string())),
        }
        Ok(())
    }

    /// Whether `margin-left` is `auto`.
    pub fn margin_left_auto(&self) -> bool {
        self.margin_left.is_auto()
    }

    /// Whether `margin-right` is `auto`.
    pub fn margin_right_auto(&self) -> bool {
        self.margin_right.is_auto()
    }
}

/// Parse a color keyword or hex notation.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();

    match value.to_lowercase().as_str() {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => return Some(Color::BLACK),
        "white" => return Some(Color::WHITE),
        "red" => return Some(Color::from_rgb(255, 0, 0)),
        "green" => return Some(Color::from_rgb(0, 128, 0)),
        "blue" => return Some(Color::from_rgb(0, 0, 255)),
        "yellow" => return Some(Color::from_rgb(255, 255, 0)),
        "gray" | "grey" => return Some(Color::from_rgb(128, 128, 128)),
        "silver" => return Some(Color::from_rgb(192, 192, 192)),
        "navy" => return Some(Color::from_rgb(0, 0, 128)),
        "orange" => return Some(Color::from_rgb(255, 165, 0)),
        _ => {}
    }

    let hex = value.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut c = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Color::from_rgb(c.next()??, c.next()??, c.next()??))
        }
        6 => Some(Color::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

/// Parse a CSS length or percentage.
pub fn parse_length(value: &str) -> Option<Length> {
    let value = value.trim();

    if value == "auto" {
        return Some(Length::Auto);
    }
    if value == "0" {
        return Some(Length::Zero);
    }

    let units: [(&str, fn(f32) -> Length); 8] = [
        ("px", Length::Px),
        ("rem", Length::Rem),
        ("em", Length::Em),
        ("ex", Length::Ex),
        ("ch", Length::Ch),
        ("%", Length::Percent),
        ("vw", Length::Vw),
        ("vh", Length::Vh),
    ];
    for (suffix, ctor) in units {
        if let Some(num) = value.strip_suffix(suffix) {
            return num.trim().parse::<f32>().ok().map(ctor);
        }
    }
    None
}

/// `max-width`/`max-height` accept `none`, stored as `auto`.
fn parse_max_length(value: &str) -> Option<Length> {
    if value.trim() == "none" {
        Some(Length::Auto)
    } else {
        parse_length(value)
    }
}

/// Expand the 1-4 value edge shorthand into top, right, bottom, left.
fn parse_edges(value: &str) -> Option<[Length; 4]> {
    let parts: Vec<Length> = value
        .split_whitespace()
        .map(parse_length)
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [a] => Some([*a, *a, *a, *a]),
        [v, h] => Some([*v, *h, *v, *h]),
        [t, h, b] => Some([*t, *h, *b, *h]),
        [t, r, b, l] => Some([*t, *r, *b, *l]),
        _ => None,
    }
}

fn parse_border_style(value: &str) -> Option<BorderStyle> {
    match value {
        "none" => Some(BorderStyle::None),
        "hidden" => Some(BorderStyle::Hidden),
        "solid" => Some(BorderStyle::Solid),
        "dotted" => Some(BorderStyle::Dotted),
        "dashed" => Some(BorderStyle::Dashed),
        "double" => Some(BorderStyle::Double),
        _ => None,
    }
}

fn parse_overflow(value: &str) -> Option<Overflow> {
    match value {
        "visible" => Some(Overflow::Visible),
        "hidden" => Some(Overflow::Hidden),
        "scroll" => Some(Overflow::Scroll),
        "auto" => Some(Overflow::Auto),
        _ => None,
    }
}

fn parse_url(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?;
    Some(inner.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
}

/// Parse `background-position` (keywords, lengths and percentages).
pub fn parse_background_position(value: &str) -> Option<BackgroundPosition> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let component = |s: &str| match s {
        "left" | "top" => Some(PositionComponent::Start),
        "center" => Some(PositionComponent::Center),
        "right" | "bottom" => Some(PositionComponent::End),
        other => parse_length(other).map(PositionComponent::Length),
    };
    match parts.as_slice() {
        [single] => {
            // A single vertical keyword applies to y; x stays centered
            if matches!(*single, "top" | "bottom") {
                Some(BackgroundPosition {
                    x: PositionComponent::Center,
                    y: component(single)?,
                })
            } else {
                Some(BackgroundPosition {
                    x: component(single)?,
                    y: PositionComponent::Center,
                })
            }
        }
        [a, b] => {
            // Keywords may come in either order
            if matches!(*a, "top" | "bottom") || matches!(*b, "left" | "right") {
                Some(BackgroundPosition {
                    x: component(b)?,
                    y: component(a)?,
                })
            } else {
                Some(BackgroundPosition {
                    x: component(a)?,
                    y: component(b)?,
                })
            }
        }
        _ => None,
    }
}

/// Parse `background-size`. The value count is not validated here.
pub fn parse_background_size(value: &str) -> Option<BackgroundSize> {
    match value.trim() {
        "cover" => Some(BackgroundSize::Cover),
        "contain" => Some(BackgroundSize::Contain),
        other => {
            let values = other
                .split_whitespace()
                .map(|part| match part {
                    "auto" => Some(SizeComponent::Auto),
                    p => parse_length(p).map(SizeComponent::Length),
                })
                .collect::<Option<SmallVec<[SizeComponent; 2]>>>()?;
            Some(BackgroundSize::Values(values))
        }
    }
}

/// Parse a display keyword.
pub fn parse_display(value: &str) -> Option<Display> {
    match value.trim().to_lowercase().as_str() {
        "block" => Some(Display::Block),
        "inline" => Some(Display::Inline),
        "inline-block" => Some(Display::InlineBlock),
        "list-item" => Some(Display::ListItem),
        "flex" => Some(Display::Flex),
        "inline-flex" => Some(Display::InlineFlex),
        "table" => Some(Display::Table),
        "inline-table" => Some(Display::InlineTable),
        "table-row-group" => Some(Display::TableRowGroup),
        "table-header-group" => Some(Display::TableHeaderGroup),
        "table-footer-group" => Some(Display::TableFooterGroup),
        "table-row" => Some(Display::TableRow),
        "table-cell" => Some(Display::TableCell),
        "table-column" => Some(Display::TableColumn),
        "table-column-group" => Some(Display::TableColumnGroup),
        "table-caption" => Some(Display::TableCaption),
        "none" => Some(Display::None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_hex() {
        assert_eq!(parse_color("#fff"), Some(Color::from_rgb(255, 255, 255)));
        assert_eq!(parse_color("#000000"), Some(Color::BLACK));
        assert_eq!(parse_color("#ff0000"), Some(Color::from_rgb(255, 0, 0)));
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("10px"), Some(Length::Px(10.0)));
        assert_eq!(parse_length("1.5em"), Some(Length::Em(1.5)));
        assert_eq!(parse_length("2rem"), Some(Length::Rem(2.0)));
        assert_eq!(parse_length("50%"), Some(Length::Percent(50.0)));
        assert_eq!(parse_length("auto"), Some(Length::Auto));
        assert_eq!(parse_length("0"), Some(Length::Zero));
        assert_eq!(parse_length("wide"), None);
    }

    #[test]
    fn test_length_to_px() {
        assert_eq!(Length::Percent(50.0).to_px(16.0, 16.0, 300.0), 150.0);
        assert_eq!(Length::Em(2.0).to_px(10.0, 16.0, 0.0), 20.0);
        assert_eq!(Length::Vw(10.0).to_px_with_viewport(16.0, 16.0, 0.0, 800.0, 600.0), 80.0);
    }

    #[test]
    fn test_display_blockified() {
        assert_eq!(Display::Inline.blockified(), Display::Block);
        assert_eq!(Display::InlineTable.blockified(), Display::Table);
        assert_eq!(Display::InlineFlex.blockified(), Display::Flex);
        assert_eq!(Display::ListItem.blockified(), Display::ListItem);
        assert!(Display::TableHeaderGroup.is_row_group());
    }

    #[test]
    fn test_white_space_modes() {
        assert!(WhiteSpace::Normal.collapses_spaces());
        assert!(WhiteSpace::Normal.allows_wrapping());
        assert!(!WhiteSpace::Normal.preserves_line_breaks());
        assert!(!WhiteSpace::Pre.allows_wrapping());
        assert!(WhiteSpace::Pre.preserves_line_breaks());
        assert!(WhiteSpace::PreLine.collapses_spaces());
        assert!(WhiteSpace::PreLine.preserves_line_breaks());
    }

    #[test]
    fn test_inherit_keeps_text_resets_box() {
        let mut parent = ComputedStyle::new();
        parent.apply_declarations("font-size: 20px; width: 100px; white-space: pre").unwrap();
        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.font_size, Length::Px(20.0));
        assert_eq!(child.white_space, WhiteSpace::Pre);
        assert_eq!(child.width, Length::Auto);
        assert_eq!(child.max_width, Length::Auto);
    }

    #[test]
    fn test_apply_declarations() {
        let mut style = ComputedStyle::new();
        style
            .apply_declarations("display: flex; margin: 1px 2px; flex-wrap: wrap; max-width: none")
            .unwrap();
        assert_eq!(style.display, Display::Flex);
        assert_eq!(style.margin_top, Length::Px(1.0));
        assert_eq!(style.margin_left, Length::Px(2.0));
        assert_eq!(style.flex_wrap, FlexWrap::Wrap);
        assert!(style.max_width.is_auto());

        assert_eq!(
            style.set_property("float", "middle"),
            Err(CssError::InvalidValue {
                property: "float".into(),
                value: "middle".into()
            })
        );
        assert!(matches!(
            style.set_property("colour", "red"),
            Err(CssError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_background_parsing() {
        let pos = parse_background_position("center center").unwrap();
        assert_eq!(pos.x, PositionComponent::Center);
        assert_eq!(pos.y, PositionComponent::Center);

        let pos = parse_background_position("top right").unwrap();
        assert_eq!(pos.x, PositionComponent::End);
        assert_eq!(pos.y, PositionComponent::Start);

        assert_eq!(parse_background_size("cover"), Some(BackgroundSize::Cover));
        match parse_background_size("10px auto 5px") {
            Some(BackgroundSize::Values(v)) => assert_eq!(v.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
        assert!(BackgroundRepeat::RepeatX.repeats_x());
        assert!(!BackgroundRepeat::RepeatX.repeats_y());
    }
}

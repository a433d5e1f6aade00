//! Replaced content (images and other embedded objects).
//!
//! The size of a replaced box comes from its content, not from its
//! children: the intrinsic size, then the element's `width`/`height`
//! attributes, then the CSS `width`/`height`. A missing dimension is derived
//! from the intrinsic ratio.

use boxkit_image::DecodedImage;
use tracing::trace;
use url::Url;

use crate::context::CssDecoder;
use crate::manager::{LayoutCx, LayoutManager, LayoutOutcome};
use crate::tree::{BoxId, BoxTree};
use crate::{Rect, Size};

/// Size used when the object could not be loaded.
const MISSING_OBJECT_SIZE: f32 = 20.0;

/// Content object of a replaced box.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacedContent {
    Image { url: Url, image: DecodedImage },
    /// Nothing to show: no source, loading disabled or failed.
    Missing { url: Option<Url> },
}

impl ReplacedContent {
    /// Intrinsic size; zero dimensions are treated as 1px.
    pub fn intrinsic_size(&self) -> Size {
        match self {
            ReplacedContent::Image { image, .. } => {
                Size::new(image.width.max(1.0), image.height.max(1.0))
            }
            ReplacedContent::Missing { .. } => Size::new(MISSING_OBJECT_SIZE, MISSING_OBJECT_SIZE),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            ReplacedContent::Image { url, .. } => Some(url),
            ReplacedContent::Missing { url } => url.as_ref(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ReplacedContent::Image { .. })
    }
}

/// State of a replaced box.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacedData {
    /// Block-level (`display: block`) rather than inline.
    pub block: bool,
    pub content: ReplacedContent,
    /// `width` attribute of the element, in pixels.
    pub attr_width: Option<f32>,
    /// `height` attribute of the element, in pixels.
    pub attr_height: Option<f32>,
}

impl ReplacedData {
    pub fn new(block: bool, content: ReplacedContent) -> Self {
        Self {
            block,
            content,
            attr_width: None,
            attr_height: None,
        }
    }
}

/// Resolve the content size of replaced box `id` and fix its width and height.
pub fn load_replaced_size(tree: &mut BoxTree, id: BoxId) {
    let cb = tree.containing_block_size(id);
    let b = &tree[id];
    let Some(data) = b.kind.replaced() else {
        return;
    };
    let intrinsic = data.content.intrinsic_size();
    let ratio = intrinsic.width / intrinsic.height;
    let mut w = intrinsic.width;
    let mut h = intrinsic.height;

    match (data.attr_width, data.attr_height) {
        (Some(aw), Some(ah)) => {
            w = aw;
            h = ah;
        }
        (Some(aw), None) => {
            w = aw;
            h = (aw / ratio).round();
        }
        (None, Some(ah)) => {
            h = ah;
            w = (ah * ratio).round();
        }
        (None, None) => {}
    }

    let dec = CssDecoder::new(&b.ctx);
    let (css_w, css_h) = (b.style.width, b.style.height);
    match (css_w.is_auto(), css_h.is_auto()) {
        (false, false) => {
            w = dec.px(css_w, cb.width);
            h = dec.px(css_h, cb.height);
        }
        (false, true) => {
            w = dec.px(css_w, cb.width);
            h = (w / ratio).round();
        }
        (true, false) => {
            h = dec.px(css_h, cb.height);
            w = (h * ratio).round();
        }
        (true, true) => {}
    }

    let b = &mut tree[id];
    b.content = Size::new(b.limits.clamp_width(w), b.limits.clamp_height(h));
    b.flags.wset = true;
    b.flags.hset = true;
    if b.is_block && b.is_in_flow() && b.flags.mleft_auto && b.flags.mright_auto {
        let rest = cb.width - b.content.width - b.border.horizontal() - b.padding.horizontal();
        let half = (rest / 2.0).max(0.0);
        b.margin.left = half;
        b.margin.right = half;
        b.emargin.left = half;
        b.emargin.right = half;
    }
    b.line_height = b.content.height;
    let (tw, th) = (b.total_width(), b.total_height());
    b.set_size(tw, th);
    trace!(box_id = id.index(), width = w, height = h, "replaced size resolved");
}

/// Layout of replaced boxes; the size is fixed by [`load_replaced_size`].
pub struct ReplacedLayout;

impl LayoutManager for ReplacedLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        force: bool,
        _line_start: bool,
    ) -> LayoutOutcome {
        let b = &mut cx.tree[id];
        if !b.displayed {
            b.content = Size::zero();
            b.bounds = Rect::zero();
            return LayoutOutcome::fit();
        }
        b.avail_width = avail_width;
        let (w, h) = (b.total_width(), b.total_height());
        b.set_size(w, h);
        if b.is_block || force || b.width() <= avail_width {
            LayoutOutcome::fit()
        } else {
            LayoutOutcome::failed()
        }
    }
}

//! Styled documents and engines with deterministic text metrics.
//!
//! Every document style starts from a 10px monospace font (5px per
//! character) and a 20px line height, so text widths in the scenarios are
//! exact.

use std::sync::Arc;

use boxkit_css::ComputedStyle;
use boxkit_image::{DecodedImage, ImageCache, StaticImageLoader};
use boxkit_layout::{
    BoxId, BoxKind, BoxTree, LayoutConfig, LayoutEngine, MonospaceMeasurer, StyledNode,
};
use url::Url;

/// Base URL relative image references resolve against.
pub const BASE_URL: &str = "https://boxkit.test/";

/// Width of one character of fixture text.
pub const CHAR_WIDTH: f32 = 5.0;

pub const LINE_HEIGHT: f32 = 20.0;

/// Install a subscriber honoring `RUST_LOG`; repeated calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn style(css: &str) -> ComputedStyle {
    let mut style = ComputedStyle::new();
    style
        .apply_declarations("font-size: 10px; line-height: 20px")
        .expect("fixture font");
    style.apply_declarations(css).expect("valid fixture declarations");
    style
}

pub fn el(tag: &str, css: &str) -> StyledNode {
    StyledNode::element(tag, style(css))
}

pub fn block(css: &str) -> StyledNode {
    el("div", &format!("display: block; {css}"))
}

pub fn text(content: &str) -> StyledNode {
    StyledNode::text(content)
}

/// A `body` with no margins holding `children`.
pub fn body(children: impl IntoIterator<Item = StyledNode>) -> StyledNode {
    el("body", "display: block; margin: 0").with_children(children)
}

fn config(width: f32, height: f32) -> LayoutConfig {
    let mut config = LayoutConfig::with_viewport(width, height);
    config.default_font_size = 10.0;
    config.base_url = Url::parse(BASE_URL).ok();
    config
}

pub fn engine(width: f32, height: f32) -> LayoutEngine {
    init_tracing();
    LayoutEngine::builder()
        .config(config(width, height))
        .measurer(Arc::new(MonospaceMeasurer::new(0.5)))
        .build()
}

/// An engine whose loader knows `images` as `(path, width, height)`
/// relative to [`BASE_URL`].
pub fn engine_with_images(width: f32, height: f32, images: &[(&str, f32, f32)]) -> LayoutEngine {
    init_tracing();
    let base = Url::parse(BASE_URL).expect("base url");
    let loader = images.iter().fold(StaticImageLoader::new(), |loader, &(path, w, h)| {
        loader.with_image(base.join(path).expect("image url"), DecodedImage::new(w, h))
    });
    LayoutEngine::builder()
        .config(config(width, height))
        .measurer(Arc::new(MonospaceMeasurer::new(0.5)))
        .image_cache(ImageCache::shared())
        .image_loader(Arc::new(loader))
        .build()
}

/// Element boxes generated for `tag`, in creation order, without
/// anonymous boxes and continuations.
pub fn boxes_by_tag(tree: &BoxTree, tag: &str) -> Vec<BoxId> {
    tree.ids()
        .filter(|&id| {
            let b = &tree[id];
            !b.anonymous && !b.splitted && b.tag.as_deref() == Some(tag)
        })
        .collect()
}

/// The single box generated for `tag`.
#[track_caller]
pub fn box_by_tag(tree: &BoxTree, tag: &str) -> BoxId {
    let found = boxes_by_tag(tree, tag);
    assert_eq!(found.len(), 1, "expected one <{tag}> box, found {}", found.len());
    found[0]
}

/// Text boxes below `id` (continuations included) in tree order.
pub fn text_boxes(tree: &BoxTree, id: BoxId) -> Vec<BoxId> {
    let mut out = Vec::new();
    collect_text(tree, id, &mut out);
    out
}

fn collect_text(tree: &BoxTree, id: BoxId, out: &mut Vec<BoxId>) {
    if matches!(tree[id].kind, BoxKind::Text(_)) {
        out.push(id);
    }
    for &child in &tree[id].children {
        collect_text(tree, child, out);
    }
}

/// The text currently assigned to text box `id`.
#[track_caller]
pub fn text_of(tree: &BoxTree, id: BoxId) -> &str {
    tree[id].kind.text().map(|t| t.current()).expect("text box")
}

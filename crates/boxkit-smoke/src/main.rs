//! BoxKit Smoke Harness
//!
//! Builds one of the built-in documents, lays it out headless and checks the
//! resulting geometry. Prints a JSON verdict and optionally dumps the whole
//! box tree as JSON.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use boxkit_css::ComputedStyle;
use boxkit_image::{DecodedImage, ImageCache, StaticImageLoader};
use boxkit_layout::{
    BoxId, BoxTree, DisplayCommand, LayoutConfig, LayoutEngine, MonospaceMeasurer, StyledNode,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use url::Url;

const BASE_URL: &str = "https://boxkit.test/";

/// Parse command line arguments
struct Args {
    width: f32,
    height: f32,
    scenario: String,
    dump_json: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut width = 800.0f32;
        let mut height = 600.0f32;
        let mut scenario = "all".to_string();
        let mut dump_json = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" => {
                    if let Some(val) = args.next() {
                        width = val.parse().unwrap_or(800.0);
                    }
                }
                "--height" => {
                    if let Some(val) = args.next() {
                        height = val.parse().unwrap_or(600.0);
                    }
                }
                "--scenario" => {
                    if let Some(val) = args.next() {
                        scenario = val;
                    }
                }
                "--dump-json" => {
                    dump_json = args.next();
                }
                other => warn!(argument = other, "ignoring unknown argument"),
            }
        }

        Self {
            width,
            height,
            scenario,
            dump_json,
        }
    }
}

/// Geometry of one box as written by `--dump-json`.
#[derive(Debug, Serialize)]
struct BoxGeometry {
    id: usize,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    anonymous: bool,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    content_width: f32,
    content_height: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<BoxGeometry>,
}

impl BoxGeometry {
    fn collect(tree: &BoxTree, id: BoxId) -> Self {
        let b = &tree[id];
        Self {
            id: id.index(),
            kind: b.kind.name(),
            tag: b.tag.clone(),
            anonymous: b.anonymous,
            x: b.abs_bounds.x,
            y: b.abs_bounds.y,
            width: b.abs_bounds.width,
            height: b.abs_bounds.height,
            content_width: b.content.width,
            content_height: b.content.height,
            children: b
                .sub_boxes()
                .iter()
                .filter(|&&c| tree[c].displayed)
                .map(|&c| BoxGeometry::collect(tree, c))
                .collect(),
        }
    }
}

/// A built-in document with the check its layout must pass.
struct Scenario {
    name: &'static str,
    document: fn() -> StyledNode,
    check: fn(&BoxTree, &LayoutEngine) -> Result<(), String>,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "shrink-to-fit",
        document: shrink_to_fit_document,
        check: check_shrink_to_fit,
    },
    Scenario {
        name: "line-break",
        document: line_break_document,
        check: check_line_break,
    },
    Scenario {
        name: "background-center",
        document: background_document,
        check: check_background,
    },
    Scenario {
        name: "flex-wrap",
        document: flex_wrap_document,
        check: check_flex_wrap,
    },
];

fn style(css: &str) -> ComputedStyle {
    let mut style = ComputedStyle::new();
    let declarations = format!("font-size: 10px; line-height: 20px; {css}");
    if let Err(e) = style.apply_declarations(&declarations) {
        error!(?e, css, "invalid scenario style");
    }
    style
}

fn el(tag: &str, css: &str) -> StyledNode {
    StyledNode::element(tag, style(css))
}

fn body(children: impl IntoIterator<Item = StyledNode>) -> StyledNode {
    el("body", "display: block; margin: 0").with_children(children)
}

fn shrink_to_fit_document() -> StyledNode {
    let words = "aaaaaaaaaa bbbbbbbbbb cccccccccc dddddddddd eeeeeeeeee fffff";
    body([el("div", "display: block; width: 120px").with_child(
        el("aside", "display: block; float: left").with_child(StyledNode::text(words)),
    )])
}

fn line_break_document() -> StyledNode {
    body([el("p", "display: block; width: 100px")
        .with_child(StyledNode::text("aaaaaaaa bbbbbbbb cccccccc"))])
}

fn background_document() -> StyledNode {
    body([el(
        "section",
        "display: block; width: 200px; height: 100px; background-image: url(bg.png); \
         background-position: center center; background-repeat: no-repeat",
    )])
}

fn flex_wrap_document() -> StyledNode {
    let item = || el("span", "display: block; width: 40px; height: 10px; flex-shrink: 0");
    body([el("nav", "display: flex; flex-wrap: wrap; width: 100px")
        .with_children([item(), item(), item()])])
}

fn find_tag(tree: &BoxTree, tag: &str) -> Vec<BoxId> {
    tree.ids()
        .filter(|&id| {
            let b = &tree[id];
            !b.anonymous && !b.splitted && b.tag.as_deref() == Some(tag)
        })
        .collect()
}

fn expect_close(what: &str, actual: f32, expected: f32) -> Result<(), String> {
    if (actual - expected).abs() < 0.01 {
        Ok(())
    } else {
        Err(format!("{what}: expected {expected}, got {actual}"))
    }
}

fn check_shrink_to_fit(tree: &BoxTree, _engine: &LayoutEngine) -> Result<(), String> {
    let aside = *find_tag(tree, "aside").first().ok_or("no aside box")?;
    expect_close("aside width", tree[aside].content.width, 120.0)
}

fn check_line_break(tree: &BoxTree, _engine: &LayoutEngine) -> Result<(), String> {
    let p = *find_tag(tree, "p").first().ok_or("no paragraph box")?;
    let continuations = tree[p].children.iter().filter(|&&c| tree[c].splitted).count();
    if continuations != 1 {
        return Err(format!("expected one continuation, found {continuations}"));
    }
    expect_close("paragraph height", tree[p].content.height, 40.0)
}

fn check_background(tree: &BoxTree, engine: &LayoutEngine) -> Result<(), String> {
    let section = *find_tag(tree, "section").first().ok_or("no section box")?;
    let list = engine.display_list(tree).map_err(|e| e.to_string())?;
    let placement = list
        .commands
        .iter()
        .find_map(|c| match c {
            DisplayCommand::Background {
                id,
                image: Some((_, placement)),
                ..
            } if *id == section => Some(*placement),
            _ => None,
        })
        .ok_or("no background image drawn")?;
    expect_close("image x", placement.image.x, 75.0)?;
    expect_close("image y", placement.image.y, 25.0)
}

fn check_flex_wrap(tree: &BoxTree, _engine: &LayoutEngine) -> Result<(), String> {
    let items = find_tag(tree, "span");
    if items.len() != 3 {
        return Err(format!("expected 3 flex items, found {}", items.len()));
    }
    expect_close("second item x", tree[items[1]].abs_bounds.x, 40.0)?;
    expect_close("third item x", tree[items[2]].abs_bounds.x, 0.0)?;
    expect_close("third item y", tree[items[2]].abs_bounds.y, 10.0)
}

fn build_engine(args: &Args, images: Arc<ImageCache>) -> LayoutEngine {
    let mut config = LayoutConfig::with_viewport(args.width, args.height);
    config.default_font_size = 10.0;
    config.base_url = Url::parse(BASE_URL).ok();

    let mut loader = StaticImageLoader::new();
    if let Some(url) = config.base_url.as_ref().and_then(|base| base.join("bg.png").ok()) {
        loader.insert(url, DecodedImage::new(50.0, 50.0));
    }

    LayoutEngine::builder()
        .config(config)
        .measurer(Arc::new(MonospaceMeasurer::new(0.5)))
        .image_cache(images)
        .image_loader(Arc::new(loader))
        .build()
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!(
        width = args.width,
        height = args.height,
        scenario = %args.scenario,
        dump_json = ?args.dump_json,
        "Starting BoxKit smoke harness"
    );

    let selected: Vec<&Scenario> = SCENARIOS
        .iter()
        .filter(|s| args.scenario == "all" || s.name == args.scenario)
        .collect();
    if selected.is_empty() {
        error!(scenario = %args.scenario, "unknown scenario");
        println!("{}", json!({ "status": "fail", "reason": "unknown_scenario" }));
        return ExitCode::FAILURE;
    }

    // one cache for every scenario of the run
    let images = ImageCache::shared();
    let engine = build_engine(&args, Arc::clone(&images));
    let start = Instant::now();
    let mut results = Vec::new();
    let mut dumps = serde_json::Map::new();
    let mut failed = false;

    for scenario in selected {
        let outcome = engine
            .layout(&(scenario.document)())
            .map_err(|e| e.to_string())
            .and_then(|tree| {
                (scenario.check)(&tree, &engine)?;
                Ok(tree)
            });
        match outcome {
            Ok(tree) => {
                info!(scenario = scenario.name, boxes = tree.len(), "scenario passed");
                results.push(json!({ "scenario": scenario.name, "status": "pass" }));
                if let Some(root) = tree.root() {
                    match serde_json::to_value(BoxGeometry::collect(&tree, root)) {
                        Ok(value) => {
                            dumps.insert(scenario.name.to_string(), value);
                        }
                        Err(e) => {
                            error!(?e, scenario = scenario.name, "Failed to serialize geometry")
                        }
                    }
                }
            }
            Err(reason) => {
                error!(scenario = scenario.name, %reason, "scenario failed");
                results.push(json!({
                    "scenario": scenario.name,
                    "status": "fail",
                    "reason": reason,
                }));
                failed = true;
            }
        }
    }

    let stats = images.stats();
    let status = if failed { "fail" } else { "pass" };
    let result = json!({
        "status": status,
        "elapsed_ms": start.elapsed().as_millis(),
        "scenarios": results,
        "image_cache": {
            "hits": stats.hits,
            "misses": stats.misses,
            "failures": stats.failures,
        },
    });
    println!("{}", result);

    if let Some(path) = &args.dump_json {
        match serde_json::to_string_pretty(&dumps) {
            Ok(text) => {
                if let Err(e) = std::fs::write(path, text) {
                    error!(?e, path = %path, "Failed to write geometry dump");
                    return ExitCode::FAILURE;
                }
                info!(path = %path, "geometry dumped");
            }
            Err(e) => {
                error!(?e, "Failed to serialize geometry dump");
                return ExitCode::FAILURE;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

//! End-to-end layout scenarios: styled documents through the engine.

mod support;

use boxkit_layout::intrinsic;
use support::*;

#[test]
fn test_display_none_has_zero_geometry() {
    let engine = engine(400.0, 300.0);
    let doc = body([
        block("height: 30px"),
        el("section", "display: none; height: 50px; padding: 4px").with_child(text("hidden")),
        el("footer", "display: block; height: 10px"),
    ]);
    let tree = engine.layout(&doc).expect("layout");

    let hidden = box_by_tag(&tree, "section");
    assert_zero_geometry(&tree, hidden);
    assert!(tree[hidden].children.is_empty());
    assert_abs_origin(&tree, box_by_tag(&tree, "footer"), 0.0, 30.0);
}

#[test]
fn test_shrink_to_fit_uses_available_width_in_range() {
    let engine = engine(400.0, 300.0);
    let doc = body([block("width: 120px").with_child(
        el("aside", "display: block; float: left")
            .with_child(text("aaaaaaaaaa bbbbbbbbbb cccccccccc dddddddddd eeeeeeeeee fffff")),
    )]);

    let built = engine.build_tree(&doc).expect("tree");
    let aside = box_by_tag(&built, "aside");
    assert_close(intrinsic::minimal_content_width(&built, aside), 50.0, "min-content");
    assert_close(intrinsic::maximal_content_width(&built, aside), 300.0, "max-content");

    let tree = engine.layout(&doc).expect("layout");
    let aside = box_by_tag(&tree, "aside");
    // three lines: "a b", "c d", "e f"
    assert_content_size(&tree, aside, 120.0, 3.0 * LINE_HEIGHT);
}

#[test]
fn test_shrink_to_fit_narrow_content_keeps_max_width() {
    let engine = engine(400.0, 300.0);
    let doc = body([block("width: 120px")
        .with_child(el("aside", "display: block; float: right").with_child(text("short")))]);
    let tree = engine.layout(&doc).expect("layout");

    let aside = box_by_tag(&tree, "aside");
    assert_content_size(&tree, aside, 25.0, LINE_HEIGHT);
    // right floats hug the right edge of the container
    assert_abs_origin(&tree, aside, 95.0, 0.0);
}

#[test]
fn test_line_breaking_moves_third_word_to_continuation() {
    let engine = engine(400.0, 300.0);
    let doc = body([
        el("p", "display: block; width: 100px").with_child(text("aaaaaaaa bbbbbbbb cccccccc"))
    ]);
    let tree = engine.layout(&doc).expect("layout");

    let p = box_by_tag(&tree, "p");
    let texts = text_boxes(&tree, p);
    assert_eq!(texts.len(), 2);
    assert_eq!(text_of(&tree, texts[0]).trim(), "aaaaaaaa bbbbbbbb");
    assert_eq!(text_of(&tree, texts[1]).trim(), "cccccccc");
    assert!(tree[texts[1]].splitted);
    assert_abs_origin(&tree, texts[0], 0.0, 0.0);
    assert_abs_origin(&tree, texts[1], 0.0, LINE_HEIGHT);
    assert_content_size(&tree, p, 100.0, 2.0 * LINE_HEIGHT);
}

#[test]
fn test_line_breaking_is_idempotent() {
    let engine = engine(400.0, 300.0);
    let doc = body([el("p", "display: block; width: 100px").with_children([
        text("aaaaaaaa "),
        el("b", "display: inline").with_child(text("bbbbbbbb cccccccc")),
        text(" dd"),
    ])]);
    let mut tree = engine.build_tree(&doc).expect("tree");

    engine.layout_tree(&mut tree).expect("first layout");
    let p = box_by_tag(&tree, "p");
    let first: Vec<(f32, f32)> = text_boxes(&tree, p)
        .into_iter()
        .map(|t| (tree[t].abs_bounds.x, tree[t].abs_bounds.y))
        .collect();
    let height = tree[p].content.height;

    engine.layout_tree(&mut tree).expect("second layout");
    let second: Vec<(f32, f32)> = text_boxes(&tree, p)
        .into_iter()
        .map(|t| (tree[t].abs_bounds.x, tree[t].abs_bounds.y))
        .collect();
    assert_eq!(first, second);
    assert_close(tree[p].content.height, height, "paragraph height");
}

#[test]
fn test_text_flows_around_float_and_clearance() {
    let engine = engine(400.0, 300.0);
    let doc = body([block("width: 200px").with_children([
        el("aside", "display: block; float: left; width: 50px; height: 40px"),
        el("p", "display: block").with_child(text("hello")),
        el("footer", "display: block; clear: left; height: 10px"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    let aside = box_by_tag(&tree, "aside");
    assert_abs_origin(&tree, aside, 0.0, 0.0);
    let p = box_by_tag(&tree, "p");
    let words = text_boxes(&tree, p);
    assert_abs_origin(&tree, words[0], 50.0, 0.0);
    assert_abs_origin(&tree, box_by_tag(&tree, "footer"), 0.0, 40.0);
}

#[test]
fn test_block_margins_collapse_between_siblings() {
    let engine = engine(400.0, 300.0);
    let doc = body([
        el("header", "display: block; height: 10px; margin-bottom: 20px"),
        el("main", "display: block; height: 10px; margin-top: 15px"),
    ]);
    let tree = engine.layout(&doc).expect("layout");

    let main = box_by_tag(&tree, "main");
    // the margin box starts where the larger margin ends minus its own margin
    assert_close(tree[main].abs_content_y(), 30.0, "main content top");
}

#[test]
fn test_absolute_box_is_placed_in_containing_block() {
    let engine = engine(400.0, 300.0);
    let doc = body([
        block("height: 30px"),
        el("section", "display: block; position: relative; width: 300px; height: 100px")
            .with_child(el(
                "aside",
                "display: block; position: absolute; top: 7px; left: 3px; \
                 width: 20px; height: 20px",
            )),
    ]);
    let tree = engine.layout(&doc).expect("layout");

    let section = box_by_tag(&tree, "section");
    let aside = box_by_tag(&tree, "aside");
    assert_eq!(tree[aside].containing_block, Some(section));
    assert_abs_origin(&tree, aside, 3.0, 37.0);
    assert_content_size(&tree, aside, 20.0, 20.0);
}

#[test]
fn test_flex_wrap_starts_new_line_when_item_overflows() {
    let engine = engine(400.0, 300.0);
    let item = || el("span", "display: block; width: 40px; height: 10px; flex-shrink: 0");
    let doc = body([el("nav", "display: flex; flex-wrap: wrap; width: 100px")
        .with_children([item(), item(), item()])]);
    let tree = engine.layout(&doc).expect("layout");

    let items = boxes_by_tag(&tree, "span");
    assert_eq!(items.len(), 3);
    assert_abs_origin(&tree, items[0], 0.0, 0.0);
    assert_abs_origin(&tree, items[1], 40.0, 0.0);
    assert_abs_origin(&tree, items[2], 0.0, 10.0);
    assert_content_size(&tree, box_by_tag(&tree, "nav"), 100.0, 20.0);
}

#[test]
fn test_flex_oversized_single_item_keeps_its_line() {
    let engine = engine(400.0, 300.0);
    let doc = body([el("nav", "display: flex; flex-wrap: wrap; width: 100px").with_children([
        el("span", "display: block; width: 150px; height: 10px; flex-shrink: 0"),
        el("em", "display: block; width: 40px; height: 10px; flex-shrink: 0"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    assert_abs_origin(&tree, box_by_tag(&tree, "span"), 0.0, 0.0);
    assert_abs_origin(&tree, box_by_tag(&tree, "em"), 0.0, 10.0);
}

#[test]
fn test_flex_grow_distributes_free_space() {
    let engine = engine(400.0, 300.0);
    let doc = body([el("nav", "display: flex; width: 300px").with_children([
        el("span", "display: block; width: 50px; height: 10px; flex-grow: 1"),
        el("em", "display: block; width: 50px; height: 10px; flex-grow: 3"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    // 200px of free space split 1:3
    assert_close(tree[box_by_tag(&tree, "span")].content.width, 100.0, "first item");
    assert_close(tree[box_by_tag(&tree, "em")].content.width, 200.0, "second item");
    assert_abs_origin(&tree, box_by_tag(&tree, "em"), 100.0, 0.0);
}

#[test]
fn test_table_cells_share_columns() {
    let engine = engine(400.0, 300.0);
    let cell = |content: &str| el("td", "display: table-cell").with_child(text(content));
    let row = |a: &str, b: &str| el("tr", "display: table-row").with_children([cell(a), cell(b)]);
    let doc = body([el("table", "display: table").with_children([
        row("ab", "abcdef"),
        row("abcdefgh", "a"),
        el("tr", "display: table-row").with_child(cell("wide").with_attr("colspan", "2")),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    let cells = boxes_by_tag(&tree, "td");
    assert_eq!(cells.len(), 5);
    let x = |i: usize| tree[cells[i]].abs_bounds.x;
    let y = |i: usize| tree[cells[i]].abs_bounds.y;
    assert_close(x(0), x(2), "first column");
    assert_close(x(1), x(3), "second column");
    assert!(x(1) > x(0));
    assert!(y(2) > y(0));
    assert!(y(4) > y(2));
    // the spanning cell covers both columns
    let width = |i: usize| tree[cells[i]].bounds.width;
    assert!(width(4) >= width(0) + width(1));

    // the wrapper comes first; the table box inside it carries the same tag
    let wrapper = boxes_by_tag(&tree, "table")[0];
    for &c in &cells {
        assert_inside(&tree, c, wrapper);
    }
}

#[test]
fn test_replaced_image_uses_intrinsic_and_attribute_sizes() {
    let engine = engine_with_images(400.0, 300.0, &[("logo.png", 40.0, 30.0)]);
    let doc = body([el("p", "display: block").with_children([
        el("img", "display: inline").with_attr("src", "logo.png"),
        el("img", "display: inline").with_attr("src", "logo.png").with_attr("width", "80"),
        el("img", "display: inline").with_attr("src", "missing.png"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    let images = boxes_by_tag(&tree, "img");
    assert_content_size(&tree, images[0], 40.0, 30.0);
    assert_content_size(&tree, images[1], 80.0, 60.0);
    assert_content_size(&tree, images[2], 20.0, 20.0);
    let missing = url::Url::parse("https://boxkit.test/missing.png").expect("url");
    assert!(engine.images().has_failed(&missing));
}

#[test]
fn test_shrink_to_fit_never_goes_below_min_content() {
    let engine = engine(400.0, 300.0);
    let doc = body([block("width: 60px").with_child(
        el("aside", "display: block; float: left").with_child(text("aaaaaaaaaaaaaaaaaaaa bb")),
    )]);
    let tree = engine.layout(&doc).expect("layout");

    // the longest word is 100px; the float overflows its 60px container
    let aside = box_by_tag(&tree, "aside");
    assert_content_size(&tree, aside, 20.0 * CHAR_WIDTH, 2.0 * LINE_HEIGHT);
}

#[test]
fn test_clear_both_passes_the_lowest_float() {
    let engine = engine(400.0, 300.0);
    let doc = body([block("width: 200px").with_children([
        el("aside", "display: block; float: left; width: 50px; height: 40px"),
        el("figure", "display: block; float: right; width: 50px; height: 70px; margin: 0"),
        el("footer", "display: block; clear: both; height: 10px"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    assert_abs_origin(&tree, box_by_tag(&tree, "aside"), 0.0, 0.0);
    assert_abs_origin(&tree, box_by_tag(&tree, "figure"), 150.0, 0.0);
    assert_abs_origin(&tree, box_by_tag(&tree, "footer"), 0.0, 70.0);
}

#[test]
fn test_clear_right_ignores_left_floats() {
    let engine = engine(400.0, 300.0);
    let doc = body([block("width: 200px").with_children([
        el("aside", "display: block; float: left; width: 50px; height: 70px"),
        el("figure", "display: block; float: right; width: 50px; height: 40px; margin: 0"),
        el("footer", "display: block; clear: right; height: 10px"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    assert_abs_origin(&tree, box_by_tag(&tree, "footer"), 0.0, 40.0);
}

#[test]
fn test_inline_block_moves_to_next_line_when_it_does_not_fit() {
    let engine = engine(400.0, 300.0);
    let doc = body([el("p", "display: block; width: 100px").with_children([
        text("aaaaaaaaaaaaaaaa "),
        el("span", "display: inline-block; width: 40px; height: 20px"),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    let span = box_by_tag(&tree, "span");
    assert_close(tree[span].abs_bounds.x, 0.0, "inline-block x");
    assert!(tree[span].abs_bounds.y >= LINE_HEIGHT - 0.01, "inline-block wrapped below the text");
}

#[test]
fn test_inline_block_at_line_start_is_placed_even_if_too_wide() {
    let engine = engine(400.0, 300.0);
    let doc = body([el("p", "display: block; width: 100px")
        .with_child(el("span", "display: inline-block; width: 150px; height: 20px"))]);
    let tree = engine.layout(&doc).expect("layout");

    let span = box_by_tag(&tree, "span");
    assert_close(tree[span].abs_bounds.x, 0.0, "inline-block x");
    assert!(tree[span].abs_bounds.y < LINE_HEIGHT, "inline-block stays on the first line");
    assert_close(tree[span].bounds.width, 150.0, "inline-block width");
}

#[test]
fn test_column_flex_percent_height_of_auto_parent_grows_with_items() {
    let engine = engine(400.0, 300.0);
    let item = || el("span", "display: block; height: 20px");
    let doc = body([block("").with_child(
        el("nav", "display: flex; flex-direction: column; flex-wrap: wrap; height: 50%")
            .with_children([item(), item(), item()]),
    )]);
    let tree = engine.layout(&doc).expect("layout");

    let nav = box_by_tag(&tree, "nav");
    assert_close(tree[nav].content.height, 60.0, "column flex height");
    let items = boxes_by_tag(&tree, "span");
    assert_abs_origin(&tree, items[0], 0.0, 0.0);
    assert_abs_origin(&tree, items[1], 0.0, 20.0);
    assert_abs_origin(&tree, items[2], 0.0, 40.0);
}

#[test]
fn test_column_flex_percent_height_of_fixed_parent_is_definite() {
    let engine = engine(400.0, 300.0);
    let item = || el("span", "display: block; height: 20px");
    let doc = body([block("height: 200px").with_child(
        el("nav", "display: flex; flex-direction: column; height: 50%")
            .with_children([item(), item()]),
    )]);
    let tree = engine.layout(&doc).expect("layout");

    assert_close(tree[box_by_tag(&tree, "nav")].content.height, 100.0, "column flex height");
}

#[test]
fn test_flex_wrap_reverse_stacks_lines_upwards() {
    let engine = engine(400.0, 300.0);
    let item = || el("span", "display: block; width: 40px; height: 10px; flex-shrink: 0");
    let doc = body([el("nav", "display: flex; flex-wrap: wrap-reverse; width: 100px")
        .with_children([item(), item(), item()])]);
    let tree = engine.layout(&doc).expect("layout");

    let items = boxes_by_tag(&tree, "span");
    // the first line sits at the cross end
    assert_abs_origin(&tree, items[2], 0.0, 0.0);
    assert_abs_origin(&tree, items[0], 0.0, 10.0);
    assert_abs_origin(&tree, items[1], 40.0, 10.0);
}

#[test]
fn test_flex_wrap_reverse_swaps_align_content_start_and_end() {
    let engine = engine(400.0, 300.0);
    let item = || el("span", "display: block; width: 40px; height: 10px; flex-shrink: 0");
    let doc = body([el(
        "nav",
        "display: flex; flex-wrap: wrap-reverse; align-content: flex-start; \
         width: 100px; height: 50px",
    )
    .with_children([item(), item(), item()])]);
    let tree = engine.layout(&doc).expect("layout");

    let items = boxes_by_tag(&tree, "span");
    assert_abs_origin(&tree, items[2], 0.0, 30.0);
    assert_abs_origin(&tree, items[0], 0.0, 40.0);
}

#[test]
fn test_flex_wrap_reverse_swaps_align_items_start_and_end() {
    let engine = engine(400.0, 300.0);
    let doc = body([el(
        "nav",
        "display: flex; flex-wrap: wrap-reverse; align-items: flex-start; width: 100px",
    )
    .with_children([
            el("span", "display: block; width: 40px; height: 10px"),
            el("em", "display: block; width: 40px; height: 30px"),
        ])]);
    let tree = engine.layout(&doc).expect("layout");

    assert_abs_origin(&tree, box_by_tag(&tree, "span"), 0.0, 20.0);
    assert_abs_origin(&tree, box_by_tag(&tree, "em"), 40.0, 0.0);
}

#[test]
fn test_table_rowspan_and_colspan_share_the_grid() {
    let engine = engine(400.0, 300.0);
    let cell = |content: &str| el("td", "display: table-cell").with_child(text(content));
    let doc = body([el("table", "display: table").with_children([
        el("tr", "display: table-row").with_children([
            cell("a").with_attr("colspan", "3"),
            cell("b").with_attr("rowspan", "2"),
        ]),
        el("tr", "display: table-row").with_children([cell("c"), cell("d"), cell("e"), cell("f")]),
    ])]);
    let tree = engine.layout(&doc).expect("layout");

    let cells = boxes_by_tag(&tree, "td");
    assert_eq!(cells.len(), 6);
    let column = |i: usize| tree[cells[i]].kind.cell().map(|c| (c.column, c.row));
    assert_eq!(column(0), Some((0, 0)));
    assert_eq!(column(1), Some((3, 0)));
    assert_eq!(column(2), Some((0, 1)));
    assert_eq!(column(3), Some((1, 1)));
    assert_eq!(column(4), Some((2, 1)));
    assert_eq!(column(5), Some((4, 1)));

    // no cell of the second row overlaps the spanning cell
    let b = &tree[cells[1]].abs_bounds;
    for &c in &cells[2..] {
        let r = &tree[c].abs_bounds;
        assert!(
            r.x + r.width <= b.x + 0.01 || r.x >= b.x + b.width - 0.01,
            "cell overlaps the rowspan cell"
        );
    }
}

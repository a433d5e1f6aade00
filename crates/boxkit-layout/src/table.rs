//! Table layout.
//!
//! A styled table element produces two boxes: an anonymous wrapper holding
//! the caption and the positioned children, and the table grid itself. The
//! children are organized once, right after the tree is built:
//!
//! - rows outside a row group go into an anonymous body
//! - content of a body that is not a row goes into anonymous rows
//! - content of a row that is not a cell goes into anonymous cells
//! - `<col span=N>` and column groups expand into column slots
//!
//! Column widths are negotiated on every table layout from the minimal and
//! maximal widths of the cells and the widths specified for cells and
//! columns. Rows never lay themselves out; their geometry is a side effect
//! of placing the cells.

use boxkit_css::{CaptionSide, ComputedStyle, Display, Length, VerticalAlign};
use tracing::{debug, trace};

use crate::context::CssDecoder;
use crate::intrinsic;
use crate::manager::{layout_box, LayoutCx, LayoutManager, LayoutOutcome};
use crate::sizing::update_child_sizes;
use crate::tree::{BoxId, BoxKind, BoxTree, LayoutBox};
use crate::{Rect, Size};

/// Cell spacing used when `border-spacing` is not given.
const DEFAULT_SPACING: f32 = 2.0;

/// Width specification and negotiated width of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableColumn {
    /// Number of grid columns the element stands for.
    pub span: usize,
    /// Width from the `width` attribute or style.
    pub specified: Option<Length>,
    pub min_width: f32,
    pub max_width: f32,
    /// Some cell or the column itself has a specified width.
    pub wset: bool,
    /// The specified width is a percentage.
    pub wrelative: bool,
    pub percent: f32,
    pub abs_width: f32,
    /// Width assigned by the table.
    pub width: f32,
}

impl Default for TableColumn {
    fn default() -> Self {
        Self {
            span: 1,
            specified: None,
            min_width: 0.0,
            max_width: 0.0,
            wset: false,
            wrelative: false,
            percent: 0.0,
            abs_width: 0.0,
            width: 0.0,
        }
    }
}

impl TableColumn {
    pub fn new(span: usize, specified: Option<Length>) -> Self {
        Self {
            span: span.max(1),
            specified,
            ..Self::default()
        }
    }

    /// A column with only the specification kept, ready for a new negotiation.
    fn specification(&self) -> Self {
        Self::new(self.span, self.specified)
    }
}

/// One grid column of a table.
///
/// Column elements are never drawn, so several slots may stand for the same
/// element: a `Box` slot refers to the column element itself, a `Copy` slot
/// holds a value copy of a specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnSlot {
    Box(BoxId),
    Copy(TableColumn),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableWrapperData {
    pub table: Option<BoxId>,
    pub caption: Option<BoxId>,
    pub positioned: Vec<BoxId>,
    /// Width measured by the last layout; the wrapper stays `auto` before that.
    pub pinned_width: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub header: Option<BoxId>,
    pub bodies: Vec<BoxId>,
    pub footer: Option<BoxId>,
    pub slots: Vec<ColumnSlot>,
    /// Columns as negotiated by the last layout.
    pub columns: Vec<TableColumn>,
    pub spacing: f32,
}

impl TableData {
    /// Row groups in display order.
    pub fn row_groups(&self) -> Vec<BoxId> {
        self.header
            .iter()
            .chain(self.bodies.iter())
            .chain(self.footer.iter())
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableBodyData {
    pub rows: Vec<BoxId>,
    pub column_count: usize,
    /// Cell covering each grid slot, indexed `[column][row]`.
    pub grid: Vec<Vec<Option<BoxId>>>,
}

impl TableBodyData {
    fn cell_at(&self, column: usize, row: usize) -> Option<BoxId> {
        self.grid.get(column).and_then(|rows| rows.get(row)).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRowData {
    pub cells: Vec<BoxId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableCellData {
    pub colspan: usize,
    pub rowspan: usize,
    pub row: usize,
    pub column: usize,
}

impl Default for TableCellData {
    fn default() -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            row: 0,
            column: 0,
        }
    }
}

impl TableCellData {
    pub fn new(colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan: colspan.max(1),
            rowspan: rowspan.max(1),
            ..Self::default()
        }
    }
}

// ==================== Organization ====================

fn anonymous_child(tree: &mut BoxTree, parent: BoxId, kind: BoxKind, display: Display) -> BoxId {
    let style = ComputedStyle::anonymous(&tree[parent].style, display);
    let ctx = tree[parent].ctx.clone();
    let mut b = LayoutBox::new(kind, style, ctx);
    b.anonymous = true;
    b.node = tree[parent].node;
    b.containing_block = Some(parent);
    let id = tree.push(b);
    tree[id].parent = Some(parent);
    id
}

fn is_blank(tree: &BoxTree, id: BoxId) -> bool {
    tree[id].kind.is_text() && intrinsic::is_whitespace(tree, id)
}

/// Organize the content of a table wrapper whose table box holds the
/// children of the table element.
pub fn organize(tree: &mut BoxTree, wrapper: BoxId) {
    let table = match &tree[wrapper].kind {
        BoxKind::TableWrapper(data) => data.table,
        _ => None,
    };
    let Some(table) = table else {
        return;
    };
    let mut caption = None;
    let mut positioned = Vec::new();
    let mut rest = Vec::new();
    for child in tree[table].children.clone() {
        let c = &tree[child];
        if caption.is_none() && matches!(c.kind, BoxKind::TableCaption) {
            caption = Some(child);
        } else if c.is_positioned() {
            positioned.push(child);
        } else {
            rest.push(child);
        }
    }
    tree.set_children(table, rest);

    let mut outer: Vec<BoxId> = caption.into_iter().collect();
    outer.push(table);
    outer.extend(positioned.iter().copied());
    tree.set_children(wrapper, outer);
    if let Some(caption) = caption {
        tree[caption].containing_block = Some(wrapper);
    }
    tree[table].containing_block = tree[wrapper].containing_block;

    organize_table(tree, table);
    if let BoxKind::TableWrapper(data) = &mut tree[wrapper].kind {
        data.caption = caption;
        data.positioned = positioned;
    }
    debug!(wrapper = wrapper.index(), table = table.index(), "table organized");
}

fn organize_table(tree: &mut BoxTree, table: BoxId) {
    let mut data = TableData {
        spacing: match tree[table].style.border_spacing {
            Length::Auto => DEFAULT_SPACING,
            len => CssDecoder::new(&tree[table].ctx).px(len, 0.0),
        },
        ..TableData::default()
    };
    let mut children = Vec::new();
    let mut anon_body: Option<BoxId> = None;
    for child in tree[table].children.clone() {
        let display = tree[child].style.display;
        match &tree[child].kind {
            BoxKind::TableBody(_) => {
                match display {
                    Display::TableHeaderGroup if data.header.is_none() => data.header = Some(child),
                    Display::TableFooterGroup if data.footer.is_none() => data.footer = Some(child),
                    _ => data.bodies.push(child),
                }
                tree[child].containing_block = Some(table);
                children.push(child);
            }
            BoxKind::TableColumn(col) => {
                let col = *col;
                for i in 0..col.span.max(1) {
                    data.slots.push(if i == 0 {
                        ColumnSlot::Box(child)
                    } else {
                        ColumnSlot::Copy(col)
                    });
                }
                children.push(child);
            }
            BoxKind::TableColumnGroup(_) => {
                data.slots.extend(column_group_slots(tree, child));
                children.push(child);
            }
            _ if is_blank(tree, child) => {}
            _ => {
                let body = match anon_body {
                    Some(body) => body,
                    None => {
                        let body = anonymous_child(
                            tree,
                            table,
                            BoxKind::TableBody(TableBodyData::default()),
                            Display::TableRowGroup,
                        );
                        anon_body = Some(body);
                        body
                    }
                };
                tree.append_child(body, child);
                tree[child].containing_block = Some(body);
            }
        }
    }
    if let Some(body) = anon_body {
        data.bodies.push(body);
        children.push(body);
    }
    tree.set_children(table, children);
    for body in data.row_groups() {
        organize_body(tree, body);
    }
    trace!(
        table = table.index(),
        bodies = data.bodies.len(),
        slots = data.slots.len(),
        spacing = data.spacing,
        "table structure"
    );
    tree[table].kind = BoxKind::Table(data);
}

/// Column slots of a column group. Every `<col>` of the group fills `span`
/// slots that all refer to the same element; a group without columns stands
/// for `span` columns itself.
fn column_group_slots(tree: &mut BoxTree, group: BoxId) -> Vec<ColumnSlot> {
    let group_col = match &tree[group].kind {
        BoxKind::TableColumnGroup(col) => *col,
        _ => TableColumn::default(),
    };
    let mut slots = Vec::new();
    for child in tree[group].children.clone() {
        if let BoxKind::TableColumn(col) = &mut tree[child].kind {
            if col.specified.is_none() {
                col.specified = group_col.specified;
            }
            for _ in 0..col.span.max(1) {
                slots.push(ColumnSlot::Box(child));
            }
        }
    }
    if slots.is_empty() {
        for _ in 0..group_col.span.max(1) {
            slots.push(ColumnSlot::Box(group));
        }
    }
    slots
}

fn organize_body(tree: &mut BoxTree, body: BoxId) {
    let mut rows = Vec::new();
    let mut anon_row: Option<BoxId> = None;
    for child in tree[body].children.clone() {
        if let BoxKind::TableRow(_) = tree[child].kind {
            anon_row = None;
            tree[child].containing_block = Some(body);
            rows.push(child);
        } else if !is_blank(tree, child) {
            let row = match anon_row {
                Some(row) => row,
                None => {
                    let row = anonymous_child(
                        tree,
                        body,
                        BoxKind::TableRow(TableRowData::default()),
                        Display::TableRow,
                    );
                    rows.push(row);
                    anon_row = Some(row);
                    row
                }
            };
            tree.append_child(row, child);
            tree[child].containing_block = Some(row);
        }
    }
    tree.set_children(body, rows.clone());
    for &row in &rows {
        organize_row(tree, row);
    }
    let data = compute_grid(tree, &rows);
    trace!(body = body.index(), rows = rows.len(), columns = data.column_count, "table body grid");
    tree[body].kind = BoxKind::TableBody(data);
}

fn organize_row(tree: &mut BoxTree, row: BoxId) {
    let mut cells = Vec::new();
    let mut anon_cell: Option<BoxId> = None;
    for child in tree[row].children.clone() {
        if let BoxKind::TableCell(_) = tree[child].kind {
            anon_cell = None;
            cells.push(child);
        } else if !is_blank(tree, child) {
            let cell = match anon_cell {
                Some(cell) => cell,
                None => {
                    let cell = anonymous_child(
                        tree,
                        row,
                        BoxKind::TableCell(TableCellData::default()),
                        Display::TableCell,
                    );
                    cells.push(cell);
                    anon_cell = Some(cell);
                    cell
                }
            };
            tree.append_child(cell, child);
            tree[child].containing_block = Some(cell);
        }
    }
    for &cell in &cells {
        tree[cell].containing_block = Some(row);
        if tree[cell].anonymous {
            crate::factory::normalize_block_children(tree, cell);
        }
    }
    tree.set_children(row, cells.clone());
    tree[row].kind = BoxKind::TableRow(TableRowData { cells });
}

fn cell_data(tree: &BoxTree, cell: BoxId) -> TableCellData {
    tree[cell].kind.cell().copied().unwrap_or_default()
}

fn set_cell_data(tree: &mut BoxTree, cell: BoxId, data: TableCellData) {
    if let BoxKind::TableCell(d) = &mut tree[cell].kind {
        *d = data;
    }
}

fn row_cells(tree: &BoxTree, row: BoxId) -> &[BoxId] {
    match &tree[row].kind {
        BoxKind::TableRow(data) => &data.cells,
        _ => &[],
    }
}

/// Assign grid positions to the cells of `rows` honoring the spans.
fn compute_grid(tree: &mut BoxTree, rows: &[BoxId]) -> TableBodyData {
    let nrows = rows.len();
    let mut next_col = vec![0usize; nrows];
    let mut cursor = vec![0usize; nrows];
    let mut taken: Vec<Vec<bool>> = vec![Vec::new(); nrows];
    let mut columns = 0usize;
    let mut col = 0usize;
    let mut found = true;
    // rounds advance column by column; a row places its next cell only once
    // the round reaches the row's first free slot, so rows pushed right by a
    // span cannot overtake a spanning cell from above
    while found {
        found = false;
        let mut r = 0;
        while r < nrows {
            let Some(&cell) = row_cells(tree, rows[r]).get(cursor[r]) else {
                r += 1;
                continue;
            };
            found = true;
            while taken[r].get(next_col[r]).copied().unwrap_or(false) {
                next_col[r] += 1;
            }
            if next_col[r] > col {
                r += 1;
                continue;
            }
            cursor[r] += 1;
            let mut data = cell_data(tree, cell);
            data.column = next_col[r];
            data.row = r;
            data.rowspan = data.rowspan.min(nrows - r).max(1);
            let end = data.column + data.colspan;
            for slots in taken.iter_mut().skip(r).take(data.rowspan) {
                if slots.len() < end {
                    slots.resize(end, false);
                }
                slots[data.column..end].fill(true);
            }
            next_col[r] = end;
            columns = columns.max(end);
            set_cell_data(tree, cell, data);
            r += data.rowspan;
        }
        col += 1;
    }

    let mut grid = vec![vec![None; nrows]; columns];
    for &row in rows {
        for &cell in row_cells(tree, row) {
            let data = cell_data(tree, cell);
            for column in grid.iter_mut().skip(data.column).take(data.colspan) {
                for slot in column.iter_mut().skip(data.row).take(data.rowspan) {
                    *slot = Some(cell);
                }
            }
        }
    }
    TableBodyData {
        rows: rows.to_vec(),
        column_count: columns,
        grid,
    }
}

// ==================== Intrinsic widths ====================

fn body_data(tree: &BoxTree, body: BoxId) -> Option<&TableBodyData> {
    match &tree[body].kind {
        BoxKind::TableBody(data) => Some(data),
        _ => None,
    }
}

/// Largest per-column share of the cells of `column`.
fn column_width(
    tree: &BoxTree,
    body: &TableBodyData,
    column: usize,
    width: fn(&BoxTree, BoxId) -> f32,
) -> f32 {
    let mut ret = 0.0f32;
    let mut r = 0;
    while r < body.rows.len() {
        match body.cell_at(column, r) {
            Some(cell) => {
                let data = cell_data(tree, cell);
                ret = ret.max(width(tree, cell) / data.colspan as f32);
                r += data.rowspan.max(1);
            }
            None => r += 1,
        }
    }
    ret
}

fn body_width(tree: &BoxTree, body: BoxId, spacing: f32, width: fn(&BoxTree, BoxId) -> f32) -> f32 {
    let Some(data) = body_data(tree, body) else {
        return 0.0;
    };
    (0..data.column_count).fold(spacing, |sum, c| {
        sum + column_width(tree, data, c, width) + spacing
    })
}

fn table_width(tree: &BoxTree, id: BoxId, width: fn(&BoxTree, BoxId) -> f32) -> f32 {
    let b = &tree[id];
    match &b.kind {
        BoxKind::TableWrapper(data) => {
            let table = data.table.map_or(0.0, |t| table_width(tree, t, width));
            let caption = data.caption.map_or(0.0, |c| width(tree, c));
            table.max(caption) + b.decl_margin.horizontal()
        }
        BoxKind::Table(data) => {
            let inner = data
                .row_groups()
                .into_iter()
                .map(|body| body_width(tree, body, data.spacing, width))
                .fold(0.0, f32::max);
            inner + b.border.horizontal() + b.padding.horizontal()
        }
        _ => 0.0,
    }
}

/// Minimal width of a table or table wrapper.
pub fn minimal_width(tree: &BoxTree, id: BoxId) -> f32 {
    table_width(tree, id, intrinsic::minimal_width)
}

/// Maximal width of a table or table wrapper.
pub fn maximal_width(tree: &BoxTree, id: BoxId) -> f32 {
    table_width(tree, id, intrinsic::maximal_width)
}

// ==================== Column widths ====================

fn slot_column(tree: &BoxTree, slot: &ColumnSlot) -> TableColumn {
    match slot {
        ColumnSlot::Box(id) => match &tree[*id].kind {
            BoxKind::TableColumn(col) | BoxKind::TableColumnGroup(col) => col.specification(),
            _ => TableColumn::default(),
        },
        ColumnSlot::Copy(col) => col.specification(),
    }
}

/// Fold the cells of one body into the column statistics.
fn update_columns(tree: &BoxTree, body: BoxId, columns: &mut [TableColumn]) {
    let Some(data) = body_data(tree, body) else {
        return;
    };
    for (c, col) in columns.iter_mut().enumerate().take(data.column_count) {
        let mut r = 0;
        while r < data.rows.len() {
            let Some(cell) = data.cell_at(c, r) else {
                r += 1;
                continue;
            };
            let span = cell_data(tree, cell);
            let colspan = span.colspan as f32;
            col.min_width = col.min_width.max(intrinsic::minimal_width(tree, cell) / colspan);
            col.max_width = col.max_width.max(intrinsic::maximal_width(tree, cell) / colspan);
            let cb = &tree[cell];
            match cb.style.width {
                Length::Auto => {}
                Length::Percent(pct) if pct > 0.0 => {
                    col.wset = true;
                    col.wrelative = true;
                    col.percent = col.percent.max(pct);
                }
                len => {
                    col.wset = true;
                    let w = CssDecoder::new(&cb.ctx).px(len, 0.0);
                    col.abs_width = col.abs_width.max(w);
                }
            }
            if col.width < col.min_width {
                col.width = col.min_width;
            }
            r += span.rowspan.max(1);
        }
    }
}

/// Negotiate the column widths of `table` for a content width limit `wlimit`.
pub fn calculate_columns(tree: &BoxTree, table: BoxId, wlimit: f32) -> Vec<TableColumn> {
    let b = &tree[table];
    let BoxKind::Table(data) = &b.kind else {
        return Vec::new();
    };
    let groups = data.row_groups();
    let count = groups
        .iter()
        .filter_map(|&g| body_data(tree, g))
        .map(|d| d.column_count)
        .max()
        .unwrap_or(0);
    let dec = CssDecoder::new(&b.ctx);
    let mut columns: Vec<TableColumn> = data.slots.iter().map(|s| slot_column(tree, s)).collect();
    columns.resize(count.max(columns.len()), TableColumn::default());
    for col in columns.iter_mut() {
        match col.specified {
            Some(Length::Percent(pct)) if pct > 0.0 => {
                col.wset = true;
                col.wrelative = true;
                col.percent = pct;
            }
            Some(Length::Auto) | None => {}
            Some(len) => {
                col.wset = true;
                col.abs_width = dec.px(len, b.content.width);
            }
        }
    }
    for &group in &groups {
        update_columns(tree, group, &mut columns);
    }

    let mut sum_abs = 0.0f32;
    let mut sum_perc = 0.0f32;
    let mut min_total = 0.0f32;
    let mut auto_min = 0.0f32;
    let mut auto_max = 0.0f32;
    let mut total_perc = 0.0f32;
    for col in &columns {
        min_total += col.min_width;
        if col.wrelative {
            sum_perc += col.percent;
            total_perc = total_perc.max(col.max_width * 100.0 / col.percent);
        } else if col.wset {
            sum_abs += col.abs_width;
        } else {
            auto_min += col.width;
            auto_max += col.max_width;
        }
    }

    let spacing_total = (columns.len() + 1) as f32 * data.spacing;
    let limit = (wlimit - spacing_total).max(0.0);
    let total_perc = total_perc.min(limit);
    let total_abs = if sum_abs + auto_max > 0.0 {
        let abs_part = 100.0 - sum_perc;
        if abs_part <= 0.0 {
            limit
        } else {
            (sum_abs + auto_max) * 100.0 / abs_part
        }
    } else {
        0.0
    };
    let mut total = total_perc.max(total_abs);
    if b.flags.wset {
        total = b.content.width - spacing_total;
    } else if total > limit {
        total = limit;
    }
    total = total.max(min_total);

    let mut remain = total;
    let mut remain_min = min_total;
    let mut assign = |col: &mut TableColumn, wanted: f32, remain: &mut f32, remain_min: &mut f32| {
        *remain_min -= col.min_width;
        let w = wanted.min(*remain).min(*remain - *remain_min).max(col.min_width);
        col.width = w;
        *remain -= w;
    };
    if sum_perc > 0.0 {
        for col in columns.iter_mut().filter(|c| c.wrelative) {
            let wanted = col.percent * total / 100.0;
            assign(col, wanted, &mut remain, &mut remain_min);
        }
    }
    if sum_abs > 0.0 {
        // absolute columns stretch to fill the table when nothing else can
        let factor = if auto_min == 0.0 { remain / sum_abs } else { 1.0 };
        for col in columns.iter_mut().filter(|c| c.wset && !c.wrelative) {
            let wanted = col.abs_width * factor;
            assign(col, wanted, &mut remain, &mut remain_min);
        }
    }
    if auto_min > 0.0 || auto_max > 0.0 {
        let factor = if auto_max > 0.0 { remain / auto_max } else { 1.0 };
        for col in columns.iter_mut().filter(|c| !c.wset) {
            let wanted = col.max_width * factor;
            assign(col, wanted, &mut remain, &mut remain_min);
        }
    }
    debug!(
        table = table.index(),
        columns = columns.len(),
        total,
        min_total,
        widths = ?columns.iter().map(|c| c.width).collect::<Vec<_>>(),
        "table columns distributed"
    );
    columns
}

// ==================== Layout ====================

fn set_cell_width(tree: &mut BoxTree, cell: BoxId, width: f32) {
    {
        let b = &mut tree[cell];
        b.content.width = (width - b.border.horizontal() - b.padding.horizontal()).max(0.0);
        b.bounds.width = width;
        b.flags.wset = true;
        b.flags.hset = false;
    }
    update_child_sizes(tree, cell);
}

fn set_cell_height(tree: &mut BoxTree, cell: BoxId, height: f32) {
    let b = &mut tree[cell];
    b.content.height = (height - b.border.vertical() - b.padding.vertical()).max(0.0);
    b.bounds.height = height;
    b.flags.hset = true;
}

/// Baseline of the first line of a cell from its border box top.
fn cell_baseline(tree: &BoxTree, cell: BoxId) -> f32 {
    let b = &tree[cell];
    let inner = intrinsic::first_inline_baseline(tree, cell).unwrap_or(b.content.height);
    inner + b.border.top + b.padding.top
}

/// Move the content of a stretched cell according to its `vertical-align`.
fn align_cell_content(tree: &mut BoxTree, cell: BoxId, inner_height: f32, row_baseline: f32) {
    let b = &tree[cell];
    let free = b.content.height - inner_height;
    let offset = match b.style.vertical_align {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Bottom => free,
        VerticalAlign::Baseline => {
            (row_baseline - cell_baseline(tree, cell)).clamp(0.0, free.max(0.0))
        }
        _ => free / 2.0,
    };
    if offset > 0.0 {
        for child in tree[cell].sub_boxes().to_vec() {
            tree[child].move_down(offset);
        }
    }
}

fn layout_body(
    cx: &mut LayoutCx<'_>,
    body: BoxId,
    wlimit: f32,
    columns: &[TableColumn],
    spacing: f32,
) {
    let Some(data) = body_data(cx.tree, body).cloned() else {
        return;
    };
    cx.tree[body].avail_width = wlimit;
    let nrows = data.rows.len();
    let mut row_y = vec![0.0f32; nrows];
    let mut row_baseline = vec![0.0f32; nrows];
    let mut inner_height = std::collections::HashMap::new();
    let col_width = |c: usize| columns.get(c).map_or(0.0, |col| col.width);
    let mut y = spacing;
    let mut maxw = 0.0f32;

    for r in 0..nrows {
        let mut x = spacing;
        let mut maxh = 0.0f32;
        let mut c = 0;
        while c < data.column_count {
            let Some(cell) = data.cell_at(c, r) else {
                c += 1;
                continue;
            };
            let span = cell_data(cx.tree, cell);
            let last = span.row + span.rowspan - 1;
            let cw = (1..span.colspan).fold(col_width(c), |w, i| w + spacing + col_width(c + i));
            if r == span.row {
                set_cell_width(cx.tree, cell, cw);
                layout_box(cx, cell, wlimit, true, true);
                cx.tree[cell].set_position(x, 0.0);
                inner_height.insert(cell, cx.tree[cell].content.height);
                if cx.tree[cell].style.vertical_align == VerticalAlign::Baseline {
                    row_baseline[r] = row_baseline[r].max(cell_baseline(cx.tree, cell));
                }
                if span.rowspan == 1 {
                    maxh = maxh.max(cx.tree[cell].height());
                }
            } else if r == last {
                let remain = cx.tree[cell].height() - (y - row_y[span.row]);
                maxh = maxh.max(remain);
            }
            x += cw + spacing;
            c += span.colspan;
        }

        row_y[r] = y;
        let mut c = 0;
        while c < data.column_count {
            let Some(cell) = data.cell_at(c, r) else {
                c += 1;
                continue;
            };
            let span = cell_data(cx.tree, cell);
            if span.row + span.rowspan - 1 == r {
                let start_y = row_y[span.row];
                set_cell_height(cx.tree, cell, y + maxh - start_y);
                let inner = inner_height.get(&cell).copied().unwrap_or(0.0);
                align_cell_content(cx.tree, cell, inner, row_baseline[span.row]);
            }
            c += span.colspan;
        }

        let row = &mut cx.tree[data.rows[r]];
        row.set_position(0.0, y);
        row.content = Size::new(x, maxh);
        let (w, h) = (row.total_width(), row.total_height());
        row.set_size(w, h);
        maxw = maxw.max(x);
        y += maxh + spacing;
    }

    let b = &mut cx.tree[body];
    b.content = Size::new(maxw, y);
    let (w, h) = (b.total_width(), b.total_height());
    b.set_size(w, h);
}

/// Layout of the table grid.
pub struct TableLayout;

impl LayoutManager for TableLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        _force: bool,
        _line_start: bool,
    ) -> LayoutOutcome {
        {
            let b = &mut cx.tree[id];
            if !b.displayed {
                b.content = Size::zero();
                b.bounds = Rect::zero();
                return LayoutOutcome::fit();
            }
            b.avail_width = avail_width;
        }
        let wlimit = cx.tree[id].available_content_width();
        let columns = calculate_columns(cx.tree, id, wlimit);
        let (groups, spacing) = match &cx.tree[id].kind {
            BoxKind::Table(data) => (data.row_groups(), data.spacing),
            _ => (Vec::new(), 0.0),
        };
        let mut y = 0.0f32;
        let mut maxw = 0.0f32;
        for group in groups {
            layout_body(cx, group, wlimit, &columns, spacing);
            let g = &mut cx.tree[group];
            g.set_position(0.0, y);
            maxw = maxw.max(g.width());
            y += g.height();
        }
        let b = &mut cx.tree[id];
        if let BoxKind::Table(data) = &mut b.kind {
            data.columns = columns;
        }
        b.content = Size::new(maxw, y);
        b.flags.width_computed = true;
        let (w, h) = (b.total_width(), b.total_height());
        b.set_size(w, h);
        LayoutOutcome::fit()
    }
}

/// Layout of the anonymous wrapper holding the table and its caption.
pub struct TableWrapperLayout;

impl LayoutManager for TableWrapperLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        _force: bool,
        _line_start: bool,
    ) -> LayoutOutcome {
        {
            let b = &mut cx.tree[id];
            if !b.displayed {
                b.content = Size::zero();
                b.bounds = Rect::zero();
                return LayoutOutcome::fit();
            }
            b.avail_width = avail_width;
        }
        let data = match &cx.tree[id].kind {
            BoxKind::TableWrapper(data) => data.clone(),
            _ => TableWrapperData::default(),
        };
        let wlimit = cx.tree[id].available_content_width();
        let (mut tw, mut th) = (0.0f32, 0.0f32);
        if let Some(table) = data.table {
            layout_box(cx, table, wlimit, true, true);
            tw = cx.tree[table].width();
            th = cx.tree[table].height();
        }
        let (mut cw, mut ch) = (0.0f32, 0.0f32);
        if let Some(caption) = data.caption {
            {
                let c = &mut cx.tree[caption];
                let w = tw - c.margin.horizontal() - c.border.horizontal() - c.padding.horizontal();
                c.set_content_width(w.max(0.0));
            }
            update_child_sizes(cx.tree, caption);
            crate::block::set_own_floats(cx.tree, caption);
            layout_box(cx, caption, tw, true, true);
            cw = cx.tree[caption].width();
            ch = cx.tree[caption].height();
        }
        let caption_top = cx.tree[id].style.caption_side == CaptionSide::Top;
        if let Some(table) = data.table {
            let y = if caption_top { ch } else { 0.0 };
            cx.tree[table].set_position(0.0, y);
        }
        if let Some(caption) = data.caption {
            let y = if caption_top { 0.0 } else { th };
            cx.tree[caption].set_position(0.0, y);
        }
        for &p in &data.positioned {
            crate::block::set_own_floats(cx.tree, p);
            layout_box(cx, p, wlimit, true, true);
            cx.tree[p].block.static_position = Some((0.0, 0.0));
        }

        let b = &mut cx.tree[id];
        b.content = Size::new(tw.max(cw), th + ch);
        b.flags.wset = true;
        b.flags.width_computed = true;
        if let BoxKind::TableWrapper(d) = &mut b.kind {
            d.pinned_width = Some(tw.max(cw));
        }
        let (w, h) = (b.total_width(), b.total_height());
        b.set_size(w, h);
        trace!(box_id = id.index(), width = w, height = h, "table wrapper laid out");
        LayoutOutcome::fit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_span_defaults_to_one() {
        assert_eq!(TableColumn::new(0, None).span, 1);
        assert_eq!(TableCellData::new(0, 3).colspan, 1);
        assert_eq!(TableCellData::new(2, 3).rowspan, 3);
    }

    #[test]
    fn test_specification_drops_negotiated_widths() {
        let mut col = TableColumn::new(2, Some(Length::Px(40.0)));
        col.width = 99.0;
        col.min_width = 10.0;
        let spec = col.specification();
        assert_eq!(spec.width, 0.0);
        assert_eq!(spec.min_width, 0.0);
        assert_eq!(spec.span, 2);
        assert_eq!(spec.specified, Some(Length::Px(40.0)));
    }

    #[test]
    fn test_row_groups_order() {
        let data = TableData {
            header: Some(BoxId(3)),
            bodies: vec![BoxId(1), BoxId(2)],
            footer: Some(BoxId(4)),
            ..TableData::default()
        };
        assert_eq!(data.row_groups(), vec![BoxId(3), BoxId(1), BoxId(2), BoxId(4)]);
    }
}

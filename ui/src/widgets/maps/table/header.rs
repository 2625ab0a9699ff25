//! Table header: sortable titles and drag-to-resize borders.

use egui::{Button, CursorIcon, Rect, RichText, Sense, Stroke, Ui};
use egui_extras::TableRow;
use mapconsole_business::maps::{COLUMNS, ColumnDescriptor, ColumnWidths, ListParams, SortOrder};

use super::columns::RESIZE_HANDLE_WIDTH;
use crate::widgets::maps::state::PanelAction;

/// Renders every header cell and returns the sort or resize the user made.
///
/// Double-clicking a dragged border restores the column's default width.
pub fn render_table_header(
    header: &mut TableRow<'_, '_>,
    params: &ListParams,
    widths: &ColumnWidths,
) -> Option<PanelAction> {
    let mut action = None;
    for (index, column) in COLUMNS.iter().enumerate() {
        let width = widths.width(index).unwrap_or(column.default_width);
        let overridden = widths.is_overridden(index);
        header.col(|ui| {
            if let Some(clicked) = render_header_cell(ui, index, column, params, width, overridden) {
                action = Some(clicked);
            }
        });
    }
    action
}

fn header_title(column: &ColumnDescriptor, params: &ListParams) -> String {
    let order = column.field().and_then(|field| params.sort_order_of(field));
    match order {
        Some(SortOrder::Ascend) => format!("{} ▲", column.title),
        Some(SortOrder::Descend) => format!("{} ▼", column.title),
        None => column.title.to_owned(),
    }
}

fn render_header_cell(
    ui: &mut Ui,
    index: usize,
    column: &ColumnDescriptor,
    params: &ListParams,
    width: f32,
    overridden: bool,
) -> Option<PanelAction> {
    let mut action = None;
    let title = RichText::new(header_title(column, params)).strong();

    match column.field() {
        Some(field) if column.sortable => {
            let response = ui
                .add(Button::new(title).frame(false))
                .on_hover_text("点击排序");
            if response.clicked() {
                action = Some(PanelAction::Sort(field));
            }
        }
        _ => {
            ui.label(title);
        }
    }

    let cell = ui.max_rect();
    let handle = Rect::from_x_y_ranges(
        (cell.right() - RESIZE_HANDLE_WIDTH)..=cell.right(),
        cell.y_range(),
    );
    let response = ui
        .interact(handle, ui.id().with(("resize_column", index)), Sense::click_and_drag())
        .on_hover_cursor(CursorIcon::ResizeColumn);
    let delta = response.drag_delta().x;
    if response.dragged() && delta != 0.0 {
        action = Some(PanelAction::Resize {
            index,
            width: width + delta,
        });
    } else if overridden && response.double_clicked() {
        action = Some(PanelAction::ResetWidth(index));
    }

    let stroke = if response.hovered() || response.dragged() {
        ui.visuals().widgets.hovered.fg_stroke
    } else {
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
    };
    ui.painter()
        .vline(cell.right(), cell.top()..=cell.bottom(), stroke);

    action
}

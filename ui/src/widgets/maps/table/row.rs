//! Row rendering for the map-version table.

use egui_extras::TableRow;
use mapconsole_business::maps::{
    COLUMNS, ColumnKind, Field, MapVersion, RowPatch, TableError, cell_text,
};

use super::cells::{
    render_action_buttons, render_edit_cell, render_status_cell, render_text_cell,
};
use crate::widgets::maps::state::PanelAction;

/// Renders one map version.
///
/// `draft` is `Some` for the row under edit: editable columns become text
/// inputs bound to it, everything else stays read-only.
pub fn render_version_row(
    table_row: &mut TableRow<'_, '_>,
    row: &MapVersion,
    mut draft: Option<&mut RowPatch>,
    error: Option<&TableError>,
) -> Option<PanelAction> {
    let mut action = None;
    let editing = draft.is_some();

    for column in &COLUMNS {
        table_row.col(|ui| match column.kind {
            ColumnKind::Data(field) => match draft.as_deref_mut() {
                Some(draft) if column.editable => render_edit_cell(ui, draft, field, error),
                _ if field == Field::MapStatus => render_status_cell(ui, row.map_status),
                _ => render_text_cell(ui, &cell_text(row, field)),
            },
            ColumnKind::Actions => {
                action = render_action_buttons(ui, &row.map_version_id, row.map_status, editing);
            }
        });
    }
    action
}

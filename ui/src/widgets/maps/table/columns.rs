//! Column layout for the map-version table.

use egui_extras::Column;
use mapconsole_business::maps::{COLUMNS, ColumnWidths};

pub const ROW_HEIGHT: f32 = 30.0;
pub const HEADER_HEIGHT: f32 = 28.0;
/// Drag zone at the right edge of each header cell.
pub const RESIZE_HANDLE_WIDTH: f32 = 6.0;

/// Effective width of every column, overrides included.
pub fn column_widths(widths: &ColumnWidths) -> Vec<f32> {
    (0..COLUMNS.len())
        .filter_map(|index| widths.width(index))
        .collect()
}

/// Exact columns: widths are owned by `VersionTable`, not by egui memory.
#[inline]
pub fn table_columns(widths: &[f32]) -> Vec<Column> {
    widths
        .iter()
        .map(|&width| Column::exact(width).clip(true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_cover_every_column() {
        let mut widths = ColumnWidths::default();
        widths.resize(2, 333.0).unwrap();

        let resolved = column_widths(&widths);

        assert_eq!(resolved.len(), COLUMNS.len());
        assert_eq!(resolved[2], 333.0);
        assert_eq!(resolved[0], COLUMNS[0].default_width);
        assert_eq!(table_columns(&resolved).len(), COLUMNS.len());
    }
}

//! Column descriptors for the map-version table.
//!
//! Pure data: which field a column shows, its title and what the user may do
//! with it. Rendering lives in the UI crate.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::error::TableError;
use super::model::{Field, MapVersion};

/// Columns never shrink below this width.
pub const MIN_COLUMN_WIDTH: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Data(Field),
    /// Row actions (编辑 / 删除 / 发布 / 下线).
    Actions,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDescriptor {
    pub kind: ColumnKind,
    pub title: &'static str,
    pub sortable: bool,
    pub editable: bool,
    pub required: bool,
    pub default_width: f32,
}

impl ColumnDescriptor {
    const fn data(field: Field, title: &'static str, default_width: f32) -> Self {
        Self {
            kind: ColumnKind::Data(field),
            title,
            sortable: false,
            editable: false,
            required: false,
            default_width,
        }
    }

    const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn field(&self) -> Option<Field> {
        match self.kind {
            ColumnKind::Data(field) => Some(field),
            ColumnKind::Actions => None,
        }
    }
}

pub static COLUMNS: [ColumnDescriptor; 11] = [
    ColumnDescriptor::data(Field::MapVersionId, "地图版本号", 120.0)
        .sortable()
        .editable()
        .required(),
    ColumnDescriptor::data(Field::MapFilePath, "地图文件目录", 160.0)
        .editable()
        .required(),
    ColumnDescriptor::data(Field::MapFileName, "地图文件名", 140.0)
        .editable()
        .required(),
    ColumnDescriptor::data(Field::MapFileSize, "地图文件大小", 100.0).editable(),
    ColumnDescriptor::data(Field::ManifestFilePath, "清单文件目录", 160.0).editable(),
    ColumnDescriptor::data(Field::ManifestFileName, "清单文件名", 140.0).editable(),
    ColumnDescriptor::data(Field::ManifestFileSize, "清单文件大小", 100.0).editable(),
    ColumnDescriptor::data(Field::CreatedAt, "上传时间", 150.0).sortable(),
    ColumnDescriptor::data(Field::UpdatedAt, "更新时间", 150.0).sortable(),
    ColumnDescriptor::data(Field::MapStatus, "状态", 100.0),
    ColumnDescriptor {
        kind: ColumnKind::Actions,
        title: "操作",
        sortable: false,
        editable: false,
        required: false,
        default_width: 200.0,
    },
];

pub fn column_index(field: Field) -> usize {
    COLUMNS
        .iter()
        .position(|column| column.kind == ColumnKind::Data(field))
        .unwrap_or_default()
}

pub fn descriptor(field: Field) -> &'static ColumnDescriptor {
    &COLUMNS[column_index(field)]
}

pub fn required_fields() -> impl Iterator<Item = Field> {
    COLUMNS
        .iter()
        .filter(|column| column.required)
        .filter_map(ColumnDescriptor::field)
}

/// Width overrides set by dragging column borders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnWidths {
    overrides: BTreeMap<usize, f32>,
}

impl ColumnWidths {
    /// Effective width of column `index`, `None` past the last column.
    pub fn width(&self, index: usize) -> Option<f32> {
        let column = COLUMNS.get(index)?;
        Some(
            self.overrides
                .get(&index)
                .copied()
                .unwrap_or(column.default_width),
        )
    }

    /// Store a new width for one column and return the width actually kept.
    pub fn resize(&mut self, index: usize, width: f32) -> Result<f32, TableError> {
        if index >= COLUMNS.len() {
            return Err(TableError::ColumnOutOfRange { index });
        }
        if !width.is_finite() {
            return Err(TableError::InvalidWidth { width });
        }
        let width = width.max(MIN_COLUMN_WIDTH);
        self.overrides.insert(index, width);
        Ok(width)
    }

    pub fn is_overridden(&self, index: usize) -> bool {
        self.overrides.contains_key(&index)
    }

    /// Drop the override of one column. Returns `false` when there was none.
    pub fn reset_column(&mut self, index: usize) -> bool {
        self.overrides.remove(&index).is_some()
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Read-only text of `field` for `row`.
pub fn cell_text(row: &MapVersion, field: Field) -> Cow<'_, str> {
    match field {
        Field::CreatedAt => row
            .created_at
            .as_ref()
            .map(|ts| Cow::Owned(format_timestamp(ts)))
            .unwrap_or_default(),
        Field::UpdatedAt => row
            .updated_at
            .as_ref()
            .map(|ts| Cow::Owned(format_timestamp(ts)))
            .unwrap_or_default(),
        Field::MapStatus => Cow::Borrowed(row.map_status.map(|s| s.label()).unwrap_or_default()),
        text => Cow::Borrowed(row.text(text).unwrap_or_default()),
    }
}

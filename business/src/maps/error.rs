use thiserror::Error;
use ustr::Ustr;

use super::model::Field;

/// Rejected table operations. None of these change the table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Another row is mid-edit; it has to be saved or cancelled first.
    #[error("save current edit first: row {editing} is being edited")]
    ConcurrentEdit { editing: Ustr },

    #[error("{field} is required")]
    Required { field: Field },

    #[error("mapVersionId {key} already exists")]
    DuplicateKey { key: String },

    #[error("row {0} not found")]
    RowNotFound(String),

    #[error("row {0} is not being edited")]
    NotEditing(String),

    #[error("no row is being edited")]
    NoActiveEdit,

    #[error("column {index} does not exist")]
    ColumnOutOfRange { index: usize },

    #[error("invalid column width {width}")]
    InvalidWidth { width: f32 },
}

impl TableError {
    /// Validation failures are shown inline and keep the row in edit mode.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Required { .. } | Self::DuplicateKey { .. })
    }

    /// The field to highlight for a validation failure.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Required { field } => Some(*field),
            Self::DuplicateKey { .. } => Some(Field::MapVersionId),
            _ => None,
        }
    }
}

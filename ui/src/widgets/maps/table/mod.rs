//! Table components for the map-version panel.
//!
//! - `columns`: column widths and layout constants
//! - `header`: header row with sort toggles and resize handles
//! - `row`: one map version, read-only or in edit mode
//! - `cells`: cell renderers

mod cells;
pub mod columns;
pub mod header;
pub mod row;

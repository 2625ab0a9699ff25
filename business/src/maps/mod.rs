//! Map-version domain module.
//!
//! Home of everything the map-version table needs apart from rendering:
//! the row model, column descriptors, list parameters, the table state
//! stored in `StateCtx`, the listing API and the load command.
//!
//! UI code reads `VersionTable` and calls its operations; network IO only
//! happens in `LoadMapsCommand`.

pub mod api;
pub mod columns;
pub mod error;
pub mod load_command;
pub mod model;
pub mod params;
pub mod table;

pub use api::{MapPage, MapsApiError, list_maps};
pub use columns::{
    COLUMNS, ColumnDescriptor, ColumnKind, ColumnWidths, MIN_COLUMN_WIDTH, cell_text,
    column_index, descriptor, format_timestamp, required_fields,
};
pub use error::TableError;
pub use load_command::{
    LoadMapsCommand, MapListCompute, MapListInput, MapListResult, cancel_load, load_maps,
    register_maps, reload_maps, sync_maps,
};
pub use model::{Field, MapStatus, MapVersion, RowPatch};
pub use params::{DEFAULT_PAGE_SIZE, ListParams, SortOrder, Sorter};
pub use table::{
    EditState, NOTIFICATION_TTL_SECONDS, Notification, NotificationLevel, Pagination,
    VersionTable,
};

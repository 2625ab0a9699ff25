//! Map-version management panel.
//!
//! - `state`: UI-only panel state and the actions a frame can produce
//! - `panel`: the panel widget and action handling
//! - `table`: table rendering components (columns, header, row, cells)

mod panel;
mod state;
pub mod table;

pub use panel::{apply_action, version_panel};
pub use state::{PanelAction, VersionPanelState};

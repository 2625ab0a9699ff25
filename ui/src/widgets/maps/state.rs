//! UI-only state of the version panel.

use mapconsole_business::maps::{Field, MapStatus};

/// Something the user asked for this frame, applied after rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    Reload,
    AddRow,
    Edit(String),
    Save(String),
    Cancel(String),
    /// Opens the delete confirmation.
    Delete(String),
    ConfirmDelete(String),
    Publish(String),
    TakeOffline(String),
    Sort(Field),
    Resize { index: usize, width: f32 },
    ResetWidth(usize),
    Page(u32),
    PageSize(u32),
    Filter(Option<MapStatus>),
    DismissNotification(usize),
}

/// State for the version panel that is not part of the table itself.
#[derive(Debug, Default)]
pub struct VersionPanelState {
    /// Row waiting for delete confirmation.
    pub(crate) pending_delete: Option<String>,
    pub(crate) status_filter: Option<MapStatus>,
    /// Set once the first load has been dispatched.
    pub(crate) initial_load_sent: bool,
}

impl VersionPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn status_filter(&self) -> Option<MapStatus> {
        self.status_filter
    }
}

mod maps;

pub use maps::{PanelAction, VersionPanelState, apply_action, table, version_panel};

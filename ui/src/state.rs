use mapconsole_business::BusinessConfig;
use mapconsole_business::maps::register_maps;
use mapconsole_states::{StateCtx, Time};

use crate::widgets::VersionPanelState;

/// The main application state.
pub struct State {
    /// The state context for business logic.
    pub ctx: StateCtx,
    /// Panel state that never leaves the UI.
    pub panel: VersionPanelState,
}

impl Default for State {
    /// Configuration comes from the environment; invalid values are logged
    /// and replaced by defaults.
    fn default() -> Self {
        let config = BusinessConfig::from_env().unwrap_or_else(|err| {
            log::error!("invalid configuration, using defaults: {err:#}");
            BusinessConfig::default()
        });
        Self::with_config(config)
    }
}

impl State {
    pub fn with_config(config: BusinessConfig) -> Self {
        let mut ctx = StateCtx::new();

        ctx.add_state(Time::default());
        register_maps(&mut ctx, config);

        Self {
            ctx,
            panel: VersionPanelState::new(),
        }
    }

    pub fn test(base_url: String) -> Self {
        Self::with_config(BusinessConfig::new(base_url))
    }

    pub fn config(&self) -> Option<&BusinessConfig> {
        self.ctx.try_state::<BusinessConfig>().ok()
    }
}

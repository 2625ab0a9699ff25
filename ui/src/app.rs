use std::time::Duration;

use chrono::Utc;
use mapconsole_business::maps::{VersionTable, sync_maps};
use mapconsole_states::Time;

use crate::{state::State, widgets};

/// Repaint interval while a load is running or a notification is visible.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct MapConsoleApp {
    pub state: State,
}

impl MapConsoleApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self { state }
    }
}

impl eframe::App for MapConsoleApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Utc::now();
        self.state.ctx.update::<Time>(|time| *time.as_mut() = now);

        // Pull finished loads into the table before anything renders.
        self.state.ctx.sync_updates();
        sync_maps(&mut self.state.ctx, now);
        self.state
            .ctx
            .update::<VersionTable>(|table| table.expire_notifications(now));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.heading("地图版本管理");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            widgets::version_panel(&mut self.state.ctx, &mut self.state.panel, ui);
        });

        let busy = self
            .state
            .ctx
            .try_state::<VersionTable>()
            .is_ok_and(|table| table.is_loading() || !table.notifications().is_empty());
        if busy {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}

//! Map-version list compute + load command.
//!
//! `MapListCompute` caches the status of the newest load. `LoadMapsCommand`
//! performs the request and publishes into it; the UI copies a finished result
//! into `VersionTable` with [`sync_maps`].

use std::any::Any;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use mapconsole_states::{
    Command, CommandFuture, CommandSnapshot, LatestOnlyUpdater, State, StateCtx, TaskHandle,
    state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use super::api::{MapPage, list_maps};
use super::params::ListParams;
use super::table::VersionTable;
use crate::BusinessConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MapListResult {
    #[default]
    Idle,
    Loading {
        generation: u64,
    },
    Loaded {
        generation: u64,
        page: MapPage,
    },
    Error {
        generation: u64,
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MapListCompute {
    pub result: MapListResult,
}

impl MapListCompute {
    /// Generation of the finished load held here, if any.
    pub fn finished_generation(&self) -> Option<u64> {
        match self.result {
            MapListResult::Loaded { generation, .. } | MapListResult::Error { generation, .. } => {
                Some(generation)
            }
            MapListResult::Idle | MapListResult::Loading { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            MapListResult::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl State for MapListCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

/// Parameters for the next `LoadMapsCommand`.
#[derive(Debug, Clone, Default)]
pub struct MapListInput {
    pub params: ListParams,
}

impl State for MapListInput {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

#[derive(Debug, Default)]
pub struct LoadMapsCommand;

impl Command for LoadMapsCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let generation = updater.task_id().generation();
        let inputs = snap
            .state::<BusinessConfig>()
            .map(BusinessConfig::maps_url)
            .and_then(|url| {
                snap.state::<MapListInput>()
                    .map(|input| (url, input.params.clone()))
            });

        Box::pin(async move {
            let (url, params) = match inputs {
                Ok(inputs) => inputs,
                Err(err) => {
                    error!("LoadMapsCommand: {err}");
                    updater.set(MapListCompute {
                        result: MapListResult::Error {
                            generation,
                            message: err.to_string(),
                        },
                    });
                    return;
                }
            };

            updater.set(MapListCompute {
                result: MapListResult::Loading { generation },
            });

            let result = tokio::select! {
                () = cancel.cancelled() => {
                    info!("LoadMapsCommand generation {generation} cancelled");
                    return;
                }
                result = list_maps(&url, &params) => result,
            };

            let result = match result {
                Ok(page) => {
                    info!(
                        "LoadMapsCommand generation {generation}: {} rows, total {}",
                        page.rows.len(),
                        page.total
                    );
                    MapListResult::Loaded { generation, page }
                }
                Err(err) => {
                    warn!("LoadMapsCommand generation {generation} failed: {err}");
                    MapListResult::Error {
                        generation,
                        message: err.to_string(),
                    }
                }
            };
            updater.set(MapListCompute { result });
        })
    }
}

/// Register every state the map console needs.
pub fn register_maps(ctx: &mut StateCtx, config: BusinessConfig) {
    let page_size = config.page_size;
    ctx.add_state(config);
    ctx.add_state(VersionTable::new(page_size));
    ctx.add_state(MapListInput {
        params: ListParams::new(page_size),
    });
    ctx.add_state(MapListCompute::default());
}

/// Start loading `params`, superseding any load still in flight.
pub fn load_maps(ctx: &mut StateCtx, params: ListParams) -> TaskHandle {
    ctx.update::<VersionTable>(|table| table.begin_load(params.clone()));
    ctx.update::<MapListInput>(|input| input.params = params);
    ctx.dispatch::<LoadMapsCommand>()
}

/// Reload with the parameters of the previous load.
pub fn reload_maps(ctx: &mut StateCtx) -> TaskHandle {
    let params = ctx
        .try_state::<VersionTable>()
        .map(|table| table.params().clone())
        .unwrap_or_default();
    load_maps(ctx, params)
}

/// Abort the running load; the table keeps its rows.
pub fn cancel_load(ctx: &mut StateCtx) -> bool {
    let cancelled = ctx.cancel::<LoadMapsCommand>();
    if cancelled {
        ctx.update::<VersionTable>(VersionTable::stop_loading);
    }
    cancelled
}

/// Move a newly finished load into the table.
///
/// Call after `StateCtx::sync_updates`. Returns `true` when the table changed.
pub fn sync_maps(ctx: &mut StateCtx, now: DateTime<Utc>) -> bool {
    let Ok(table) = ctx.try_state::<VersionTable>() else {
        return false;
    };
    let applied = table.applied_generation();
    let compute = match ctx.try_state::<MapListCompute>() {
        Ok(compute) if compute.finished_generation().is_some_and(|g| g > applied) => {
            compute.clone()
        }
        _ => return false,
    };

    let mut changed = false;
    ctx.update::<VersionTable>(|table| changed = table.reconcile(&compute, now));
    changed
}

//! State container and async command plumbing for the map console.
//!
//! - [`StateCtx`] owns every [`State`] of the application, keyed by type.
//! - [`Command`]s run async work (network IO) off the UI loop and publish
//!   results back through a [`LatestOnlyUpdater`].
//! - Results are applied on the UI thread by [`StateCtx::sync_updates`].

mod basic_state;
mod command;
mod ctx;
mod error;
mod snapshot;
mod state;
mod task;
mod updater;

pub use basic_state::Time;
pub use command::{Command, CommandFuture};
pub use ctx::StateCtx;
pub use error::Error;
pub use snapshot::CommandSnapshot;
pub use state::{State, state_assign_impl};
pub use task::{TaskHandle, TaskId};
pub use updater::{LatestOnlyUpdater, Update};

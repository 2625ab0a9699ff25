//! Identity and cancellation of dispatched commands.
//!
//! - `TaskId`: command type plus a per-type generation counter
//! - `TaskHandle`: a `TaskId` together with the run's `CancellationToken`
//!
//! A newer generation of the same command type supersedes older ones: the
//! older run is cancelled and its results are discarded.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Unique identifier for one dispatch of a command.
///
/// Two dispatches of the same command type share `command_type()` and differ
/// in `generation()`; the higher generation is the newer dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    command_type: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(command_type: TypeId, generation: u64) -> Self {
        Self {
            command_type,
            generation,
        }
    }

    pub fn of<C: 'static>(generation: u64) -> Self {
        Self::new(TypeId::of::<C>(), generation)
    }

    pub fn command_type(&self) -> TypeId {
        self.command_type
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle to a running command.
///
/// Cancellation is cooperative: the command observes the token, typically
/// through `tokio::select!` on `token.cancelled()`.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

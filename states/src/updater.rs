use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::Sender;

use crate::{State, TaskId};

/// A state value published by a command, waiting for
/// [`crate::StateCtx::sync_updates`].
pub struct Update {
    pub(crate) target: TypeId,
    pub(crate) task: TaskId,
    pub(crate) value: Box<dyn Any + Send>,
}

impl std::fmt::Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Update")
            .field("target", &self.target)
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

/// Publishes command results, but only while the command is still the newest
/// dispatch of its type.
///
/// `latest` is shared with the owning `StateCtx`, which bumps it on every
/// dispatch. Anything an older run publishes afterwards is dropped here, and
/// anything already in flight is dropped again during sync.
#[derive(Clone)]
pub struct LatestOnlyUpdater {
    task: TaskId,
    latest: Arc<AtomicU64>,
    send: Sender<Update>,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(task: TaskId, latest: Arc<AtomicU64>, send: Sender<Update>) -> Self {
        Self { task, latest, send }
    }

    pub fn task_id(&self) -> TaskId {
        self.task
    }

    /// Whether no newer dispatch of the same command exists.
    pub fn is_latest(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.task.generation()
    }

    /// Publish `value` as the new content of state `T`.
    ///
    /// Returns `false` when the update was dropped.
    pub fn set<T: State + Send>(&self, value: T) -> bool {
        if !self.is_latest() {
            log::debug!(
                "dropping stale update for {} from generation {}",
                std::any::type_name::<T>(),
                self.task.generation()
            );
            return false;
        }

        self.send
            .send(Update {
                target: TypeId::of::<T>(),
                task: self.task,
                value: Box::new(value),
            })
            .is_ok()
    }
}

impl std::fmt::Debug for LatestOnlyUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestOnlyUpdater")
            .field("task", &self.task)
            .field("latest", &self.latest.load(Ordering::Relaxed))
            .finish()
    }
}

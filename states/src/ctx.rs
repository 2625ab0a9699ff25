use std::any::{TypeId, type_name};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::{Receiver, Sender};
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    Command, CommandFuture, CommandSnapshot, Error, LatestOnlyUpdater, State, TaskHandle, TaskId,
    Update,
};

/// Owns all application states and the commands running against them.
///
/// Everything here is touched from the UI thread only. Commands never see
/// `StateCtx`; they get a [`CommandSnapshot`] and publish through a
/// [`LatestOnlyUpdater`], and the UI loop applies their output with
/// [`StateCtx::sync_updates`] at the start of each frame.
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,

    // newest dispatch per command type
    tasks: BTreeMap<TypeId, TaskHandle>,
    generations: BTreeMap<TypeId, Arc<AtomicU64>>,

    send: Sender<Update>,
    recv: Receiver<Update>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            tasks: BTreeMap::new(),
            generations: BTreeMap::new(),
            send,
            recv,
        }
    }

    /// Register `state`, replacing any previous state of the same type.
    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(state));
    }

    pub fn has_state<T: State>(&self) -> bool {
        self.states.contains_key(&TypeId::of::<T>())
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found::<T>("StateCtx::try_state"))
    }

    pub fn try_state_mut<T: State>(&mut self) -> Result<&mut T, Error> {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|state| state.as_any_mut().downcast_mut::<T>())
            .ok_or_else(|| Error::state_not_found::<T>("StateCtx::try_state_mut"))
    }

    /// # Panics
    /// Panics if `T` was never registered with [`StateCtx::add_state`].
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// # Panics
    /// Panics if `T` was never registered with [`StateCtx::add_state`].
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.try_state_mut::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        match self.try_state_mut::<T>() {
            Ok(state) => f(state),
            Err(err) => warn!("update skipped: {err}"),
        }
    }

    /// Clone every command-visible state.
    pub fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::new();
        for (id, state) in &self.states {
            if let Some(cloned) = state.snapshot() {
                snap.insert_cloned(*id, cloned);
            }
        }
        snap
    }

    /// Run command `C` in the background.
    ///
    /// A previous run of `C` that has not finished is cancelled and can no
    /// longer publish.
    pub fn dispatch<C: Command>(&mut self) -> TaskHandle {
        let (handle, updater) = self.begin_task::<C>();
        debug!(
            "dispatching {} generation {}",
            type_name::<C>(),
            handle.id().generation()
        );
        let future = C::default().run(self.snapshot(), updater, handle.cancellation_token());
        spawn(future);
        handle
    }

    /// Cancel the running `C`, if any. Results it already sent are discarded.
    pub fn cancel<C: Command>(&mut self) -> bool {
        let command_type = TypeId::of::<C>();
        let Some(handle) = self.tasks.remove(&command_type) else {
            return false;
        };
        handle.cancel();
        if let Some(latest) = self.generations.get(&command_type) {
            latest.fetch_add(1, Ordering::AcqRel);
        }
        debug!(
            "cancelled {} generation {}",
            type_name::<C>(),
            handle.id().generation()
        );
        true
    }

    /// Handle of the newest dispatch of `C`, unless it was cancelled.
    pub fn running<C: Command>(&self) -> Option<&TaskHandle> {
        self.tasks
            .get(&TypeId::of::<C>())
            .filter(|handle| !handle.is_cancelled())
    }

    fn is_current(&self, task: TaskId) -> bool {
        self.generations
            .get(&task.command_type())
            .is_some_and(|latest| latest.load(Ordering::Acquire) == task.generation())
    }

    fn begin_task<C: Command>(&mut self) -> (TaskHandle, LatestOnlyUpdater) {
        let command_type = TypeId::of::<C>();
        let latest = Arc::clone(
            self.generations
                .entry(command_type)
                .or_insert_with(|| Arc::new(AtomicU64::new(0))),
        );
        let generation = latest.fetch_add(1, Ordering::AcqRel) + 1;
        let id = TaskId::new(command_type, generation);
        let handle = TaskHandle::new(id, CancellationToken::new());

        if let Some(previous) = self.tasks.insert(command_type, handle.clone())
            && !previous.is_cancelled()
        {
            debug!(
                "{} generation {} superseded by {}",
                type_name::<C>(),
                previous.id().generation(),
                generation
            );
            previous.cancel();
        }

        let updater = LatestOnlyUpdater::new(id, latest, self.send.clone());
        (handle, updater)
    }

    /// Apply everything commands published since the last call.
    ///
    /// Returns the number of updates applied.
    pub fn sync_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.recv.try_recv() {
            if !self.is_current(update.task) {
                debug!("discarding superseded update {update:?}");
                continue;
            }
            match self.states.get_mut(&update.target) {
                Some(state) => {
                    state.assign_box(update.value);
                    applied += 1;
                }
                None => warn!("update for unregistered state {update:?}"),
            }
        }
        applied
    }
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("states", &self.states.len())
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn(future: CommandFuture) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(future);
        }
        Err(err) => log::error!("command dropped, no tokio runtime: {err}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn(future: CommandFuture) {
    wasm_bindgen_futures::spawn_local(future);
}

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, LatestOnlyUpdater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Manual-only async work, dispatched via [`crate::StateCtx::dispatch`].
///
/// Commands are the only place that performs network IO. They read inputs
/// from the snapshot taken at dispatch time and publish results through the
/// updater. Dispatching the same command type again cancels `cancel` and makes
/// every later `updater.set()` of the old run a no-op.
pub trait Command: Any + Default {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture;
}

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

/// Runs `task` on the ambient tokio runtime once the current synchronous
/// execution has yielded, after an additional `delay` when it is non-zero.
///
/// Outside a runtime nothing is scheduled and `task` is handed back
/// unexecuted; the caller decides on the fallback.
pub(crate) fn spawn_deferred<F>(
    name: &'static str,
    delay: Duration,
    task: F,
) -> Result<JoinHandle<()>, F>
where
    F: FnOnce() + Send + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        return Err(task);
    };

    let handle = runtime.spawn(async move {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        trace!(task = name, "deferred task fired");
        task();
    });

    Ok(handle)
}

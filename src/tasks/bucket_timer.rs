//! Bucket Timer Task
//!
//! One-shot task that sleeps until a cleanup bucket's deadline and then
//! runs the sweep callback.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Spawns a task on `runtime` that calls `on_fire` once `deadline` passes.
///
/// Aborting the returned handle before the deadline cancels the sweep.
///
/// # Example
/// ```ignore
/// let timer = spawn_bucket_timer(&Handle::current(), deadline, move || sweep(at_ms));
/// // The bucket drained early:
/// timer.abort();
/// ```
pub fn spawn_bucket_timer<F>(runtime: &Handle, deadline: Instant, on_fire: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    runtime.spawn(async move {
        tokio::time::sleep_until(deadline).await;
        trace!("Bucket timer fired");
        on_fire();
    })
}

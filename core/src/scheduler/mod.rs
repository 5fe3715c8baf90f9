//! Periodic tasks
//!
//! Two lanes, mirroring how a game host schedules work:
//! - **primary**: the host calls [`TickScheduler::tick`] from its main loop and
//!   due tasks run inline on that thread.
//! - **async**: tasks run on the tokio runtime, paced by a tokio interval, with
//!   the action itself on the blocking pool.
//!
//! Every task is cancelled through its [`TaskHandle`]. Cancelling waits for a
//! run that is already in progress, so once `cancel` returns the action will
//! never start again.

mod task;
mod tick;

pub(crate) use task::panic_message;
pub use task::{TaskHandle, TickAction};
pub use tick::TickScheduler;

/// Runs actions periodically.
pub trait Scheduler: Send + Sync {
    /// Run `action` after `delay_ticks`, then every `period_ticks`.
    fn run_timer(
        &self,
        action: TickAction,
        delay_ticks: u64,
        period_ticks: u64,
        run_async: bool,
    ) -> TaskHandle;
}

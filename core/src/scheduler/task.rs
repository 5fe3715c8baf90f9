use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub type TickAction = Arc<dyn Fn() + Send + Sync>;

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[derive(Debug, Default)]
pub(crate) struct TaskState {
    cancelled: AtomicBool,
    runs: AtomicU64,
    run_lock: Mutex<()>,
}

impl TaskState {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Run the action unless cancelled. A panicking action is logged and
    /// counted as a run; the task stays scheduled.
    ///
    /// Returns `false` once the task is cancelled.
    pub(crate) fn run(&self, action: &TickAction) -> bool {
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_cancelled() {
            return false;
        }
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| action())) {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "scheduled task panicked, keeping it scheduled");
        }
        self.runs.fetch_add(1, Ordering::Relaxed);
        true
    }
}

/// Handle to a scheduled task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Arc<TaskState>,
}

impl TaskHandle {
    pub(crate) fn new(state: Arc<TaskState>) -> Self {
        Self { state }
    }

    /// Stop the task. Blocks until a run in progress has finished.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        drop(
            self.state
                .run_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Number of completed runs.
    pub fn runs(&self) -> u64 {
        self.state.runs.load(Ordering::Relaxed)
    }
}

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::gui::{ButtonRef, ViewerCondition};
use crate::ids::ViewerId;
use crate::scheduler::panic_message;

/// Per-value state built once from the template.
///
/// Only the activation flag and the last-seen cycle change after creation.
pub struct ValueEntry<V> {
    value: V,
    button: ButtonRef,
    viewer_condition: Box<dyn ViewerCondition>,
    activated: AtomicBool,
    last_seen: AtomicU64,
}

impl<V: fmt::Debug> fmt::Debug for ValueEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEntry")
            .field("value", &self.value)
            .field("button", &self.button.name())
            .field("activated", &self.is_activated())
            .finish()
    }
}

impl<V> ValueEntry<V> {
    pub fn new(value: V, button: ButtonRef, viewer_condition: Box<dyn ViewerCondition>) -> Self {
        Self {
            value,
            button,
            viewer_condition,
            activated: AtomicBool::new(false),
            last_seen: AtomicU64::new(0),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn button(&self) -> &ButtonRef {
        &self.button
    }

    pub fn is_activated(&self) -> bool {
        self.activated.load(Ordering::Acquire)
    }

    pub(crate) fn set_activated(&self, activated: bool) {
        self.activated.store(activated, Ordering::Release);
    }

    pub(crate) fn last_seen(&self) -> u64 {
        self.last_seen.load(Ordering::Acquire)
    }

    /// Never moves backwards, so overlapping refreshes keep the newest cycle.
    pub(crate) fn mark_seen(&self, cycle: u64) {
        self.last_seen.fetch_max(cycle, Ordering::AcqRel);
    }

    /// Viewer condition result. Evaluation errors and panics hide the value.
    pub fn accepts_viewer(&self, viewer: ViewerId) -> bool {
        let checked =
            panic::catch_unwind(AssertUnwindSafe(|| self.viewer_condition.check(viewer)));
        match checked {
            Ok(Ok(pass)) => pass,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, button = self.button.name(), "viewer condition failed, hiding value");
                false
            }
            Err(payload) => {
                tracing::warn!(
                    message = %panic_message(payload.as_ref()),
                    button = self.button.name(),
                    "viewer condition panicked, hiding value"
                );
                false
            }
        }
    }
}

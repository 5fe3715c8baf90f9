use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use hashbrown::HashMap;

use crate::gui::{ButtonList, ButtonRef};
use crate::ids::ViewerId;

#[derive(Debug, Clone)]
struct CachedRender {
    computed_at: Instant,
    buttons: ButtonList,
}

/// Per-viewer rendered button lists with a time-to-live.
///
/// Lists are computed without holding a lock and swapped in whole. A list
/// computed across [`invalidate_all`](Self::invalidate_all) is returned to its
/// caller but never stored.
#[derive(Debug)]
pub struct ViewerRenderCache {
    ttl: Duration,
    epoch: AtomicU64,
    entries: RwLock<HashMap<ViewerId, CachedRender>>,
}

impl ViewerRenderCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            epoch: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached list for `viewer` if younger than the TTL, otherwise a fresh one
    /// from `compute`.
    pub fn get_or_compute<F>(&self, viewer: ViewerId, compute: F) -> ButtonList
    where
        F: FnOnce() -> Vec<ButtonRef>,
    {
        let now = Instant::now();
        if let Some(buttons) = self.fresh(viewer, now) {
            return buttons;
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let buttons: ButtonList = compute().into();

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.epoch.load(Ordering::Acquire) == epoch {
            entries.insert(
                viewer,
                CachedRender {
                    computed_at: now,
                    buttons: Arc::clone(&buttons),
                },
            );
        }
        buttons
    }

    fn fresh(&self, viewer: ViewerId, now: Instant) -> Option<ButtonList> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&viewer)
            .filter(|cached| now.saturating_duration_since(cached.computed_at) < self.ttl)
            .map(|cached| Arc::clone(&cached.buttons))
    }

    /// Forget one viewer's list.
    pub fn invalidate(&self, viewer: ViewerId) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&viewer)
            .is_some()
    }

    /// Forget every list, including ones being computed right now.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    /// Drop lists past their TTL. They would be recomputed on the next render
    /// anyway; this keeps departed viewers from piling up.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, cached| now.saturating_duration_since(cached.computed_at) < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::EmptyButton;
    use std::cell::Cell;
    use std::thread;
    use ulid::Ulid;

    fn one_button() -> Vec<ButtonRef> {
        vec![Arc::new(EmptyButton)]
    }

    #[test]
    fn test_same_list_within_ttl() {
        let cache = ViewerRenderCache::new(Duration::from_secs(60));
        let viewer = Ulid::new();
        let computed = Cell::new(0);

        let first = cache.get_or_compute(viewer, || {
            computed.set(computed.get() + 1);
            one_button()
        });
        let second = cache.get_or_compute(viewer, || {
            computed.set(computed.get() + 1);
            Vec::new()
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(computed.get(), 1);
    }

    #[test]
    fn test_recompute_after_ttl() {
        let cache = ViewerRenderCache::new(Duration::from_millis(5));
        let viewer = Ulid::new();

        let first = cache.get_or_compute(viewer, one_button);
        thread::sleep(Duration::from_millis(20));
        let second = cache.get_or_compute(viewer, Vec::new);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_viewers_are_independent() {
        let cache = ViewerRenderCache::new(Duration::from_secs(60));
        let a = cache.get_or_compute(Ulid::new(), one_button);
        let b = cache.get_or_compute(Ulid::new(), Vec::new);
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cache = ViewerRenderCache::new(Duration::from_secs(60));
        let viewer = Ulid::new();
        let first = cache.get_or_compute(viewer, one_button);
        assert!(cache.invalidate(viewer));
        let second = cache.get_or_compute(viewer, one_button);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_all_discards_in_flight_result() {
        let cache = ViewerRenderCache::new(Duration::from_secs(60));
        let viewer = Ulid::new();
        let buttons = cache.get_or_compute(viewer, || {
            cache.invalidate_all();
            one_button()
        });
        assert_eq!(buttons.len(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_prune_expired() {
        let cache = ViewerRenderCache::new(Duration::from_millis(5));
        cache.get_or_compute(Ulid::new(), one_button);
        cache.get_or_compute(Ulid::new(), one_button);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.prune_expired(), 2);
        assert!(cache.is_empty());
    }
}

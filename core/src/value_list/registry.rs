use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use hashbrown::HashMap;

use super::ValueEntry;

/// Outcome of one refresh cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshStats {
    pub cycle: u64,
    pub seen: usize,
    pub created: usize,
    pub evicted: usize,
}

/// Per-value cell, filled once outside the map lock.
type Slot<V> = Arc<OnceLock<Arc<ValueEntry<V>>>>;

/// Concurrent store of value entries.
///
/// Entries are created on first sight during a refresh and otherwise live
/// until [`teardown`](Self::teardown), unless eviction is requested. The map
/// lock only guards slot lookup and insertion; entries are built after it is
/// released, so a slow build never holds up lookups of other values.
pub struct ValueRegistry<V> {
    slots: RwLock<HashMap<V, Slot<V>>>,
    cycle: AtomicU64,
}

impl<V> Default for ValueRegistry<V> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            cycle: AtomicU64::new(0),
        }
    }
}

impl<V: Clone + Eq + Hash> ValueRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built entry for `value`. A value whose entry is still being built
    /// reads as absent.
    pub fn get(&self, value: &V) -> Option<Arc<ValueEntry<V>>> {
        let slot = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(value)
            .cloned()?;
        slot.get().cloned()
    }

    fn slot(&self, value: &V) -> Slot<V> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(value)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(value.clone()).or_default())
    }

    /// Return the entry for `value`, building it with `create` if absent.
    ///
    /// Concurrent callers for the same value build at most one entry; the
    /// others wait for it. Callers for other values are never blocked by the
    /// build. The flag is `true` when this call built it.
    pub fn get_or_create<F>(&self, value: &V, create: F) -> (Arc<ValueEntry<V>>, bool)
    where
        F: FnOnce(&V) -> ValueEntry<V>,
    {
        let slot = self.slot(value);
        let mut created = false;
        let entry = slot.get_or_init(|| {
            created = true;
            Arc::new(create(value))
        });
        (Arc::clone(entry), created)
    }

    /// Walk the current values: create missing entries and update every
    /// entry's activation flag.
    ///
    /// Values that stopped appearing are kept unless `evict_after` is non-zero,
    /// in which case entries unseen for that many consecutive cycles are
    /// removed and their buttons stopped.
    pub fn refresh<I, C, A>(
        &self,
        values: I,
        mut create: C,
        activated: A,
        evict_after: u64,
    ) -> RefreshStats
    where
        I: IntoIterator<Item = V>,
        C: FnMut(&V) -> ValueEntry<V>,
        A: Fn(&V) -> bool,
    {
        let cycle = self.cycle.fetch_add(1, Ordering::AcqRel) + 1;
        let mut stats = RefreshStats {
            cycle,
            ..RefreshStats::default()
        };

        for value in values {
            let (entry, created) = self.get_or_create(&value, |v| create(v));
            entry.set_activated(activated(&value));
            entry.mark_seen(cycle);
            stats.seen += 1;
            if created {
                stats.created += 1;
            }
        }

        if evict_after > 0 {
            stats.evicted = self.evict_unseen(cycle, evict_after);
        }
        stats
    }

    fn evict_unseen(&self, cycle: u64, evict_after: u64) -> usize {
        let mut removed = Vec::new();
        {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| {
                // still being built
                let Some(entry) = slot.get() else {
                    return true;
                };
                let keep = cycle.saturating_sub(entry.last_seen()) < evict_after;
                if !keep {
                    removed.push(Arc::clone(entry));
                }
                keep
            });
        }
        for entry in &removed {
            entry.button().stop();
        }
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "evicted stale value entries");
        }
        removed.len()
    }

    /// Stop every button and empty the registry. Safe to call repeatedly.
    ///
    /// A build still running on another thread is not waited for; callers
    /// serialize teardown against [`refresh`](Self::refresh).
    pub fn teardown(&self) -> usize {
        let drained: Vec<Arc<ValueEntry<V>>> = self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .filter_map(|(_, slot)| slot.get().cloned())
            .collect();
        for entry in &drained {
            entry.button().stop();
        }
        drained.len()
    }

    /// Number of built entries.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of refresh cycles run so far.
    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::{AlwaysPass, Button};
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[derive(Debug, Default)]
    struct ProbeButton {
        stopped: AtomicBool,
    }

    impl Button for ProbeButton {
        fn name(&self) -> &str {
            "probe"
        }

        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    fn entry(value: &u32) -> ValueEntry<u32> {
        ValueEntry::new(*value, Arc::new(ProbeButton::default()), Box::new(AlwaysPass))
    }

    #[test]
    fn test_refresh_creates_and_activates() {
        let registry = ValueRegistry::new();
        let stats = registry.refresh(vec![1, 2, 3], entry, |v| *v != 2, 0);
        assert_eq!(stats.created, 3);
        assert_eq!(stats.seen, 3);
        assert!(registry.get(&1).unwrap().is_activated());
        assert!(!registry.get(&2).unwrap().is_activated());

        let stats = registry.refresh(vec![2, 3], entry, |_| true, 0);
        assert_eq!(stats.created, 0);
        assert!(registry.get(&2).unwrap().is_activated());
    }

    #[test]
    fn test_vanished_values_are_kept_by_default() {
        let registry = ValueRegistry::new();
        registry.refresh(vec![1, 2], entry, |_| true, 0);
        for _ in 0..5 {
            registry.refresh(vec![2], entry, |_| true, 0);
        }
        assert_eq!(registry.len(), 2);
        // untouched flag from its last appearance
        assert!(registry.get(&1).unwrap().is_activated());
    }

    #[test]
    fn test_eviction_after_unseen_cycles() {
        let registry = ValueRegistry::new();
        let first = Arc::new(ProbeButton::default());
        let shared = Arc::clone(&first);
        registry.get_or_create(&1, move |v| ValueEntry::new(*v, shared, Box::new(AlwaysPass)));
        registry.refresh(vec![1, 2], entry, |_| true, 2);

        let stats = registry.refresh(vec![2], entry, |_| true, 2);
        assert_eq!(stats.evicted, 0);
        assert!(registry.get(&1).is_some());

        let stats = registry.refresh(vec![2], entry, |_| true, 2);
        assert_eq!(stats.evicted, 1);
        assert!(registry.get(&1).is_none());
        assert_eq!(registry.len(), 1);
        assert!(first.stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_teardown_stops_buttons_and_is_idempotent() {
        let registry = ValueRegistry::new();
        let button = Arc::new(ProbeButton::default());
        let shared = Arc::clone(&button);
        registry.get_or_create(&7, move |v| ValueEntry::new(*v, shared, Box::new(AlwaysPass)));

        assert_eq!(registry.teardown(), 1);
        assert!(button.stopped.load(Ordering::SeqCst));
        assert!(registry.is_empty());
        assert_eq!(registry.teardown(), 0);
    }

    #[test]
    fn test_concurrent_refresh_builds_once() {
        const THREADS: usize = 16;
        let registry = Arc::new(ValueRegistry::new());
        let built = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let built = Arc::clone(&built);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.refresh(
                        vec![42u32],
                        |v| {
                            built.fetch_add(1, Ordering::SeqCst);
                            entry(v)
                        },
                        |_| true,
                        0,
                    );
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.cycle(), THREADS as u64);
    }

    #[test]
    fn test_slow_build_does_not_block_lookups() {
        let registry = Arc::new(ValueRegistry::new());
        registry.refresh(vec![1u32], entry, |_| true, 0);

        let (started_tx, started_rx) = mpsc::channel();
        let background = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry.refresh(
                    vec![1, 2],
                    |v| {
                        started_tx.send(()).unwrap();
                        thread::sleep(Duration::from_millis(400));
                        entry(v)
                    },
                    |_| true,
                    0,
                )
            })
        };

        started_rx.recv().unwrap();
        let start = Instant::now();
        let existing = registry.get(&1);
        let building = registry.get(&2);
        let waited = start.elapsed();

        assert!(existing.is_some());
        assert!(building.is_none());
        assert!(waited < Duration::from_millis(100), "lookup waited {waited:?}");

        let stats = background.join().unwrap();
        assert_eq!(stats.created, 1);
        assert!(registry.get(&2).is_some());
    }

    #[test]
    fn test_panicking_build_can_be_retried() {
        let registry = ValueRegistry::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.get_or_create(&3u32, |_| panic!("builder failed"))
        }));
        assert!(result.is_err());
        assert!(registry.get(&3).is_none());
        assert_eq!(registry.len(), 0);

        let (_, created) = registry.get_or_create(&3, entry);
        assert!(created);
        assert!(registry.get(&3).is_some());
    }
}

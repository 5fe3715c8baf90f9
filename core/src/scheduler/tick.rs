use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use roster_types::{DEFAULT_MILLIS_PER_TICK, ticks_to_duration};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;

use super::task::{TaskHandle, TaskState, TickAction};
use super::Scheduler;

struct PrimaryTask {
    state: Arc<TaskState>,
    action: TickAction,
    next_tick: u64,
    period: u64,
}

/// Scheduler with a host-driven primary lane and a tokio-backed async lane.
pub struct TickScheduler {
    millis_per_tick: u64,
    current_tick: AtomicU64,
    primary: Mutex<Vec<PrimaryTask>>,
    runtime: Option<Handle>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MILLIS_PER_TICK)
    }
}

impl TickScheduler {
    /// Picks up the ambient tokio runtime, if any, for the async lane.
    pub fn new(millis_per_tick: u64) -> Self {
        Self {
            millis_per_tick,
            current_tick: AtomicU64::new(0),
            primary: Mutex::new(Vec::new()),
            runtime: Handle::try_current().ok(),
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn millis_per_tick(&self) -> u64 {
        self.millis_per_tick
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick.load(Ordering::Acquire)
    }

    /// Live tasks on the primary lane.
    pub fn pending(&self) -> usize {
        self.primary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.state.is_cancelled())
            .count()
    }

    /// Advance the primary lane by one tick, running every task that is due.
    ///
    /// Actions run after the task list lock is released, so they may schedule
    /// or cancel other tasks.
    pub fn tick(&self) {
        let now = self.current_tick();
        let due: Vec<(Arc<TaskState>, TickAction)> = {
            let mut tasks = self.primary.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.retain(|task| !task.state.is_cancelled());
            tasks
                .iter_mut()
                .filter(|task| task.next_tick <= now)
                .map(|task| {
                    task.next_tick = now + task.period;
                    (Arc::clone(&task.state), Arc::clone(&task.action))
                })
                .collect()
        };

        for (state, action) in due {
            state.run(&action);
        }
        self.current_tick.fetch_add(1, Ordering::AcqRel);
    }

    fn schedule_primary(
        &self,
        action: TickAction,
        delay_ticks: u64,
        period_ticks: u64,
    ) -> TaskHandle {
        let state = Arc::new(TaskState::default());
        let task = PrimaryTask {
            state: Arc::clone(&state),
            action,
            next_tick: self.current_tick() + delay_ticks,
            period: period_ticks.max(1),
        };
        self.primary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
        TaskHandle::new(state)
    }

    fn schedule_async(
        &self,
        runtime: &Handle,
        action: TickAction,
        delay_ticks: u64,
        period_ticks: u64,
    ) -> TaskHandle {
        let state = Arc::new(TaskState::default());
        let delay = ticks_to_duration(delay_ticks, self.millis_per_tick);
        let period = ticks_to_duration(period_ticks.max(1), self.millis_per_tick)
            .max(Duration::from_millis(1));

        let task_state = Arc::clone(&state);
        runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if task_state.is_cancelled() {
                    break;
                }
                let state = Arc::clone(&task_state);
                let action = Arc::clone(&action);
                match tokio::task::spawn_blocking(move || state.run(&action)).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "async task worker failed");
                        break;
                    }
                }
            }
            tracing::debug!("async task finished");
        });

        TaskHandle::new(state)
    }
}

impl Scheduler for TickScheduler {
    fn run_timer(
        &self,
        action: TickAction,
        delay_ticks: u64,
        period_ticks: u64,
        run_async: bool,
    ) -> TaskHandle {
        if run_async {
            if let Some(runtime) = &self.runtime {
                return self.schedule_async(runtime, action, delay_ticks, period_ticks);
            }
            tracing::warn!("no tokio runtime for async task, using the primary lane");
        }
        self.schedule_primary(action, delay_ticks, period_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting() -> (Arc<AtomicUsize>, TickAction) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let action: TickAction = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (count, action)
    }

    #[test]
    fn test_primary_delay_and_period() {
        let scheduler = TickScheduler::new(50);
        let (count, action) = counting();
        let _handle = scheduler.run_timer(action, 2, 3, false);

        let mut seen = Vec::new();
        for _ in 0..9 {
            scheduler.tick();
            seen.push(count.load(Ordering::SeqCst));
        }
        // runs on ticks 2, 5 and 8
        assert_eq!(seen, vec![0, 0, 1, 1, 1, 2, 2, 2, 3]);
    }

    #[test]
    fn test_primary_zero_period_runs_every_tick() {
        let scheduler = TickScheduler::new(50);
        let (count, action) = counting();
        let _handle = scheduler.run_timer(action, 0, 0, false);
        for _ in 0..4 {
            scheduler.tick();
        }
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_primary_cancel_removes_task() {
        let scheduler = TickScheduler::new(50);
        let (count, action) = counting();
        let handle = scheduler.run_timer(action, 0, 1, false);
        scheduler.tick();
        handle.cancel();
        scheduler.tick();
        scheduler.tick();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_async_without_runtime_falls_back() {
        let scheduler = TickScheduler::new(50);
        let (count, action) = counting();
        let _handle = scheduler.run_timer(action, 0, 1, true);
        scheduler.tick();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_lane_runs_and_stops() {
        let scheduler = TickScheduler::new(1);
        let (count, action) = counting();
        let handle = scheduler.run_timer(action, 0, 5, true);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);

        handle.cancel();
        let after_cancel = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
        assert_eq!(scheduler.pending(), 0);
    }
}

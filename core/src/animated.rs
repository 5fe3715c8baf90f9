//! Masks that cycle through child masks on a timer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use roster_types::AnimatedSettings;

use crate::gui::{ButtonList, Mask, MaskRef, empty_button_list};
use crate::ids::ViewerId;
use crate::scheduler::{Scheduler, TaskHandle, TickAction};

/// Shows one child mask (a frame) at a time and advances every
/// `update` ticks. With `update = 0` the first frame stays.
pub struct AnimatedMask {
    name: String,
    frames: Vec<MaskRef>,
    current: Arc<AtomicUsize>,
    settings: AnimatedSettings,
    scheduler: Arc<dyn Scheduler>,
    task: Mutex<Option<TaskHandle>>,
}

impl AnimatedMask {
    pub fn new(
        name: impl Into<String>,
        frames: Vec<MaskRef>,
        settings: AnimatedSettings,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            name: name.into(),
            frames,
            current: Arc::new(AtomicUsize::new(0)),
            settings,
            scheduler,
            task: Mutex::new(None),
        }
    }

    pub fn frames(&self) -> &[MaskRef] {
        &self.frames
    }

    pub fn current_frame(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    fn cancel_task(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.cancel();
        }
    }
}

impl Mask for AnimatedMask {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            return;
        }
        for frame in &self.frames {
            frame.init();
        }
        if self.settings.update_ticks == 0 || self.frames.len() < 2 {
            return;
        }

        let current = Arc::clone(&self.current);
        let len = self.frames.len();
        let action: TickAction = Arc::new(move || {
            let next = (current.load(Ordering::Acquire) + 1) % len;
            current.store(next, Ordering::Release);
        });
        *task = Some(self.scheduler.run_timer(
            action,
            self.settings.update_ticks,
            self.settings.update_ticks,
            self.settings.run_async,
        ));
        tracing::debug!(
            mask = %self.name,
            frames = len,
            update_ticks = self.settings.update_ticks,
            "animation started"
        );
    }

    fn stop(&self) {
        self.cancel_task();
        for frame in &self.frames {
            frame.stop();
        }
        self.current.store(0, Ordering::Release);
    }

    fn buttons(&self, viewer: ViewerId) -> ButtonList {
        match self.frames.get(self.current_frame()) {
            Some(frame) => frame.buttons(viewer),
            None => empty_button_list(),
        }
    }

    fn refresh(&self, viewer: ViewerId) {
        for frame in &self.frames {
            frame.refresh(viewer);
        }
    }
}

impl Drop for AnimatedMask {
    fn drop(&mut self) {
        if let Some(task) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.cancel();
        }
    }
}

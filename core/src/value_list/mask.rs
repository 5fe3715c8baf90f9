use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use roster_types::ValueListSettings;

use crate::context::MaskContext;
use crate::gui::{
    AlwaysPass, ButtonBuilder, ButtonList, ButtonRef, ConditionFactory, EmptyButton, Mask,
    NeverPass, ViewerCondition, empty_button_list,
};
use crate::ids::ViewerId;
use crate::scheduler::{Scheduler, TaskHandle, TickAction, panic_message};
use crate::template::{ShortcutPattern, TemplateError, TemplateMap};

use super::{RefreshStats, ValueDomain, ValueEntry, ValueRegistry, ViewerRenderCache};

/// Template part of a value-list mask section.
#[derive(Debug, Clone, Default)]
pub struct ValueListTemplate {
    pub button: TemplateMap,
    pub viewer_condition: Vec<String>,
}

struct MaskInner<D: ValueDomain> {
    name: String,
    owner: String,
    domain: D,
    pattern: ShortcutPattern,
    template: ValueListTemplate,
    settings: ValueListSettings,
    registry: ValueRegistry<D::Value>,
    cache: ViewerRenderCache,
    buttons: Arc<dyn ButtonBuilder>,
    conditions: Arc<dyn ConditionFactory>,
    active: AtomicBool,
    // serializes refresh cycles against teardown
    refresh_lock: Mutex<()>,
}

/// Mask showing one button per value of a [`ValueDomain`].
///
/// Entries are refreshed on a schedule; each viewer's visible list is cached
/// for `viewer_update_millis`.
pub struct ValueListMask<D: ValueDomain> {
    inner: Arc<MaskInner<D>>,
    scheduler: Arc<dyn Scheduler>,
    task: Mutex<Option<TaskHandle>>,
}

impl<D: ValueDomain> ValueListMask<D> {
    pub fn new(
        name: impl Into<String>,
        domain: D,
        template: ValueListTemplate,
        settings: ValueListSettings,
        ctx: &MaskContext,
    ) -> Result<Self, TemplateError> {
        let pattern = ShortcutPattern::new(domain.shortcut_prefix())?;
        let ttl = Duration::from_millis(settings.viewer_update_millis.max(1));
        let inner = MaskInner {
            name: name.into(),
            owner: ctx.owner.clone(),
            domain,
            pattern,
            template,
            settings,
            registry: ValueRegistry::new(),
            cache: ViewerRenderCache::new(ttl),
            buttons: Arc::clone(&ctx.buttons),
            conditions: Arc::clone(&ctx.conditions),
            active: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        };
        Ok(Self {
            inner: Arc::new(inner),
            scheduler: Arc::clone(&ctx.scheduler),
            task: Mutex::new(None),
        })
    }

    pub fn domain(&self) -> &D {
        &self.inner.domain
    }

    pub fn settings(&self) -> &ValueListSettings {
        &self.inner.settings
    }

    pub fn registry(&self) -> &ValueRegistry<D::Value> {
        &self.inner.registry
    }

    pub fn render_cache(&self) -> &ViewerRenderCache {
        &self.inner.cache
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Run one refresh cycle now. Does nothing while the mask is stopped.
    pub fn refresh_values(&self) -> Option<RefreshStats> {
        self.inner.refresh_values()
    }
}

impl<D: ValueDomain> MaskInner<D> {
    fn refresh_values(&self) -> Option<RefreshStats> {
        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.active.load(Ordering::Acquire) {
            return None;
        }

        let stats = self.registry.refresh(
            self.domain.values(),
            |value| self.new_entry(value),
            |value| self.domain.is_value_activated(value),
            self.settings.value_evict_cycles,
        );

        if stats.evicted > 0 {
            self.cache.invalidate_all();
        } else {
            self.cache.prune_expired();
        }
        if stats.created > 0 {
            tracing::debug!(mask = %self.name, created = stats.created, cycle = stats.cycle, "new value entries");
        }
        Some(stats)
    }

    fn entry_name(&self, value: &D::Value, kind: &str) -> String {
        format!(
            "{}_{}_{}_{}",
            self.name,
            self.domain.value_indicator(),
            self.domain.value_as_string(value),
            kind
        )
    }

    /// Host code runs under `catch_unwind` so one bad value cannot stop the
    /// rest of the cycle from getting entries.
    fn new_entry(&self, value: &D::Value) -> ValueEntry<D::Value> {
        let resolve = |argument: &str| self.domain.shortcut_replacement(argument, value);

        let button_name = self.entry_name(value, "button");
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            let settings = self.pattern.substitute_table(&self.template.button, &resolve);
            self.buttons.build(&self.owner, &button_name, &settings)
        }));
        let button: ButtonRef = match built {
            Ok(Ok(button)) => button,
            Ok(Err(e)) => {
                tracing::warn!(mask = %self.name, button = %button_name, error = %e, "failed to build button, using an empty one");
                Arc::new(EmptyButton)
            }
            Err(payload) => {
                tracing::warn!(
                    mask = %self.name,
                    button = %button_name,
                    message = %panic_message(payload.as_ref()),
                    "button builder panicked, using an empty one"
                );
                Arc::new(EmptyButton)
            }
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| button.init())) {
            tracing::warn!(
                mask = %self.name,
                button = %button_name,
                message = %panic_message(payload.as_ref()),
                "button init panicked"
            );
        }

        let condition: Box<dyn ViewerCondition> = if self.template.viewer_condition.is_empty() {
            Box::new(AlwaysPass)
        } else {
            let condition_name = self.entry_name(value, "condition");
            let created = panic::catch_unwind(AssertUnwindSafe(|| {
                let lines = self
                    .pattern
                    .substitute_lines(&self.template.viewer_condition, &resolve);
                self.conditions.create(&self.owner, &condition_name, &lines)
            }));
            created.unwrap_or_else(|payload| {
                tracing::warn!(
                    mask = %self.name,
                    condition = %condition_name,
                    message = %panic_message(payload.as_ref()),
                    "condition factory panicked, hiding value"
                );
                Box::new(NeverPass)
            })
        };

        ValueEntry::new(value.clone(), button, condition)
    }

    fn visible_buttons(&self, viewer: ViewerId) -> Vec<ButtonRef> {
        self.domain
            .values()
            .filter_map(|value| self.registry.get(&value))
            .filter(|entry| {
                entry.is_activated()
                    && self.domain.can_view_value(viewer, entry.value())
                    && entry.accepts_viewer(viewer)
            })
            .map(|entry| Arc::clone(entry.button()))
            .collect()
    }
}

impl<D: ValueDomain> Mask for ValueListMask<D> {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn init(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            return;
        }
        self.inner.active.store(true, Ordering::Release);

        let weak: Weak<MaskInner<D>> = Arc::downgrade(&self.inner);
        let action: TickAction = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.refresh_values();
            }
        });
        let settings = &self.inner.settings;
        *task = Some(self.scheduler.run_timer(
            action,
            0,
            settings.value_update_ticks.max(1),
            settings.run_async,
        ));
        tracing::info!(
            mask = %self.inner.name,
            period_ticks = settings.value_update_ticks,
            ttl_ms = settings.viewer_update_millis,
            run_async = settings.run_async,
            "value list started"
        );
    }

    fn stop(&self) {
        self.inner.active.store(false, Ordering::Release);
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.cancel();
        }

        let _guard = self
            .inner
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let stopped = self.inner.registry.teardown();
        self.inner.cache.invalidate_all();
        tracing::info!(mask = %self.inner.name, stopped, "value list stopped");
    }

    fn buttons(&self, viewer: ViewerId) -> ButtonList {
        if !self.is_active() {
            return empty_button_list();
        }
        let inner = &self.inner;
        inner
            .cache
            .get_or_compute(viewer, || inner.visible_buttons(viewer))
    }

    fn refresh(&self, viewer: ViewerId) {
        self.inner.cache.invalidate(viewer);
    }
}

impl<D: ValueDomain> Drop for ValueListMask<D> {
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

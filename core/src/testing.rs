//! Test doubles for the host collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::context::MaskContext;
use crate::gui::{
    BuildError, Button, ButtonBuilder, ButtonList, ButtonRef, ConditionError, ConditionFactory,
    ViewerCondition,
};
use crate::ids::{EntityId, ViewerId};
use crate::scheduler::TickScheduler;
use crate::template::TemplateMap;
use crate::value_list::PlayerDirectory;
use crate::variables::VariableManager;

/// Button whose name is its `label` setting.
#[derive(Debug, Default)]
pub struct LabelButton {
    pub label: String,
    pub inits: AtomicUsize,
    pub stopped: AtomicBool,
}

impl Button for LabelButton {
    fn name(&self) -> &str {
        &self.label
    }

    fn init(&self) {
        self.inits.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Builds [`LabelButton`]s and keeps every one it built. `label = "fail"`
/// is rejected and `label = "panic"` panics.
#[derive(Debug, Default)]
pub struct LabelBuilder {
    pub built: Mutex<Vec<Arc<LabelButton>>>,
}

impl LabelBuilder {
    pub fn built(&self) -> Vec<Arc<LabelButton>> {
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn find(&self, label: &str) -> Option<Arc<LabelButton>> {
        self.built().into_iter().find(|b| b.label == label)
    }
}

impl ButtonBuilder for LabelBuilder {
    fn build(
        &self,
        _owner: &str,
        _name: &str,
        settings: &TemplateMap,
    ) -> Result<ButtonRef, BuildError> {
        let label = settings
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if label == "panic" {
            panic!("builder cannot handle this label");
        }
        if label == "fail" {
            return Err(BuildError::InvalidSetting {
                key: "label".to_string(),
                reason: "rejected".to_string(),
            });
        }
        let button = Arc::new(LabelButton {
            label,
            ..LabelButton::default()
        });
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&button));
        Ok(button)
    }
}

/// `hidden...` lines deny, `error` lines fail, `panic` lines panic, `only <id>`
/// admits one viewer.
pub struct LineCondition {
    lines: Vec<String>,
}

impl ViewerCondition for LineCondition {
    fn check(&self, viewer: ViewerId) -> Result<bool, ConditionError> {
        for line in &self.lines {
            if line == "error" {
                return Err(ConditionError::Evaluation {
                    requirement: line.clone(),
                    reason: "broken".to_string(),
                });
            }
            if line == "panic" {
                panic!("condition cannot be evaluated");
            }
            if line.starts_with("hidden") {
                return Ok(false);
            }
            if let Some(id) = line.strip_prefix("only ") {
                return Ok(id == viewer.to_string());
            }
        }
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct LineConditions;

impl ConditionFactory for LineConditions {
    fn create(&self, _owner: &str, _name: &str, lines: &[String]) -> Box<dyn ViewerCondition> {
        Box::new(LineCondition {
            lines: lines.to_vec(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryPlayers {
    online: RwLock<Vec<EntityId>>,
}

impl MemoryPlayers {
    pub fn join(&self, id: EntityId) {
        self.online
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
    }

    pub fn leave(&self, id: EntityId) {
        self.online
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|p| *p != id);
    }
}

impl PlayerDirectory for MemoryPlayers {
    fn online_players(&self) -> Vec<EntityId> {
        self.online
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_online(&self, player: EntityId) -> bool {
        self.online
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&player)
    }
}

pub struct Harness {
    pub ctx: MaskContext,
    pub builder: Arc<LabelBuilder>,
    pub scheduler: Arc<TickScheduler>,
    pub players: Arc<MemoryPlayers>,
    pub vars: Arc<VariableManager>,
}

/// Primary-lane scheduler, private variable manager, empty player directory.
pub fn harness() -> Harness {
    let builder = Arc::new(LabelBuilder::default());
    let scheduler = Arc::new(TickScheduler::new(50));
    let players = Arc::new(MemoryPlayers::default());
    let vars = Arc::new(VariableManager::new());
    let ctx = MaskContext::new(
        "menu",
        Arc::clone(&builder) as Arc<dyn ButtonBuilder>,
        Arc::new(LineConditions),
        Arc::clone(&scheduler) as Arc<dyn crate::scheduler::Scheduler>,
    )
    .with_variables(Arc::clone(&vars))
    .with_players(Arc::clone(&players) as Arc<dyn PlayerDirectory>);
    Harness {
        ctx,
        builder,
        scheduler,
        players,
        vars,
    }
}

pub fn labels(buttons: &ButtonList) -> Vec<String> {
    buttons.iter().map(|b| b.name().to_string()).collect()
}

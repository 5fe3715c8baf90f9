//! Stand-ins for the GUI host: text buttons, comparison requirements and an
//! in-memory player list.

use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::{HashMap, HashSet};
use roster_core::gui::{BuildError, ConditionError};
use roster_core::template::TemplateMap;
use roster_core::{
    Button, ButtonBuilder, ButtonRef, ConditionFactory, EntityId, PlayerDirectory,
    VariableManager, ViewerCondition, ViewerId,
};

/// Button shown as its `label` setting, variables left unexpanded until render.
#[derive(Debug)]
pub struct TextButton {
    label: String,
}

impl Button for TextButton {
    fn name(&self) -> &str {
        &self.label
    }
}

pub struct TextButtonBuilder;

impl ButtonBuilder for TextButtonBuilder {
    fn build(
        &self,
        _owner: &str,
        name: &str,
        settings: &TemplateMap,
    ) -> Result<ButtonRef, BuildError> {
        let label = match settings.get("label") {
            Some(value) => value
                .as_str()
                .ok_or_else(|| BuildError::InvalidSetting {
                    key: "label".to_string(),
                    reason: "expected a string".to_string(),
                })?
                .to_string(),
            None => name.to_string(),
        };
        Ok(Arc::new(TextButton { label }))
    }
}

/// Requirement lines of the form `left == right` or `left != right`, compared
/// after expanding variables for the viewer.
pub struct Comparison {
    vars: Arc<VariableManager>,
    lines: Vec<String>,
}

impl ViewerCondition for Comparison {
    fn check(&self, viewer: ViewerId) -> Result<bool, ConditionError> {
        for line in &self.lines {
            let (left, right, equal) = if let Some((l, r)) = line.split_once("!=") {
                (l, r, false)
            } else if let Some((l, r)) = line.split_once("==") {
                (l, r, true)
            } else {
                return Err(ConditionError::Evaluation {
                    requirement: line.clone(),
                    reason: "expected `==` or `!=`".to_string(),
                });
            };
            let left = self.vars.apply(left.trim(), Some(viewer));
            let right = self.vars.apply(right.trim(), Some(viewer));
            if (left == right) != equal {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

pub struct ComparisonFactory {
    pub vars: Arc<VariableManager>,
}

impl ConditionFactory for ComparisonFactory {
    fn create(&self, _owner: &str, _name: &str, lines: &[String]) -> Box<dyn ViewerCondition> {
        Box::new(Comparison {
            vars: Arc::clone(&self.vars),
            lines: lines.to_vec(),
        })
    }
}

#[derive(Default)]
struct Roster {
    order: Vec<EntityId>,
    names: HashMap<EntityId, String>,
    hidden: HashSet<(ViewerId, EntityId)>,
}

/// Online players, in join order.
#[derive(Default)]
pub struct Players {
    inner: RwLock<Roster>,
}

impl Players {
    pub fn join(&self, name: &str) -> EntityId {
        let id = EntityId::new();
        let mut roster = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        roster.order.push(id);
        roster.names.insert(id, name.to_string());
        id
    }

    pub fn leave(&self, name: &str) -> Option<EntityId> {
        let mut roster = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = roster.lookup(name)?;
        roster.order.retain(|p| *p != id);
        roster.names.remove(&id);
        roster.hidden.retain(|(viewer, target)| *viewer != id && *target != id);
        Some(id)
    }

    /// Toggle whether `viewer` can see `target`. Returns the new visibility.
    pub fn toggle_hidden(&self, viewer: EntityId, target: EntityId) -> bool {
        let mut roster = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if roster.hidden.remove(&(viewer, target)) {
            true
        } else {
            roster.hidden.insert((viewer, target));
            false
        }
    }

    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(name)
    }

    pub fn name(&self, id: EntityId) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .get(&id)
            .cloned()
    }
}

impl Roster {
    fn lookup(&self, name: &str) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.names.get(id).is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

impl PlayerDirectory for Players {
    fn online_players(&self) -> Vec<EntityId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    fn is_online(&self, player: EntityId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .contains_key(&player)
    }

    fn can_see(&self, viewer: ViewerId, target: EntityId) -> bool {
        !self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .hidden
            .contains(&(viewer, target))
    }
}

/// Register `{player}` as the name of whoever the variable is resolved for.
pub fn register_player_variable(vars: &VariableManager, players: Arc<Players>) {
    vars.register(
        "player",
        move |_: &str, target: Option<EntityId>, _: &VariableManager| {
            target.and_then(|id| players.name(id))
        },
    );
}

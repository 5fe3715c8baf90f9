//! Collaborators handed to every mask a menu builds.

use std::fmt;
use std::sync::Arc;

use crate::gui::{ButtonBuilder, ConditionFactory};
use crate::scheduler::Scheduler;
use crate::value_list::PlayerDirectory;
use crate::variables::VariableManager;

#[derive(Clone)]
pub struct MaskContext {
    /// Menu the masks belong to
    pub owner: String,
    pub buttons: Arc<dyn ButtonBuilder>,
    pub conditions: Arc<dyn ConditionFactory>,
    pub scheduler: Arc<dyn Scheduler>,
    pub variables: Arc<VariableManager>,
    /// Needed by player-list masks only
    pub players: Option<Arc<dyn PlayerDirectory>>,
}

impl fmt::Debug for MaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskContext")
            .field("owner", &self.owner)
            .field("variables", &self.variables)
            .field("players", &self.players.is_some())
            .finish()
    }
}

impl MaskContext {
    /// Uses the process-wide variable manager.
    pub fn new(
        owner: impl Into<String>,
        buttons: Arc<dyn ButtonBuilder>,
        conditions: Arc<dyn ConditionFactory>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            owner: owner.into(),
            buttons,
            conditions,
            scheduler,
            variables: VariableManager::global(),
            players: None,
        }
    }

    pub fn with_variables(mut self, variables: Arc<VariableManager>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_players(mut self, players: Arc<dyn PlayerDirectory>) -> Self {
        self.players = Some(players);
        self
    }
}

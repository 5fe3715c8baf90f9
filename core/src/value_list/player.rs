use std::sync::Arc;

use crate::gui::ViewerCondition;
use crate::ids::{EntityId, ViewerId};
use crate::variables::player_shortcut;

use super::ValueDomain;

/// Source of online players, provided by the host.
pub trait PlayerDirectory: Send + Sync {
    /// Online players in display order.
    fn online_players(&self) -> Vec<EntityId>;

    fn is_online(&self, player: EntityId) -> bool;

    /// Whether `viewer` is allowed to see `target` at all (vanish and the like).
    fn can_see(&self, _viewer: ViewerId, _target: EntityId) -> bool {
        true
    }
}

/// One button per online player.
///
/// `{current_player}` in a template becomes the player's name variable and
/// `{current_player_<variable>}` any other variable, both resolved against
/// that player.
pub struct PlayerListDomain {
    players: Arc<dyn PlayerDirectory>,
    exclude_viewer: bool,
    player_condition: Option<Box<dyn ViewerCondition>>,
}

impl PlayerListDomain {
    pub const SHORTCUT_PREFIX: &'static str = "current_player";

    pub fn new(players: Arc<dyn PlayerDirectory>) -> Self {
        Self {
            players,
            exclude_viewer: false,
            player_condition: None,
        }
    }

    /// Hide the viewer's own button from them.
    pub fn with_exclude_viewer(mut self, exclude_viewer: bool) -> Self {
        self.exclude_viewer = exclude_viewer;
        self
    }

    /// Requirement checked against each listed player during refresh.
    pub fn with_player_condition(mut self, condition: Box<dyn ViewerCondition>) -> Self {
        self.player_condition = Some(condition);
        self
    }
}

impl ValueDomain for PlayerListDomain {
    type Value = EntityId;

    fn shortcut_prefix(&self) -> &str {
        Self::SHORTCUT_PREFIX
    }

    fn values(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.players.online_players().into_iter()
    }

    fn shortcut_replacement(&self, argument: &str, value: &EntityId) -> String {
        player_shortcut(argument, *value)
    }

    fn value_indicator(&self) -> &str {
        "player"
    }

    fn value_as_string(&self, value: &EntityId) -> String {
        value.to_string()
    }

    fn is_value_activated(&self, value: &EntityId) -> bool {
        if !self.players.is_online(*value) {
            return false;
        }
        match &self.player_condition {
            Some(condition) => condition.check(*value).unwrap_or_else(|e| {
                tracing::debug!(player = %value, error = %e, "player condition failed");
                false
            }),
            None => true,
        }
    }

    fn can_view_value(&self, viewer: ViewerId, value: &EntityId) -> bool {
        if self.exclude_viewer && viewer == *value {
            return false;
        }
        self.players.can_see(viewer, *value)
    }
}

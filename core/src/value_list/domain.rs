use std::fmt;
use std::hash::Hash;

use crate::ids::ViewerId;

/// What a value-list mask needs to know about the values it shows.
///
/// The mask is generic over this trait and never looks at the concrete value
/// type beyond hashing and comparing it.
pub trait ValueDomain: Send + Sync + 'static {
    type Value: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Shortcut name rewritten inside templates, e.g. `current_player`.
    fn shortcut_prefix(&self) -> &str;

    /// Current backing values, in display order.
    fn values(&self) -> impl Iterator<Item = Self::Value> + '_;

    /// Text for `{<prefix>_<argument>}`; `argument` is empty for `{<prefix>}`.
    fn shortcut_replacement(&self, argument: &str, value: &Self::Value) -> String;

    /// Goes into generated button and condition names, e.g. `player`.
    fn value_indicator(&self) -> &str;

    fn value_as_string(&self, value: &Self::Value) -> String;

    /// Evaluated on each refresh cycle, not on render.
    fn is_value_activated(&self, value: &Self::Value) -> bool;

    /// Evaluated on render, before the viewer condition.
    fn can_view_value(&self, viewer: ViewerId, value: &Self::Value) -> bool;
}

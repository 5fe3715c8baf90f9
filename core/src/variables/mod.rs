//! Shared variable system
//!
//! Text anywhere in a menu may contain `{name}` variables. Resolvers are
//! registered under a name prefix and are asked to resolve the rest of the
//! name for a target entity. Masks that show one button per value use the
//! `current_` resolver to point a variable at "this value" without the rest
//! of the system knowing about values at all.

mod current;
mod manager;

pub use current::{
    CURRENT_PREFIX, IndirectionKey, player_shortcut, register_current_resolver,
};
pub use manager::{ExternalPlaceholders, VariableManager, VariableResolver};

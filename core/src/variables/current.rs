//! `current_` indirection.
//!
//! An indirection key has the shape `<target id>;<variable>[;<external>]`. It
//! resolves `{variable}` (or `%variable%` when `external` is `true`) with the
//! target id as the subject instead of whoever is viewing the menu.

use crate::ids::{EntityId, parse_entity_id};

use super::VariableManager;

pub const CURRENT_PREFIX: &str = "current_";

/// Player shortcut arguments starting with this go to the external provider.
const EXTERNAL_ARGUMENT_PREFIX: &str = "papi_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectionKey {
    pub target: EntityId,
    pub variable: String,
    pub external: bool,
}

impl IndirectionKey {
    pub fn new(target: EntityId, variable: impl Into<String>, external: bool) -> Self {
        Self {
            target,
            variable: variable.into(),
            external,
        }
    }

    /// Parse the part after the `current_` prefix. Malformed keys give `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ';');
        let target = parse_entity_id(parts.next()?)?;
        let variable = parts.next()?;
        let external = parts
            .next()
            .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
        Some(Self::new(target, variable, external))
    }

    /// The placeholder resolved against the target.
    pub fn inner_placeholder(&self) -> String {
        if self.external {
            format!("%{}%", self.variable)
        } else {
            format!("{{{}}}", self.variable)
        }
    }

    /// The full `{current_...}` variable, flag included.
    pub fn to_placeholder(&self) -> String {
        format!(
            "{{{CURRENT_PREFIX}{};{};{}}}",
            self.target, self.variable, self.external
        )
    }
}

fn resolve_current(
    query: &str,
    _viewer: Option<EntityId>,
    vars: &VariableManager,
) -> Option<String> {
    let key = IndirectionKey::parse(query)?;
    Some(vars.apply(&key.inner_placeholder(), Some(key.target)))
}

/// Register the `current_` resolver. Safe to call once per mask; only the
/// first call registers.
pub fn register_current_resolver(vars: &VariableManager) -> bool {
    let registered = vars.register(CURRENT_PREFIX, resolve_current);
    if registered {
        tracing::debug!("registered `{CURRENT_PREFIX}` variable resolver");
    }
    registered
}

/// Rewrite a `{current_player[_argument]}` shortcut for a concrete player.
///
/// No argument means the player's own name variable. An argument starting with
/// `papi_` is routed to the external provider with the marker stripped.
pub fn player_shortcut(argument: &str, target: EntityId) -> String {
    if argument.is_empty() {
        return format!("{{{CURRENT_PREFIX}{target};player}}");
    }
    let key = match argument.strip_prefix(EXTERNAL_ARGUMENT_PREFIX) {
        Some(variable) => IndirectionKey::new(target, variable, true),
        None => IndirectionKey::new(target, argument, false),
    };
    key.to_placeholder()
}

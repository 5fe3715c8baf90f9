use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use hashbrown::HashMap;
use regex::{Captures, Regex};

use crate::ids::EntityId;

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("variable pattern is valid"));

static GLOBAL: LazyLock<Arc<VariableManager>> = LazyLock::new(|| Arc::new(VariableManager::new()));

/// Resolves the part of a variable name that follows its registered prefix.
///
/// The manager is passed back in so a resolver can delegate to other
/// variables.
pub trait VariableResolver: Send + Sync {
    fn resolve(&self, query: &str, target: Option<EntityId>, vars: &VariableManager)
    -> Option<String>;
}

impl<F> VariableResolver for F
where
    F: Fn(&str, Option<EntityId>, &VariableManager) -> Option<String> + Send + Sync,
{
    fn resolve(
        &self,
        query: &str,
        target: Option<EntityId>,
        vars: &VariableManager,
    ) -> Option<String> {
        self(query, target, vars)
    }
}

/// Hook for a third-party `%name%` placeholder provider.
pub trait ExternalPlaceholders: Send + Sync {
    fn apply(&self, text: &str, target: Option<EntityId>) -> String;
}

/// Prefix-keyed variable registry.
///
/// One instance is shared process-wide through [`VariableManager::global`];
/// independent instances are useful for tests and embedding.
#[derive(Default)]
pub struct VariableManager {
    resolvers: RwLock<HashMap<String, Arc<dyn VariableResolver>>>,
    external: RwLock<Option<Arc<dyn ExternalPlaceholders>>>,
}

impl fmt::Debug for VariableManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        let external = self.external.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("VariableManager")
            .field("prefixes", &resolvers.keys().collect::<Vec<_>>())
            .field("external", &external.is_some())
            .finish()
    }
}

impl VariableManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Arc<VariableManager> {
        Arc::clone(&GLOBAL)
    }

    /// Register a resolver. Returns `false` and keeps the existing one if the
    /// prefix is already taken.
    pub fn register(&self, prefix: &str, resolver: impl VariableResolver + 'static) -> bool {
        let mut resolvers = self.resolvers.write().unwrap_or_else(PoisonError::into_inner);
        if resolvers.contains_key(prefix) {
            tracing::debug!(prefix, "variable prefix already registered");
            return false;
        }
        resolvers.insert(prefix.to_string(), Arc::new(resolver));
        true
    }

    pub fn unregister(&self, prefix: &str) -> bool {
        self.resolvers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(prefix)
            .is_some()
    }

    pub fn is_registered(&self, prefix: &str) -> bool {
        self.resolvers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(prefix)
    }

    pub fn set_external(&self, hook: Option<Arc<dyn ExternalPlaceholders>>) {
        *self.external.write().unwrap_or_else(PoisonError::into_inner) = hook;
    }

    /// Longest registered prefix of `query`. The resolver is cloned out so no
    /// lock is held while it runs.
    fn lookup(&self, query: &str) -> Option<(Arc<dyn VariableResolver>, usize)> {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers
            .iter()
            .filter(|(prefix, _)| query.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, resolver)| (Arc::clone(resolver), prefix.len()))
    }

    /// Resolve a bare variable name (without braces).
    pub fn resolve_variable(&self, query: &str, target: Option<EntityId>) -> Option<String> {
        let (resolver, prefix_len) = self.lookup(query)?;
        resolver.resolve(&query[prefix_len..], target, self)
    }

    /// Expand every `{name}` in `text`, then hand the result to the external
    /// provider if one is set.
    ///
    /// Names with no registered prefix are left as written. Names whose
    /// resolver gives up are removed.
    pub fn apply(&self, text: &str, target: Option<EntityId>) -> String {
        let replaced = VARIABLE_PATTERN.replace_all(text, |caps: &Captures<'_>| {
            let query = &caps[1];
            match self.lookup(query) {
                Some((resolver, prefix_len)) => resolver
                    .resolve(&query[prefix_len..], target, self)
                    .unwrap_or_default(),
                None => caps[0].to_string(),
            }
        });

        let external = self
            .external
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match external {
            Some(hook) if replaced.contains('%') => hook.apply(&replaced, target),
            _ => replaced.into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn echo_target(query: &str, target: Option<EntityId>, _: &VariableManager) -> Option<String> {
        Some(format!("{query}@{}", target.map(|t| t.to_string()).unwrap_or_default()))
    }

    #[test]
    fn test_register_is_idempotent() {
        let vars = VariableManager::new();
        assert!(vars.register("echo_", echo_target));
        assert!(!vars.register("echo_", |_: &str, _: Option<EntityId>, _: &VariableManager| {
            Some("second".to_string())
        }));
        assert_eq!(vars.resolve_variable("echo_x", None).as_deref(), Some("x@"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let vars = VariableManager::new();
        vars.register("a", |q: &str, _: Option<EntityId>, _: &VariableManager| {
            Some(format!("short:{q}"))
        });
        vars.register("ab", |q: &str, _: Option<EntityId>, _: &VariableManager| {
            Some(format!("long:{q}"))
        });
        assert_eq!(vars.resolve_variable("abc", None).as_deref(), Some("long:c"));
        assert_eq!(vars.resolve_variable("ax", None).as_deref(), Some("short:x"));
        assert_eq!(vars.resolve_variable("zzz", None), None);
    }

    #[test]
    fn test_apply_unknown_kept_unresolved_removed() {
        let vars = VariableManager::new();
        vars.register(
            "none_",
            |_: &str, _: Option<EntityId>, _: &VariableManager| -> Option<String> { None },
        );
        let id = Ulid::new();
        vars.register("echo_", echo_target);
        let out = vars.apply("[{unknown}] [{none_x}] [{echo_y}]", Some(id));
        assert_eq!(out, format!("[{{unknown}}] [] [y@{id}]"));
    }

    struct Percent;

    impl ExternalPlaceholders for Percent {
        fn apply(&self, text: &str, _target: Option<EntityId>) -> String {
            text.replace("%health%", "20")
        }
    }

    #[test]
    fn test_external_hook_runs_after_native() {
        let vars = VariableManager::new();
        assert_eq!(vars.apply("%health%", None), "%health%");
        vars.set_external(Some(Arc::new(Percent)));
        assert_eq!(vars.apply("hp %health%", None), "hp 20");
    }

    #[test]
    fn test_unregister() {
        let vars = VariableManager::new();
        vars.register("echo_", echo_target);
        assert!(vars.is_registered("echo_"));
        assert!(vars.unregister("echo_"));
        assert!(!vars.is_registered("echo_"));
        assert_eq!(vars.apply("{echo_x}", None), "{echo_x}");
    }
}

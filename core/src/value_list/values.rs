use crate::ids::ViewerId;

use super::ValueDomain;

/// One button per configured string value.
///
/// `{current_value}` is the value itself and `{current_value_index}` its
/// 1-based position. Every value is always active and visible.
#[derive(Debug, Clone)]
pub struct StaticValueDomain {
    values: Vec<String>,
    prefix: String,
}

impl StaticValueDomain {
    pub const DEFAULT_SHORTCUT_PREFIX: &'static str = "current_value";

    /// Duplicate values are dropped, first occurrence wins.
    pub fn new(values: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self {
            values: unique,
            prefix: Self::DEFAULT_SHORTCUT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueDomain for StaticValueDomain {
    type Value = String;

    fn shortcut_prefix(&self) -> &str {
        &self.prefix
    }

    fn values(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().cloned()
    }

    fn shortcut_replacement(&self, argument: &str, value: &String) -> String {
        match argument {
            "index" => self
                .values
                .iter()
                .position(|v| v == value)
                .map(|i| (i + 1).to_string())
                .unwrap_or_default(),
            _ => value.clone(),
        }
    }

    fn value_indicator(&self) -> &str {
        "value"
    }

    fn value_as_string(&self, value: &String) -> String {
        value.clone()
    }

    fn is_value_activated(&self, _value: &String) -> bool {
        true
    }

    fn can_view_value(&self, _viewer: ViewerId, _value: &String) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_order() {
        let domain = StaticValueDomain::new(["b", "a", "b", "c"].map(String::from));
        let values: Vec<String> = domain.values().collect();
        assert_eq!(values, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_replacements() {
        let domain = StaticValueDomain::new(["x", "y"].map(String::from));
        let y = "y".to_string();
        assert_eq!(domain.shortcut_replacement("", &y), "y");
        assert_eq!(domain.shortcut_replacement("index", &y), "2");
        assert_eq!(domain.shortcut_replacement("other", &y), "y");
    }
}

//! Shortcut placeholder matching and substitution.

use regex::Regex;

use super::{Template, TemplateMap};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid shortcut prefix `{prefix}`: {source}")]
    InvalidPrefix {
        prefix: String,
        #[source]
        source: regex::Error,
    },
}

/// Matches `{<prefix>}` and `{<prefix>_<argument>}` for one fixed prefix.
#[derive(Debug, Clone)]
pub struct ShortcutPattern {
    prefix: String,
    regex: Regex,
}

impl ShortcutPattern {
    pub fn new(prefix: &str) -> Result<Self, TemplateError> {
        let source = format!(r"\{{{}(_([^{{}}]+))?\}}", regex::escape(prefix));
        let regex = Regex::new(&source).map_err(|source| TemplateError::InvalidPrefix {
            prefix: prefix.to_string(),
            source,
        })?;
        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Rewrite every shortcut in `text`.
    ///
    /// Matches are taken left to right from the original text. Each match
    /// replaces all occurrences of its literal in the working copy; text that a
    /// replacement inserts is never scanned again.
    pub fn replace_str<F>(&self, text: &str, resolve: &F) -> String
    where
        F: Fn(&str) -> String + ?Sized,
    {
        let mut output = text.to_string();
        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let argument = caps.get(2).map_or("", |m| m.as_str());
            let replacement = resolve(argument);
            output = output.replace(whole.as_str(), &replacement);
        }
        output
    }

    /// Deep-copy a template node with shortcuts rewritten in every string leaf.
    pub fn substitute<F>(&self, node: &Template, resolve: &F) -> Template
    where
        F: Fn(&str) -> String + ?Sized,
    {
        match node {
            Template::String(text) => Template::String(self.replace_str(text, resolve)),
            Template::Array(items) => Template::Array(
                items
                    .iter()
                    .map(|item| self.substitute(item, resolve))
                    .collect(),
            ),
            Template::Table(table) => Template::Table(self.substitute_table(table, resolve)),
            other => other.clone(),
        }
    }

    /// Keys are kept as-is, in their original order.
    pub fn substitute_table<F>(&self, table: &TemplateMap, resolve: &F) -> TemplateMap
    where
        F: Fn(&str) -> String + ?Sized,
    {
        table
            .iter()
            .map(|(key, value)| (key.clone(), self.substitute(value, resolve)))
            .collect()
    }

    pub fn substitute_lines<F>(&self, lines: &[String], resolve: &F) -> Vec<String>
    where
        F: Fn(&str) -> String + ?Sized,
    {
        lines
            .iter()
            .map(|line| self.replace_str(line, resolve))
            .collect()
    }
}

/// Read a config node as a list of strings: a single string becomes a
/// one-element list, arrays are flattened element-wise.
pub fn string_list(node: &Template) -> Vec<String> {
    match node {
        Template::String(text) => vec![text.clone()],
        Template::Array(items) => items.iter().flat_map(string_list).collect(),
        Template::Table(_) => Vec::new(),
        other => vec![other.to_string()],
    }
}

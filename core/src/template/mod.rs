//! Template instantiation
//!
//! A template is a nested TOML structure (strings, arrays, tables) describing
//! one button. Each value shown by a mask gets its own copy of the template
//! with the mask's shortcut placeholders rewritten for that value:
//!
//! ```text
//! name = "Hello {current_player}"            (shared, read-only)
//!              │
//!     ShortcutPattern::substitute(value = U)
//!              ▼
//! name = "Hello {current_U;player}"          (owned by U's entry)
//! ```

mod shortcut;

pub use shortcut::{ShortcutPattern, TemplateError, string_list};

/// Shared template node type.
pub type Template = toml::Value;

/// Key-ordered template table.
pub type TemplateMap = toml::Table;

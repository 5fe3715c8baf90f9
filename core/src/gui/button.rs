use std::fmt;
use std::sync::Arc;

use crate::template::TemplateMap;

/// A built UI element. `init` and `stop` bracket its lifetime.
pub trait Button: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn init(&self) {}

    fn stop(&self) {}
}

pub type ButtonRef = Arc<dyn Button>;

/// Placeholder used when a button could not be built.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyButton;

impl Button for EmptyButton {
    fn name(&self) -> &str {
        ""
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("unknown button type `{0}`")]
    UnknownType(String),
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Builds buttons from a settings table.
///
/// `owner` is the menu the button belongs to, `name` is unique per button.
pub trait ButtonBuilder: Send + Sync {
    fn build(&self, owner: &str, name: &str, settings: &TemplateMap)
    -> Result<ButtonRef, BuildError>;
}

//! Collaborator seams towards the enclosing GUI framework.
//!
//! Buttons and requirement checks are built by the host; masks only hold them
//! behind these traits.

mod button;
mod condition;
mod mask;

pub use button::{BuildError, Button, ButtonBuilder, ButtonRef, EmptyButton};
pub use condition::{AlwaysPass, ConditionError, ConditionFactory, NeverPass, ViewerCondition};
pub use mask::{ButtonList, Mask, MaskRef, empty_button_list};

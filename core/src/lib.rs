pub mod animated;
pub mod config;
pub mod context;
pub mod gui;
pub mod ids;
pub mod scheduler;
pub mod template;
pub mod value_list;
pub mod variables;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use animated::AnimatedMask;
pub use config::{ConfigError, build_masks, load_file};
pub use context::MaskContext;
pub use gui::{
    Button, ButtonBuilder, ButtonList, ButtonRef, ConditionFactory, Mask, MaskRef, ViewerCondition,
};
pub use ids::{EntityId, ViewerId};
pub use scheduler::{Scheduler, TaskHandle, TickScheduler};
pub use value_list::{
    PlayerDirectory, PlayerListDomain, StaticValueDomain, ValueDomain, ValueListMask,
};
pub use variables::VariableManager;

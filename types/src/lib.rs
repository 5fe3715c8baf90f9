pub mod settings;
pub mod ticks;

pub use settings::{AnimatedSettings, MaskKind, ValueListSettings};
pub use ticks::{DEFAULT_MILLIS_PER_TICK, ticks_to_duration, viewer_ttl_millis};

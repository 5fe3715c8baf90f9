//! Value-list masks
//!
//! A value-list mask shows one button per value of a changing collection.
//!
//! ```text
//!  refresh task (every value-update ticks)        render (every frame, per viewer)
//!  ───────────────────────────────────────        ─────────────────────────────────
//!  domain.values()                                 ViewerRenderCache (TTL)
//!     │ first sight: template ─► substitute           │ stale?
//!     │             ─► ButtonBuilder / condition      ▼
//!     ▼                                            domain.values()
//!  ValueRegistry ◄──────── lookup ──────────────── ─► entry active?
//!     set activation flag                             can_view_value?
//!                                                     viewer condition?
//!                                                     ─► ordered ButtonList
//! ```

mod domain;
mod entry;
mod mask;
mod player;
mod registry;
mod render_cache;
mod values;


pub use domain::ValueDomain;
pub use entry::ValueEntry;
pub use mask::{ValueListMask, ValueListTemplate};
pub use player::{PlayerDirectory, PlayerListDomain};
pub use registry::{RefreshStats, ValueRegistry};
pub use render_cache::ViewerRenderCache;
pub use values::StaticValueDomain;

//! Entity identifiers.
//!
//! Players, viewers and any other addressable entity share one id type so the
//! variable system can scope a lookup to "whoever this id belongs to".

use ulid::Ulid;

pub type EntityId = Ulid;

/// The entity looking at a rendered mask.
pub type ViewerId = EntityId;

/// Parse an id as written into templates and indirection keys.
pub fn parse_entity_id(raw: &str) -> Option<EntityId> {
    Ulid::from_string(raw).ok()
}

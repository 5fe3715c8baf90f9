use std::sync::{Arc, LazyLock};

use crate::ids::ViewerId;

use super::ButtonRef;

/// Ordered buttons shown to one viewer. Shared, never edited in place.
pub type ButtonList = Arc<[ButtonRef]>;

pub type MaskRef = Arc<dyn Mask>;

static EMPTY: LazyLock<ButtonList> = LazyLock::new(|| Arc::from(Vec::new()));

pub fn empty_button_list() -> ButtonList {
    Arc::clone(&EMPTY)
}

/// A region of a menu that produces buttons per viewer.
pub trait Mask: Send + Sync {
    fn name(&self) -> &str;

    fn init(&self);

    fn stop(&self);

    fn buttons(&self, viewer: ViewerId) -> ButtonList;

    /// Called when the host re-renders a viewer's menu.
    fn refresh(&self, _viewer: ViewerId) {}
}

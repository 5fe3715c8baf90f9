//! Settings shared between the mask engine and its front ends.
//!
//! These are the parsed, defaulted forms of a mask section. The lenient
//! parsing itself (string numbers, key aliases) lives in the core config
//! loader; these types only carry the result and round-trip through serde so
//! a front end can print them back out.

use serde::{Deserialize, Serialize};

use crate::ticks::DEFAULT_MILLIS_PER_TICK;

/// Which mask implementation a section describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskKind {
    PlayerList,
    ValueList,
    Animated,
}

impl MaskKind {
    /// Resolve a `type = "..."` value. Case-insensitive, `_` and `-` are interchangeable.
    ///
    /// # Examples
    /// ```
    /// use roster_types::MaskKind;
    /// assert_eq!(MaskKind::from_name("player-list"), Some(MaskKind::PlayerList));
    /// assert_eq!(MaskKind::from_name("PLAYER_LIST"), Some(MaskKind::PlayerList));
    /// assert_eq!(MaskKind::from_name("values"), Some(MaskKind::ValueList));
    /// assert_eq!(MaskKind::from_name("slideshow"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "player-list" | "players" => Some(Self::PlayerList),
            "value-list" | "values" => Some(Self::ValueList),
            "animated" | "animation" => Some(Self::Animated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerList => "player-list",
            Self::ValueList => "value-list",
            Self::Animated => "animated",
        }
    }
}

/// Cadence and lifecycle settings of a value-list mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ValueListSettings {
    /// Ticks between two registry refreshes
    pub value_update_ticks: u64,
    /// Render cache TTL
    pub viewer_update_millis: u64,
    /// Run the refresh task off the host's primary lane
    #[serde(rename = "async")]
    pub run_async: bool,
    /// Drop entries unseen for this many refresh cycles. `0` keeps them forever.
    pub value_evict_cycles: u64,
    /// Length of one tick in millis
    pub millis_per_tick: u64,
}

impl ValueListSettings {
    pub const DEFAULT_VALUE_UPDATE_TICKS: u64 = 20;
    pub const DEFAULT_VIEWER_UPDATE_MILLIS: u64 = 50;
}

impl Default for ValueListSettings {
    fn default() -> Self {
        Self {
            value_update_ticks: Self::DEFAULT_VALUE_UPDATE_TICKS,
            viewer_update_millis: Self::DEFAULT_VIEWER_UPDATE_MILLIS,
            run_async: true,
            value_evict_cycles: 0,
            millis_per_tick: DEFAULT_MILLIS_PER_TICK,
        }
    }
}

/// Settings of an animated mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnimatedSettings {
    /// Ticks between frames. `0` never advances.
    #[serde(rename = "update")]
    pub update_ticks: u64,
    #[serde(rename = "async")]
    pub run_async: bool,
}

impl Default for AnimatedSettings {
    fn default() -> Self {
        Self {
            update_ticks: 0,
            run_async: true,
        }
    }
}

//! Menu file loading
//!
//! A menu file is TOML with one table per mask:
//!
//! ```toml
//! millis-per-tick = 50
//!
//! [mask.online]
//! type = "player-list"
//! value-update-ticks = 20
//! viewer-update-ticks = 1
//! exclude-viewer = true
//!
//! [mask.online.template]
//! label = "{current_player} ({current_player_papi_health})"
//! ```
//!
//! Individual settings are read leniently (see [`section`]); only structural
//! problems become a [`ConfigError`].

mod builder;
pub mod section;

use std::fs;
use std::path::{Path, PathBuf};

use crate::template::{TemplateError, TemplateMap};

pub use builder::{build_mask, build_masks};

/// Errors that can occur while loading a menu or building its masks
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse error in menu: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("mask `{mask}` is not a table")]
    InvalidSection { mask: String },
    #[error("mask `{mask}` has no type")]
    MissingType { mask: String },
    #[error("mask `{mask}` has unknown type `{kind}`")]
    UnknownType { mask: String, kind: String },
    #[error("mask `{mask}` lists players but no player directory is available")]
    MissingPlayers { mask: String },
    #[error("mask `{mask}`: {source}")]
    Template {
        mask: String,
        source: TemplateError,
    },
}

/// Parse menu text.
pub fn parse_menu(contents: &str) -> Result<TemplateMap, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Load a single menu file
pub fn load_file(path: &Path) -> Result<TemplateMap, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let menu = parse_menu(&contents)?;
    tracing::debug!(path = %path.display(), "loaded menu file");
    Ok(menu)
}

/// Menu file used when none is given
pub fn default_menu_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("roster").join("menu.toml"))
}

//! Persisted player preferences.
//!
//! Layered with `figment`: built-in defaults, then an optional JSON file, then `PACMAN_`-prefixed environment
//! variables (e.g. `PACMAN_SOUND_ENABLED=false`).

use std::fs;
use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "PACMAN_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sound_enabled: bool,
    /// `#RRGGBB`
    pub wall_colour: String,
    /// `#RRGGBB`
    pub player_colour: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            wall_colour: "#0000FF".to_string(),
            player_colour: "#FFFF00".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings, layering the file at `path` (if given and present) and the environment over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if a layer cannot be parsed, or [`ConfigError::InvalidColour`] if a colour
    /// is not `#RRGGBB`.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Json::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    fn extract(figment: Figment) -> Result<Settings, ConfigError> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_colour("wall_colour", &self.wall_colour)?;
        parse_colour("player_colour", &self.player_colour)?;
        Ok(())
    }

    pub fn wall_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_colour("wall_colour", &self.wall_colour)
    }

    pub fn player_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_colour("player_colour", &self.player_colour)
    }

    /// Writes the settings as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }
}

/// Parses a `#RRGGBB` colour.
pub fn parse_colour(field: &'static str, value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid = || ConfigError::InvalidColour {
        field,
        value: value.to_string(),
    };

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

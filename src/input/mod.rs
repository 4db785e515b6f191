//! Translation of raw host input (key names, text, swipes) into [`GameCommand`]s.
//!
//! Nothing here touches a device; hosts feed in what they captured.

use std::collections::HashMap;
use std::str::FromStr;

use bevy_ecs::resource::Resource;
use glam::Vec2;
use tracing::{debug, trace};

use crate::{
    constants::SWIPE_THRESHOLD,
    error::{GameError, GameResult},
    events::GameCommand,
    map::direction::Direction,
};

/// Key name to command table. Key names are matched case-insensitively.
#[derive(Debug, Clone, Resource)]
pub struct Bindings {
    key_bindings: HashMap<String, GameCommand>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut bindings = Self {
            key_bindings: HashMap::new(),
        };

        // Player movement
        for (keys, direction) in [
            (["up", "arrowup"], Direction::Up),
            (["down", "arrowdown"], Direction::Down),
            (["left", "arrowleft"], Direction::Left),
            (["right", "arrowright"], Direction::Right),
        ] {
            for key in keys {
                bindings.bind(key, GameCommand::MovePlayer(direction));
            }
        }

        // Game actions
        bindings.bind("p", GameCommand::TogglePause);
        bindings.bind("s", GameCommand::ToggleMute);
        bindings.bind("n", GameCommand::StartNewGame);
        bindings.bind("space", GameCommand::BeginCountdown);
        bindings.bind("h", GameCommand::Restart);
        bindings.bind("escape", GameCommand::Quit);
        bindings.bind("q", GameCommand::Quit);

        bindings
    }
}

impl Bindings {
    /// Binds `key`, replacing any previous binding.
    pub fn bind(&mut self, key: &str, command: GameCommand) {
        self.key_bindings.insert(key.to_ascii_lowercase(), command);
    }

    /// The command bound to `key`, if any. Unbound keys are left for the host to handle.
    pub fn command_for(&self, key: &str) -> Option<GameCommand> {
        let command = self.key_bindings.get(&key.to_ascii_lowercase()).copied();
        match command {
            Some(command) => trace!(key, ?command, "Key bound"),
            None => debug!(key, "Unbound key"),
        }
        command
    }
}

/// Parses a textual direction such as `"left"` or `"UP"`.
pub fn parse_direction(text: &str) -> GameResult<Direction> {
    Direction::from_str(text.trim()).map_err(|_| GameError::InvalidDirection(text.to_string()))
}

/// The direction of a swipe from `start` to `end` in screen space (y grows downward).
///
/// Swipes shorter than the threshold on both axes are ignored. The dominant axis wins; ties go vertical.
pub fn swipe_direction(start: Vec2, end: Vec2) -> Option<Direction> {
    let delta = end - start;
    let abs = delta.abs();
    if abs.x < SWIPE_THRESHOLD && abs.y < SWIPE_THRESHOLD {
        return None;
    }

    Some(if abs.x > abs.y {
        if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if delta.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_default_bindings() {
        let bindings = Bindings::default();
        assert_that(&bindings.command_for("ArrowLeft")).is_equal_to(Some(GameCommand::MovePlayer(Direction::Left)));
        assert_that(&bindings.command_for("P")).is_equal_to(Some(GameCommand::TogglePause));
        assert_that(&bindings.command_for("Escape")).is_equal_to(Some(GameCommand::Quit));
        assert_that(&bindings.command_for("F12")).is_none();
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut bindings = Bindings::default();
        bindings.bind("W", GameCommand::MovePlayer(Direction::Up));
        assert_that(&bindings.command_for("w")).is_equal_to(Some(GameCommand::MovePlayer(Direction::Up)));
    }

    #[test]
    fn test_parse_direction() {
        assert_that(&parse_direction(" Left ").ok()).is_equal_to(Some(Direction::Left));
        assert!(matches!(parse_direction("north"), Err(GameError::InvalidDirection(s)) if s == "north"));
    }

    #[test]
    fn test_swipe_direction() {
        let origin = Vec2::new(100.0, 100.0);
        assert_that(&swipe_direction(origin, Vec2::new(140.0, 110.0))).is_equal_to(Some(Direction::Right));
        assert_that(&swipe_direction(origin, Vec2::new(95.0, 40.0))).is_equal_to(Some(Direction::Up));
        assert_that(&swipe_direction(origin, Vec2::new(100.0, 130.0))).is_equal_to(Some(Direction::Down));
        assert_that(&swipe_direction(origin, Vec2::new(120.0, 80.0))).is_none();
    }
}

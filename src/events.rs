use bevy_ecs::prelude::*;

use crate::map::direction::Direction;

/// Something the outside world asks the simulation to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    /// Buffer a turn for the player. Ignored while paused.
    MovePlayer(Direction),
    Pause,
    Resume,
    TogglePause,
    ToggleMute,
    /// Reset score, lives, level and maze, then start playing immediately.
    StartNewGame,
    /// Count down, then start a new game.
    BeginCountdown,
    /// Reset everything and wait for a start command.
    Restart,
    /// Only meaningful to the host loop.
    Quit,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    /// The last pellet of the level was eaten this tick.
    LevelCleared,
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

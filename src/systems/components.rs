use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use strum_macros::Display;

use crate::constants::{scoring, STARTING_LIVES};
use crate::systems::{
    ghost::GhostState,
    movement::{Position, PreviousPosition, Velocity},
};

/// A tag component for entities that are controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Identity of a ghost. The derived ordering is the order ghosts move and collide in.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Ghost {
    Inky,
    Blinky,
    Pinky,
    Clyde,
}

impl Ghost {
    pub const ALL: [Ghost; 4] = [Ghost::Inky, Ghost::Blinky, Ghost::Pinky, Ghost::Clyde];

    /// Body colour, as `#RRGGBB`.
    pub const fn colour(self) -> &'static str {
        match self {
            Ghost::Inky => "#00FFDE",
            Ghost::Blinky => "#FF0000",
            Ghost::Pinky => "#FFB8DE",
            Ghost::Clyde => "#FFB847",
        }
    }
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub previous: PreviousPosition,
    pub velocity: Velocity,
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub state: GhostState,
    pub position: Position,
    pub previous: PreviousPosition,
    pub velocity: Velocity,
}

/// Simulation ticks elapsed, frozen while paused.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter(pub u64);

/// The current level, starting at 1.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(pub u32);

impl Default for Level {
    fn default() -> Self {
        Self(1)
    }
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResource(pub u32);

impl ScoreResource {
    /// Adds points and awards a life for every multiple of the extra-life score passed.
    ///
    /// Returns the number of lives awarded.
    pub fn add(&mut self, points: u32, lives: &mut PlayerLives) -> u32 {
        let before = self.0 / scoring::EXTRA_LIFE_EVERY;
        self.0 = self.0.saturating_add(points);
        let awarded = self.0 / scoring::EXTRA_LIFE_EVERY - before;
        lives.0 += awarded;
        awarded
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLives(pub u32);

impl Default for PlayerLives {
    fn default() -> Self {
        Self(STARTING_LIVES)
    }
}

impl PlayerLives {
    /// Removes a life, never going below zero. Returns `true` once no lives remain.
    pub fn lose_life(&mut self) -> bool {
        self.0 = self.0.saturating_sub(1);
        self.0 == 0
    }
}

/// Pellets and power pellets eaten during the current level.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PelletCount(pub u32);

/// Ghosts eaten since the last power pellet; multiplies the ghost bonus.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureChain(pub u32);

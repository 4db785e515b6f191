//! Audio cues emitted by the simulation.
//!
//! The core never plays anything itself. Systems write [`AudioEvent`]s; the host drains them once per tick
//! and hands them to whatever audio backend it has, which is also the only thing that honours [`AudioState::muted`].

use bevy_ecs::{event::Event, resource::Resource};
use strum_macros::{AsRefStr, Display, EnumIter};

/// Named sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Sound {
    /// A level is starting.
    Start,
    Die,
    EatGhost,
    /// A power pellet was eaten.
    EatPill,
    /// A regular pellet was eaten.
    Eating,
}

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    /// Whether audio is currently muted
    pub muted: bool,
}

/// Events for triggering audio playback
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// Play a specific sound effect
    PlaySound(Sound),
    /// Stop all currently playing sounds
    StopAll,
    /// Pause all sounds
    Pause,
    /// Resume all sounds
    Resume,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_cue_names() {
        let names: Vec<String> = Sound::iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["start", "die", "eat-ghost", "eat-pill", "eating"]);
    }
}

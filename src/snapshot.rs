//! Read-only view of the simulation handed to the renderer once per tick.

use bevy_ecs::{query::With, world::World};
use glam::IVec2;
use smallvec::SmallVec;

use crate::map::direction::Direction;
use crate::systems::{
    Ghost, GhostMode, GhostState, Level, PauseState, PlayerControlled, PlayerLives, Position, PreviousPosition,
    RoundState, GameStage, ScoreResource, TickCounter, Velocity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentView {
    /// Position before this tick's move.
    pub previous: IVec2,
    pub position: IVec2,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostView {
    pub ghost: Ghost,
    pub agent: AgentView,
    pub mode: GhostMode,
    /// Ticks since the ghost became vulnerable, for flashing.
    pub vulnerable_for: Option<u64>,
    pub colour: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub stage: GameStage,
    pub paused: bool,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Seconds left while counting down to a new game.
    pub countdown: Option<u64>,
    pub player: Option<AgentView>,
    pub ghosts: SmallVec<[GhostView; 4]>,
}

impl FrameSnapshot {
    pub fn capture(world: &mut World) -> FrameSnapshot {
        let tick = world.resource::<TickCounter>().0;
        let round = *world.resource::<RoundState>();

        let player = world
            .query_filtered::<(&Position, &PreviousPosition, &Velocity), With<PlayerControlled>>()
            .iter(world)
            .next()
            .map(|(position, previous, velocity)| AgentView {
                previous: previous.0,
                position: position.0,
                direction: velocity.direction,
            });

        let mut ghosts: SmallVec<[GhostView; 4]> = world
            .query::<(&Ghost, &GhostState, &Position, &PreviousPosition, &Velocity)>()
            .iter(world)
            .map(|(ghost, state, position, previous, velocity)| GhostView {
                ghost: *ghost,
                agent: AgentView {
                    previous: previous.0,
                    position: position.0,
                    direction: velocity.direction,
                },
                mode: state.mode(tick),
                vulnerable_for: state.vulnerable_for(tick),
                colour: ghost.colour(),
            })
            .collect();
        ghosts.sort_by_key(|view| view.ghost);

        FrameSnapshot {
            tick,
            stage: round.stage,
            paused: world.resource::<PauseState>().active(),
            score: world.resource::<ScoreResource>().0,
            lives: world.resource::<PlayerLives>().0,
            level: world.resource::<Level>().0,
            countdown: round.countdown_remaining(tick),
            player,
            ghosts,
        }
    }
}

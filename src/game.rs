//! This module contains the round controller, which owns the ECS world and drives it one tick at a time.

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::world::World;
use tracing::error;

use crate::constants::{speed, GHOST_SPAWN, PLAYER_SPAWN};
use crate::error::{GameError, GameResult};
use crate::events::{GameCommand, GameEvent};
use crate::formatter::{SimStamp, StageTag};
use crate::map::builder::Map;
use crate::snapshot::FrameSnapshot;
use crate::systems::{
    collision_system, command_system, ghost_movement_system, ghost_timer_system, is_playing, not_paused,
    player_control_system, player_movement_system, stage_system, tick_system, AudioEvent, AudioState, CaptureChain,
    GameStage, Ghost, GhostBundle, GhostRng, GhostState, Level, PauseState, PelletCount, PlayerBundle, PlayerControlled,
    PlayerLives, Position, PreviousPosition, RoundState, ScoreResource, TickCounter, Velocity,
};

/// Ordered phases of a single tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Apply queued commands.
    Commands,
    /// Advance the tick counter.
    Advance,
    /// Move agents, expire ghost timers, then resolve collisions.
    Gameplay,
    /// Timed stage transitions.
    Respond,
}

/// Owns every piece of mutable simulation state and advances it one fixed tick at a time.
pub struct RoundController {
    pub world: World,
    pub schedule: Schedule,
}

impl RoundController {
    /// Builds a controller on the reference maze with ghosts turning from a seeded random source.
    pub fn new(seed: u64) -> GameResult<RoundController> {
        Ok(Self::with_rng(Map::reference()?, GhostRng::seeded(seed)))
    }

    pub fn with_rng(map: Map, rng: GhostRng) -> RoundController {
        let mut world = World::default();
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, map, rng);
        Self::spawn_agents(&mut world);
        Self::configure_schedule(&mut schedule);

        RoundController { world, schedule }
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<AudioEvent>(world);
    }

    fn insert_resources(world: &mut World, map: Map, rng: GhostRng) {
        world.insert_resource(map);
        world.insert_resource(rng);
        world.insert_resource(TickCounter::default());
        world.insert_resource(Level::default());
        world.insert_resource(RoundState::default());
        world.insert_resource(PauseState::default());
        world.insert_resource(ScoreResource::default());
        world.insert_resource(PlayerLives::default());
        world.insert_resource(PelletCount::default());
        world.insert_resource(CaptureChain::default());
        world.insert_resource(AudioState::default());
    }

    fn spawn_agents(world: &mut World) {
        world.spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position(PLAYER_SPAWN),
            previous: PreviousPosition(PLAYER_SPAWN),
            velocity: Velocity::stopped(speed::PLAYER),
        });

        for ghost in Ghost::ALL {
            world.spawn(GhostBundle {
                ghost,
                state: GhostState::default(),
                position: Position(GHOST_SPAWN),
                previous: PreviousPosition(GHOST_SPAWN),
                velocity: Velocity::stopped(speed::GHOST),
            });
        }
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                (player_control_system, command_system).chain().in_set(TickSet::Commands),
                tick_system.in_set(TickSet::Advance),
                (ghost_movement_system, player_movement_system, ghost_timer_system, collision_system)
                    .chain()
                    .in_set(TickSet::Gameplay),
                stage_system.in_set(TickSet::Respond),
            ))
            .configure_sets(
                (
                    TickSet::Commands,
                    TickSet::Advance.run_if(not_paused),
                    TickSet::Gameplay.run_if(not_paused).run_if(is_playing),
                    TickSet::Respond.run_if(not_paused),
                )
                    .chain(),
            );
    }

    /// Queues a command for the next tick.
    pub fn send(&mut self, command: GameCommand) {
        self.world.resource_mut::<Events<GameEvent>>().send(GameEvent::Command(command));
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// Returns the first error any system reported during the tick. The tick itself has still run.
    pub fn tick(&mut self) -> GameResult<()> {
        self.schedule.run(&mut self.world);
        SimStamp {
            tick: self.tick_count(),
            level: self.level(),
            stage: StageTag::new(self.stage(), self.is_paused()),
        }
        .publish();

        let errors: Vec<GameError> = self.world.resource_mut::<Events<GameError>>().drain().collect();
        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<AudioEvent>>().update();

        let mut errors = errors.into_iter();
        match errors.next() {
            None => Ok(()),
            Some(first) => {
                for extra in errors {
                    error!(error = %extra, "Additional error during tick");
                }
                Err(first)
            }
        }
    }

    /// Takes the audio cues emitted since the last call, oldest first.
    ///
    /// Cues are fire-and-forget: anything not taken by the end of the following tick is dropped.
    pub fn drain_audio(&mut self) -> Vec<AudioEvent> {
        self.world.resource_mut::<Events<AudioEvent>>().drain().collect()
    }

    pub fn snapshot(&mut self) -> FrameSnapshot {
        FrameSnapshot::capture(&mut self.world)
    }

    pub fn map(&self) -> &Map {
        self.world.resource::<Map>()
    }

    pub fn stage(&self) -> GameStage {
        self.world.resource::<RoundState>().stage
    }

    pub fn tick_count(&self) -> u64 {
        self.world.resource::<TickCounter>().0
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreResource>().0
    }

    pub fn lives(&self) -> u32 {
        self.world.resource::<PlayerLives>().0
    }

    pub fn level(&self) -> u32 {
        self.world.resource::<Level>().0
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<PauseState>().active()
    }

    pub fn audio_muted(&self) -> bool {
        self.world.resource::<AudioState>().muted
    }

    /// Sets the initial mute state, e.g. from saved settings.
    pub fn set_muted(&mut self, muted: bool) {
        self.world.resource_mut::<AudioState>().muted = muted;
    }
}

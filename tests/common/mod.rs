#![allow(dead_code)]

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    query::With,
    world::World,
};
use glam::IVec2;
use pacman_core::{
    constants::{speed, GHOST_SPAWN},
    events::{GameCommand, GameEvent},
    game::RoundController,
    map::{builder::Map, direction::Direction},
    systems::{
        AudioEvent, CaptureChain, GameStage, Ghost, GhostBundle, GhostRng, GhostState, PelletCount, PlayerBundle,
        PlayerControlled, PlayerLives, Position, PreviousPosition, ScoreResource, TickCounter, Velocity,
    },
};

pub const SEED: u64 = 0x5EED;

/// A controller that has already started a game and run its first tick.
pub fn playing_controller(seed: u64) -> RoundController {
    let mut controller = RoundController::new(seed).expect("reference maze should build");
    controller.send(GameCommand::StartNewGame);
    controller.tick().expect("first tick should succeed");
    assert_eq!(controller.stage(), GameStage::Playing);
    controller
}

/// Ticks `n` times, failing the test on any error.
pub fn tick_n(controller: &mut RoundController, n: usize) {
    for _ in 0..n {
        controller.tick().expect("tick should succeed");
    }
}

pub fn player_entity(world: &mut World) -> Entity {
    world
        .query_filtered::<Entity, With<PlayerControlled>>()
        .single(world)
        .expect("exactly one player")
}

pub fn ghost_entity(world: &mut World, ghost: Ghost) -> Entity {
    world
        .query::<(Entity, &Ghost)>()
        .iter(world)
        .find(|(_, g)| **g == ghost)
        .map(|(entity, _)| entity)
        .expect("ghost should exist")
}

pub fn player_position(world: &mut World) -> IVec2 {
    let player = player_entity(world);
    world.get::<Position>(player).expect("player has a position").0
}

/// Puts a ghost at `position`, stationary, with the given timers.
pub fn place_ghost(world: &mut World, ghost: Ghost, position: IVec2, state: GhostState) {
    let entity = ghost_entity(world, ghost);
    let mut entity = world.entity_mut(entity);
    entity.insert((Position(position), PreviousPosition(position), Velocity::stopped(speed::GHOST), state));
}

/// Puts the player at `position` with the given velocity.
pub fn place_player(world: &mut World, position: IVec2, velocity: Velocity) {
    let player = player_entity(world);
    world
        .entity_mut(player)
        .insert((Position(position), PreviousPosition(position), velocity));
}

/// Heading `direction` at player speed, with no turn buffered.
pub fn heading(direction: Direction) -> Velocity {
    Velocity {
        direction: Some(direction),
        next_direction: Some(direction),
        speed: speed::PLAYER,
    }
}

pub fn ghost_state(world: &mut World, ghost: Ghost) -> GhostState {
    let entity = ghost_entity(world, ghost);
    *world.get::<GhostState>(entity).expect("ghost has a state")
}

pub fn ghost_velocity(world: &mut World, ghost: Ghost) -> Velocity {
    let entity = ghost_entity(world, ghost);
    *world.get::<Velocity>(entity).expect("ghost has a velocity")
}

/// Parks every ghost on the spawn, stationary and harmless to the test at hand.
pub fn park_ghosts(world: &mut World) {
    for ghost in Ghost::ALL {
        place_ghost(world, ghost, GHOST_SPAWN, GhostState::default());
    }
}

/// A bare world for driving single systems, with the resources they read.
pub fn create_test_world() -> World {
    let mut world = World::default();
    EventRegistry::register_event::<pacman_core::error::GameError>(&mut world);
    EventRegistry::register_event::<GameEvent>(&mut world);
    EventRegistry::register_event::<AudioEvent>(&mut world);

    world.insert_resource(Map::reference().expect("reference maze should build"));
    world.insert_resource(GhostRng::seeded(SEED));
    world.insert_resource(TickCounter::default());
    world.insert_resource(ScoreResource::default());
    world.insert_resource(PlayerLives::default());
    world.insert_resource(CaptureChain::default());
    world.insert_resource(PelletCount::default());
    world
}

pub fn spawn_test_player(world: &mut World, position: IVec2, velocity: Velocity) -> Entity {
    world
        .spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position(position),
            previous: PreviousPosition(position),
            velocity,
        })
        .id()
}

pub fn spawn_test_ghost(world: &mut World, ghost: Ghost, state: GhostState) -> Entity {
    world
        .spawn(GhostBundle {
            ghost,
            state,
            position: Position(GHOST_SPAWN),
            previous: PreviousPosition(GHOST_SPAWN),
            velocity: Velocity::stopped(speed::GHOST),
        })
        .id()
}

pub fn audio_events(world: &mut World) -> Vec<AudioEvent> {
    world.resource_mut::<Events<AudioEvent>>().drain().collect()
}

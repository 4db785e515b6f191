use bevy_ecs::{
    event::{EventReader, EventWriter},
    query::{With, Without},
    system::{Query, Res, ResMut},
};
use tracing::{debug, info, trace};

use crate::{
    constants::{scoring, speed, MapTile, CELL_UNITS, EAT_TOLERANCE, PELLETS_PER_LEVEL, PLAYER_SPAWN},
    error::GameError,
    events::{GameCommand, GameEvent},
    map::{builder::Map, direction::Direction},
    systems::{
        audio::{AudioEvent, Sound},
        components::{CaptureChain, Ghost, PelletCount, PlayerControlled, PlayerLives, ScoreResource, TickCounter},
        ghost::{frighten, GhostState},
        movement::{advance, cell_ahead, MoveOutcome, Position, PreviousPosition, TurnPolicy, Velocity},
        state::PauseState,
    },
};

/// Returns the player to the spawn point, stationary, without touching score or lives.
pub fn reset_player(position: &mut Position, previous: &mut PreviousPosition, velocity: &mut Velocity) {
    position.0 = PLAYER_SPAWN;
    previous.0 = PLAYER_SPAWN;
    *velocity = Velocity::stopped(speed::PLAYER);
}

/// Whether the player is close enough to a cell centre, along its axis of travel, to eat.
pub fn within_eat_tolerance(position: Position, direction: Direction) -> bool {
    let along = if direction.is_horizontal() { position.0.x } else { position.0.y };
    let offset = along.rem_euclid(CELL_UNITS);
    offset.min(CELL_UNITS - offset) < EAT_TOLERANCE
}

/// Buffers directional intent from input commands.
pub fn player_control_system(
    mut events: EventReader<GameEvent>,
    pause: Res<PauseState>,
    mut players: Query<&mut Velocity, With<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    let mut velocity = match players.single_mut() {
        Ok(velocity) => velocity,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for player system: {}",
                e
            )));
            return;
        }
    };

    for event in events.read() {
        if let GameEvent::Command(GameCommand::MovePlayer(direction)) = event {
            if pause.active() {
                trace!(?direction, "Ignoring direction while paused");
                continue;
            }
            velocity.next_direction = Some(*direction);
        }
    }
}

/// Moves the player and eats whatever lies in the cell ahead.
#[allow(clippy::too_many_arguments)]
pub fn player_movement_system(
    tick: Res<TickCounter>,
    mut map: ResMut<Map>,
    mut score: ResMut<ScoreResource>,
    mut lives: ResMut<PlayerLives>,
    mut pellets: ResMut<PelletCount>,
    mut chain: ResMut<CaptureChain>,
    mut players: Query<(&mut Position, &mut PreviousPosition, &mut Velocity), (With<PlayerControlled>, Without<Ghost>)>,
    mut ghosts: Query<(&mut GhostState, &mut Velocity), (With<Ghost>, Without<PlayerControlled>)>,
    mut audio: EventWriter<AudioEvent>,
    mut events: EventWriter<GameEvent>,
    mut errors: EventWriter<GameError>,
) {
    let Ok((mut position, mut previous, mut velocity)) = players.single_mut() else {
        errors.write(GameError::InvalidState("Expected exactly one player".to_string()));
        return;
    };

    previous.0 = position.0;
    let (to, direction) = match advance(&map, position.0, &velocity, TurnPolicy::Player) {
        MoveOutcome::Moved { to, direction, .. } => (to, direction),
        MoveOutcome::Blocked => {
            velocity.direction = None;
            return;
        }
    };
    velocity.direction = direction;
    position.0 = to;

    let Some(direction) = direction else {
        return;
    };

    let ahead = cell_ahead(position.0, direction);
    let Some(tile) = map.tile(ahead) else {
        return;
    };
    if !tile.is_edible() || !within_eat_tolerance(*position, direction) {
        return;
    }

    if let Err(e) = map.consume(ahead) {
        errors.write(e);
        return;
    }
    pellets.0 += 1;

    match tile {
        MapTile::PowerPellet => {
            score.add(scoring::POWER_PELLET, &mut lives);
            audio.write(AudioEvent::PlaySound(Sound::EatPill));
            chain.0 = 0;
            for (mut state, mut ghost_velocity) in ghosts.iter_mut() {
                frighten(&mut state, &mut ghost_velocity, tick.0);
            }
            debug!(cell = ?ahead, tick = tick.0, "Power pellet eaten, ghosts frightened");
        }
        _ => {
            score.add(scoring::PELLET, &mut lives);
            audio.write(AudioEvent::PlaySound(Sound::Eating));
        }
    }

    if pellets.0 >= PELLETS_PER_LEVEL {
        info!(score = score.0, "Level cleared");
        events.write(GameEvent::LevelCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_eat_tolerance_accepts_any_offset() {
        for x in 80..=90 {
            assert!(within_eat_tolerance(Position(IVec2::new(x, 160)), Direction::Left));
        }
    }
}

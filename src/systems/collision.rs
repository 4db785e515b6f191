use bevy_ecs::{
    event::EventWriter,
    query::{With, Without},
    system::{Query, Res, ResMut, Single},
};
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::{
    constants::{scoring, COLLISION_DISTANCE, PELLETS_PER_LEVEL},
    error::GameError,
    systems::{
        audio::{AudioEvent, Sound},
        components::{CaptureChain, Ghost, PelletCount, PlayerControlled, PlayerLives, ScoreResource, TickCounter},
        ghost::GhostState,
        movement::Position,
        state::{GameStage, RoundState},
    },
};

/// Resolves contact between the player and each ghost, in ghost order.
///
/// A vulnerable ghost is captured and scores `50 × chain`; a dangerous one kills the player. When several
/// ghosts are touched in the same tick, the stage set by the last one stands. Nothing is resolved on the tick
/// the last pellet is eaten, since clearing the level wins.
#[allow(clippy::too_many_arguments)]
pub fn collision_system(
    tick: Res<TickCounter>,
    mut round: ResMut<RoundState>,
    mut score: ResMut<ScoreResource>,
    mut lives: ResMut<PlayerLives>,
    mut chain: ResMut<CaptureChain>,
    pellets: Res<PelletCount>,
    player: Single<&Position, (With<PlayerControlled>, Without<Ghost>)>,
    mut ghosts: Query<(&Ghost, &Position, &mut GhostState), Without<PlayerControlled>>,
    mut audio: EventWriter<AudioEvent>,
    mut errors: EventWriter<GameError>,
) {
    if pellets.0 >= PELLETS_PER_LEVEL {
        trace!(tick = tick.0, "Level cleared this tick, skipping collisions");
        return;
    }

    let player = *player;
    let mut ordered: SmallVec<[_; 4]> = ghosts.iter_mut().collect();
    ordered.sort_by_key(|(ghost, ..)| **ghost);

    for (ghost, position, mut state) in ordered {
        if player.distance(position) >= COLLISION_DISTANCE {
            continue;
        }

        let next = if state.is_vulnerable() {
            state.capture(tick.0);
            chain.0 += 1;
            let points = scoring::GHOST_BASE * chain.0;
            score.add(points, &mut lives);
            audio.write(AudioEvent::PlaySound(Sound::EatGhost));
            debug!(ghost = %ghost, points, chain = chain.0, "Ghost captured");
            GameStage::EatenPause
        } else if state.is_dangerous() {
            audio.write(AudioEvent::PlaySound(Sound::Die));
            info!(ghost = %ghost, lives = lives.0, "Player caught");
            GameStage::Dying
        } else {
            continue;
        };

        if let Err(e) = round.enter(next, tick.0) {
            errors.write(e);
        }
    }
}

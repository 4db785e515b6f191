use bevy_ecs::{
    component::Component,
    query::Without,
    resource::Resource,
    system::{Query, Res, ResMut},
};
use glam::IVec2;
use rand::{rngs::SmallRng, seq::IndexedRandom, RngCore, SeedableRng};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
    constants::{durations, speed, GHOST_SPAWN},
    map::{builder::Map, direction::Direction},
    systems::{
        components::{Ghost, PlayerControlled, TickCounter},
        movement::{advance, MoveOutcome, Position, PreviousPosition, TurnPolicy, Velocity},
    },
};

/// Random picks tried before a blocked ghost falls back to a fixed turn order.
const MAX_RANDOM_TURNS: usize = 8;

/// The two timers a ghost's mode is derived from.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GhostState {
    /// Tick the ghost was last frightened by a power pellet.
    pub vulnerable_since: Option<u64>,
    /// Tick the ghost was eaten.
    pub captured_since: Option<u64>,
}

/// Behaviour mode, derived from [`GhostState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostMode {
    Dangerous,
    Vulnerable,
    /// Still vulnerable, but close to recovering.
    VulnerableExpiring,
    Captured,
}

impl GhostState {
    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable_since.is_some()
    }

    pub fn is_captured(&self) -> bool {
        self.captured_since.is_some()
    }

    /// Only a ghost on its way back to the den is harmless when not vulnerable.
    pub fn is_dangerous(&self) -> bool {
        !self.is_captured()
    }

    pub fn mode(&self, tick: u64) -> GhostMode {
        match (self.vulnerable_since, self.captured_since) {
            (Some(since), _) if tick.saturating_sub(since) > durations::VULNERABLE_EXPIRING => GhostMode::VulnerableExpiring,
            (Some(_), _) => GhostMode::Vulnerable,
            (None, Some(_)) => GhostMode::Captured,
            (None, None) => GhostMode::Dangerous,
        }
    }

    /// Ticks since the ghost became vulnerable, if it is.
    pub fn vulnerable_for(&self, tick: u64) -> Option<u64> {
        self.vulnerable_since.map(|since| tick.saturating_sub(since))
    }

    pub fn speed(&self) -> i32 {
        if self.is_vulnerable() {
            speed::GHOST_VULNERABLE
        } else if self.is_captured() {
            speed::GHOST_CAPTURED
        } else {
            speed::GHOST
        }
    }

    /// A power pellet restarts the vulnerable timer, even for a ghost still returning to the den.
    pub fn make_vulnerable(&mut self, tick: u64) {
        self.vulnerable_since = Some(tick);
        self.captured_since = None;
    }

    pub fn capture(&mut self, tick: u64) {
        self.vulnerable_since = None;
        self.captured_since = Some(tick);
    }

    /// Clears any timer that has run its course. Returns `true` if anything changed.
    pub fn expire(&mut self, tick: u64) -> bool {
        let mut changed = false;
        if self.vulnerable_since.is_some_and(|since| tick.saturating_sub(since) > durations::VULNERABLE) {
            self.vulnerable_since = None;
            changed = true;
        }
        if self.captured_since.is_some_and(|since| tick.saturating_sub(since) > durations::CAPTURED) {
            self.captured_since = None;
            changed = true;
        }
        changed
    }
}

/// Source of randomness for ghost turning. Swappable so tests can make ghosts deterministic.
#[derive(Resource)]
pub struct GhostRng(Box<dyn RngCore + Send + Sync>);

impl GhostRng {
    pub fn new(rng: impl RngCore + Send + Sync + 'static) -> Self {
        Self(Box::new(rng))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Picks one of two directions with equal odds.
    pub fn pick(&mut self, options: &[Direction; 2]) -> Direction {
        options.choose(self.0.as_mut()).copied().unwrap_or(options[0])
    }
}

/// Puts a ghost back in the den with no timers running.
pub fn reset_ghost(state: &mut GhostState, position: &mut Position, previous: &mut PreviousPosition, velocity: &mut Velocity) {
    *state = GhostState::default();
    position.0 = GHOST_SPAWN;
    previous.0 = position.0;
    *velocity = Velocity::stopped(speed::GHOST);
}

/// Frightens a ghost: it turns around and becomes capturable.
pub fn frighten(state: &mut GhostState, velocity: &mut Velocity, tick: u64) {
    state.make_vulnerable(tick);
    velocity.direction = velocity.direction.map(Direction::opposite);
}

/// Moves one ghost, picking random perpendicular turns until it finds a way forward.
///
/// Returns the new position; the velocity is updated in place, including the turn buffered for next tick.
pub fn move_ghost(map: &Map, rng: &mut GhostRng, position: IVec2, velocity: &mut Velocity) -> IVec2 {
    let mut attempts = 0;
    let outcome = loop {
        match advance(map, position, velocity, TurnPolicy::Ghost) {
            MoveOutcome::Blocked if attempts < MAX_RANDOM_TURNS => {
                attempts += 1;
                velocity.next_direction = Some(rng.pick(&Direction::perpendicular(velocity.direction)));
            }
            MoveOutcome::Blocked => break fallback_turn(map, position, velocity),
            moved => break moved,
        }
    };

    match outcome {
        MoveOutcome::Moved { to, direction, .. } => {
            velocity.direction = direction;
            velocity.next_direction = Some(rng.pick(&Direction::perpendicular(direction)));
            to
        }
        MoveOutcome::Blocked => {
            warn!(?position, direction = ?velocity.direction, "Ghost has no open direction");
            position
        }
    }
}

/// Tries both perpendicular turns, then reversing, in a fixed order.
fn fallback_turn(map: &Map, position: IVec2, velocity: &mut Velocity) -> MoveOutcome {
    let mut options: SmallVec<[Direction; 3]> = SmallVec::from_slice(&Direction::perpendicular(velocity.direction));
    if let Some(direction) = velocity.direction {
        options.push(direction.opposite());
    }

    for option in options {
        velocity.next_direction = Some(option);
        let outcome = advance(map, position, velocity, TurnPolicy::Ghost);
        if outcome != MoveOutcome::Blocked {
            trace!(?position, direction = ?option, "Ghost took fallback turn");
            return outcome;
        }
    }
    MoveOutcome::Blocked
}

/// Moves every ghost one tick, in ghost order so the random stream is consumed deterministically.
pub fn ghost_movement_system(
    map: Res<Map>,
    mut rng: ResMut<GhostRng>,
    mut ghosts: Query<(&Ghost, &GhostState, &mut Position, &mut PreviousPosition, &mut Velocity), Without<PlayerControlled>>,
) {
    let mut ordered: SmallVec<[_; 4]> = ghosts.iter_mut().collect();
    ordered.sort_by_key(|(ghost, ..)| **ghost);

    for (_ghost, state, mut position, mut previous, mut velocity) in ordered {
        velocity.speed = state.speed();
        previous.0 = position.0;
        position.0 = move_ghost(&map, &mut rng, position.0, &mut velocity);
    }
}

/// Lets vulnerable and captured ghosts recover once their time is up.
pub fn ghost_timer_system(tick: Res<TickCounter>, mut ghosts: Query<(&Ghost, &mut GhostState)>) {
    for (ghost, mut state) in ghosts.iter_mut() {
        if state.expire(tick.0) {
            debug!(ghost = %ghost, mode = ?state.mode(tick.0), "Ghost timer expired");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vulnerability_window() {
        let mut state = GhostState::default();
        state.make_vulnerable(100);

        let mut probe = state;
        probe.expire(100 + durations::VULNERABLE);
        assert!(probe.is_vulnerable());

        state.expire(100 + durations::VULNERABLE + 1);
        assert!(!state.is_vulnerable());
        assert_eq!(state.mode(400), GhostMode::Dangerous);
    }

    #[test]
    fn test_expiring_threshold_shares_timer() {
        let mut state = GhostState::default();
        state.make_vulnerable(0);
        assert_eq!(state.mode(durations::VULNERABLE_EXPIRING), GhostMode::Vulnerable);
        assert_eq!(state.mode(durations::VULNERABLE_EXPIRING + 1), GhostMode::VulnerableExpiring);
    }

    #[test]
    fn test_capture_clears_vulnerability() {
        let mut state = GhostState::default();
        state.make_vulnerable(0);
        state.capture(10);
        assert_eq!(state.mode(11), GhostMode::Captured);
        assert!(!state.is_dangerous());
        assert_eq!(state.speed(), speed::GHOST_CAPTURED);

        state.expire(10 + durations::CAPTURED + 1);
        assert_eq!(state.mode(200), GhostMode::Dangerous);
    }

    #[test]
    fn test_frighten_reverses() {
        let mut state = GhostState::default();
        let mut velocity = Velocity {
            direction: Some(Direction::Left),
            next_direction: Some(Direction::Up),
            speed: speed::GHOST,
        };
        frighten(&mut state, &mut velocity, 5);
        assert_eq!(velocity.direction, Some(Direction::Right));
        assert_eq!(state.speed(), speed::GHOST_VULNERABLE);
    }

    #[test]
    fn test_ghost_leaves_spawn_horizontally() {
        let map = Map::reference().unwrap();
        let mut rng = GhostRng::seeded(7);
        let mut velocity = Velocity::stopped(speed::GHOST);
        let spawn = GHOST_SPAWN;

        // First tick only buffers a turn, the second takes it
        assert_eq!(move_ghost(&map, &mut rng, spawn, &mut velocity), spawn);
        let next = move_ghost(&map, &mut rng, spawn, &mut velocity);
        assert_eq!(next.y, spawn.y);
        assert_eq!((next.x - spawn.x).abs(), speed::GHOST);
    }
}

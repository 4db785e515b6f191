//! Grid-locked motion shared by the player and the ghosts.
//!
//! Everything here is a pure function of a position, a [`Velocity`] and the [`Map`]; the player and ghost
//! systems decide what to do when a move is blocked.

use bevy_ecs::component::Component;
use glam::IVec2;

use crate::constants::{CELL_UNITS, TUNNEL_LEFT_X, TUNNEL_RIGHT_X, TUNNEL_ROW_Y};
use crate::map::builder::Map;
use crate::map::cell_of;
use crate::map::direction::Direction;

/// Position in sub-cell units.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position(pub IVec2);

impl Position {
    /// Both axes sit exactly on a cell boundary.
    pub fn is_grid_aligned(&self) -> bool {
        is_grid_aligned(self.0)
    }

    /// The nearest grid cell.
    pub fn cell(&self) -> IVec2 {
        cell_of(self.0)
    }

    pub fn distance(&self, other: &Position) -> f32 {
        self.0.as_vec2().distance(other.0.as_vec2())
    }
}

/// Where the entity was before its most recent move, for incremental redraw.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviousPosition(pub IVec2);

/// Current heading, buffered turn and speed in sub-cell units per tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Velocity {
    pub direction: Option<Direction>,
    pub next_direction: Option<Direction>,
    pub speed: i32,
}

impl Velocity {
    pub fn stopped(speed: i32) -> Self {
        Self {
            direction: None,
            next_direction: None,
            speed,
        }
    }
}

/// When a requested turn may be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPolicy {
    /// Turns need grid alignment and open floor, but reversing along the current axis is always allowed.
    Player,
    /// Every turn, including reversal, needs grid alignment and open floor.
    Ghost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        from: IVec2,
        to: IVec2,
        direction: Option<Direction>,
    },
    /// A wall is directly ahead; nothing changed.
    Blocked,
}

pub fn is_grid_aligned(position: IVec2) -> bool {
    position.x.rem_euclid(CELL_UNITS) == 0 && position.y.rem_euclid(CELL_UNITS) == 0
}

/// Adds `delta` to a single coordinate without overshooting the next cell boundary.
pub fn bounded_add(value: i32, delta: i32) -> i32 {
    let rem = value.rem_euclid(CELL_UNITS);
    if rem != 0 && rem + delta > CELL_UNITS {
        value + (CELL_UNITS - rem)
    } else if rem > 0 && rem + delta < 0 {
        value - rem
    } else {
        value + delta
    }
}

/// Moves `speed` units in `direction`, clamped to the next cell boundary.
pub fn step(position: IVec2, direction: Direction, speed: i32) -> IVec2 {
    let delta = direction.as_ivec2() * speed;
    IVec2::new(bounded_add(position.x, delta.x), bounded_add(position.y, delta.y))
}

/// Snaps a coordinate to the next cell boundary in the direction of travel.
pub fn next_boundary(value: i32, direction: Direction) -> i32 {
    let rem = value.rem_euclid(CELL_UNITS);
    if rem == 0 {
        value
    } else if direction.is_positive() {
        value + (CELL_UNITS - rem)
    } else {
        value - rem
    }
}

/// The cell an agent at `position` is heading into.
pub fn cell_ahead(position: IVec2, direction: Direction) -> IVec2 {
    cell_of(IVec2::new(
        next_boundary(position.x, direction),
        next_boundary(position.y, direction),
    ))
}

/// Teleports through the open ends of the tunnel row.
pub fn wrap_tunnel(position: IVec2, direction: Option<Direction>) -> IVec2 {
    if position.y != TUNNEL_ROW_Y {
        return position;
    }

    match direction {
        Some(Direction::Right) if position.x >= TUNNEL_RIGHT_X => IVec2::new(TUNNEL_LEFT_X, position.y),
        Some(Direction::Left) if position.x <= TUNNEL_LEFT_X => IVec2::new(TUNNEL_RIGHT_X, position.y),
        _ => position,
    }
}

/// Resolves one tick of motion.
///
/// A buffered turn is taken when the policy allows it. Otherwise the agent keeps going the way it was facing,
/// unless it is aligned with a wall directly ahead, in which case the move is [`MoveOutcome::Blocked`].
/// A stationary agent "moves" in place.
pub fn advance(map: &Map, position: IVec2, velocity: &Velocity, policy: TurnPolicy) -> MoveOutcome {
    let aligned = is_grid_aligned(position);
    let mut direction = velocity.direction;
    let mut candidate = None;

    if velocity.next_direction != velocity.direction {
        if let Some(desired) = velocity.next_direction {
            let turned = step(position, desired, velocity.speed);
            let reversal = policy == TurnPolicy::Player && velocity.direction.is_some_and(|d| d.same_axis(desired));

            if reversal || (aligned && map.is_floor(cell_ahead(turned, desired))) {
                direction = Some(desired);
                candidate = Some(turned);
            }
        }
    }

    let Some(heading) = direction else {
        return MoveOutcome::Moved {
            from: position,
            to: position,
            direction: None,
        };
    };

    let candidate = candidate.unwrap_or_else(|| step(position, heading, velocity.speed));
    if aligned && map.is_wall(cell_ahead(candidate, heading)) {
        return MoveOutcome::Blocked;
    }

    MoveOutcome::Moved {
        from: position,
        to: wrap_tunnel(candidate, direction),
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Map {
        Map::reference().unwrap()
    }

    fn moving(direction: Direction, speed: i32) -> Velocity {
        Velocity {
            direction: Some(direction),
            next_direction: Some(direction),
            speed,
        }
    }

    #[test]
    fn test_bounded_add_clamps_overshoot() {
        assert_eq!(bounded_add(0, 4), 4);
        assert_eq!(bounded_add(8, 4), 10);
        assert_eq!(bounded_add(2, -4), 0);
        assert_eq!(bounded_add(10, -4), 6);
        assert_eq!(bounded_add(16, 4), 20);
        assert_eq!(bounded_add(-8, -4), -10);
    }

    #[test]
    fn test_next_boundary() {
        assert_eq!(next_boundary(90, Direction::Left), 90);
        assert_eq!(next_boundary(88, Direction::Left), 80);
        assert_eq!(next_boundary(88, Direction::Right), 90);
        assert_eq!(next_boundary(-2, Direction::Left), -10);
        assert_eq!(next_boundary(-2, Direction::Right), 0);
    }

    #[test]
    fn test_blocked_by_wall_when_aligned() {
        // (1, 1) has a wall above it
        let outcome = advance(&map(), IVec2::new(10, 10), &moving(Direction::Up, 2), TurnPolicy::Player);
        assert_eq!(outcome, MoveOutcome::Blocked);
    }

    #[test]
    fn test_turn_requires_alignment_for_ghosts() {
        let velocity = Velocity {
            direction: Some(Direction::Right),
            next_direction: Some(Direction::Left),
            speed: 2,
        };
        let outcome = advance(&map(), IVec2::new(12, 10), &velocity, TurnPolicy::Ghost);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: IVec2::new(12, 10),
                to: IVec2::new(14, 10),
                direction: Some(Direction::Right),
            }
        );
    }

    #[test]
    fn test_player_may_reverse_between_cells() {
        let velocity = Velocity {
            direction: Some(Direction::Right),
            next_direction: Some(Direction::Left),
            speed: 2,
        };
        let outcome = advance(&map(), IVec2::new(12, 10), &velocity, TurnPolicy::Player);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: IVec2::new(12, 10),
                to: IVec2::new(10, 10),
                direction: Some(Direction::Left),
            }
        );
    }

    #[test]
    fn test_turn_into_wall_is_ignored() {
        // At (1, 1), down is open but up is a wall
        let velocity = Velocity {
            direction: Some(Direction::Right),
            next_direction: Some(Direction::Up),
            speed: 2,
        };
        let outcome = advance(&map(), IVec2::new(10, 10), &velocity, TurnPolicy::Player);
        assert!(matches!(outcome, MoveOutcome::Moved { direction: Some(Direction::Right), .. }));
    }

    #[test]
    fn test_fast_agents_land_on_boundaries() {
        let mut position = IVec2::new(10, 10);
        let velocity = moving(Direction::Right, 4);
        for expected in [14, 18, 20, 24] {
            match advance(&map(), position, &velocity, TurnPolicy::Ghost) {
                MoveOutcome::Moved { to, .. } => position = to,
                MoveOutcome::Blocked => panic!("unexpected wall"),
            }
            assert_eq!(position.x, expected);
        }
    }

    #[test]
    fn test_tunnel_wraps_both_ways() {
        let map = map();
        let outcome = advance(&map, IVec2::new(188, TUNNEL_ROW_Y), &moving(Direction::Right, 2), TurnPolicy::Player);
        assert!(matches!(outcome, MoveOutcome::Moved { to, .. } if to == IVec2::new(TUNNEL_LEFT_X, TUNNEL_ROW_Y)));

        let outcome = advance(&map, IVec2::new(-8, TUNNEL_ROW_Y), &moving(Direction::Left, 2), TurnPolicy::Player);
        assert!(matches!(outcome, MoveOutcome::Moved { to, .. } if to == IVec2::new(TUNNEL_RIGHT_X, TUNNEL_ROW_Y)));
    }

    #[test]
    fn test_wrap_only_on_tunnel_row() {
        assert_eq!(wrap_tunnel(IVec2::new(190, 90), Some(Direction::Right)), IVec2::new(190, 90));
        assert_eq!(wrap_tunnel(IVec2::new(190, 100), Some(Direction::Left)), IVec2::new(190, 100));
    }

    #[test]
    fn test_stationary_agent_stays_put() {
        let outcome = advance(&map(), IVec2::new(90, 160), &Velocity::stopped(2), TurnPolicy::Player);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: IVec2::new(90, 160),
                to: IVec2::new(90, 160),
                direction: None,
            }
        );
    }
}

//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::{IVec2, UVec2};

/// Logical simulation ticks per second.
pub const TICKS_PER_SECOND: u32 = 30;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / TICKS_PER_SECOND as f64) as u64);

/// Sub-cell units per grid cell. Every position in the simulation is expressed in sub-cell units.
pub const CELL_UNITS: i32 = 10;

/// The size of the game board, in cells.
pub const BOARD_CELL_SIZE: UVec2 = UVec2::new(19, 22);

/// The row (in sub-cell units) whose open ends wrap around horizontally.
pub const TUNNEL_ROW_Y: i32 = 10 * CELL_UNITS;
/// The x coordinate an agent reappears at after leaving through the right side.
pub const TUNNEL_LEFT_X: i32 = -CELL_UNITS;
/// The x coordinate an agent reappears at after leaving through the left side.
pub const TUNNEL_RIGHT_X: i32 = BOARD_CELL_SIZE.x as i32 * CELL_UNITS;

pub const PLAYER_SPAWN: IVec2 = IVec2::new(90, 160);
pub const GHOST_SPAWN: IVec2 = IVec2::new(90, 80);

/// Sub-cell units per tick.
pub mod speed {
    pub const PLAYER: i32 = 2;
    pub const GHOST: i32 = 2;
    pub const GHOST_VULNERABLE: i32 = 1;
    pub const GHOST_CAPTURED: i32 = 4;
}

/// Durations, in ticks.
pub mod durations {
    use super::TICKS_PER_SECOND;

    /// How long a ghost stays vulnerable after a power pellet.
    pub const VULNERABLE: u64 = 8 * TICKS_PER_SECOND as u64;
    /// Elapsed vulnerable time after which the ghost is reported as about to recover.
    pub const VULNERABLE_EXPIRING: u64 = 5 * TICKS_PER_SECOND as u64;
    /// How long a captured ghost takes to return to the den.
    pub const CAPTURED: u64 = 3 * TICKS_PER_SECOND as u64;
    /// Freeze after a ghost is eaten.
    pub const EATEN_PAUSE: u64 = TICKS_PER_SECOND as u64 / 3;
    /// Length of the death sequence.
    pub const DYING: u64 = 2 * TICKS_PER_SECOND as u64;
    /// Countdown before a new game begins.
    pub const COUNTDOWN: u64 = 3 * TICKS_PER_SECOND as u64;
}

pub mod scoring {
    pub const PELLET: u32 = 10;
    pub const POWER_PELLET: u32 = 50;
    /// Multiplied by the number of ghosts eaten since the last power pellet.
    pub const GHOST_BASE: u32 = 50;
    /// A life is awarded every time the score passes a multiple of this value.
    pub const EXTRA_LIFE_EVERY: u32 = 10_000;
}

pub const STARTING_LIVES: u32 = 3;

/// Total edible cells (pellets and power pellets) on the board. Eating this many finishes the level.
pub const PELLETS_PER_LEVEL: u32 = 182;

/// Agents closer than this (Euclidean, sub-cell units) are colliding.
pub const COLLISION_DISTANCE: f32 = 10.0;

/// How far off a cell centre, along the movement axis, the player may be and still eat.
pub const EAT_TOLERANCE: i32 = CELL_UNITS;

/// Minimum swipe length, in pixels, to count as a direction.
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// An enum representing the different types of tiles on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MapTile {
    /// A wall tile.
    Wall,
    /// Open floor with nothing on it.
    Empty,
    /// A regular pellet.
    Pellet,
    /// A power pellet.
    PowerPellet,
    /// The ghost house interior. Neither wall nor floor.
    Reserved,
}

impl MapTile {
    pub fn is_edible(self) -> bool {
        matches!(self, MapTile::Pellet | MapTile::PowerPellet)
    }

    pub fn is_floor(self) -> bool {
        matches!(self, MapTile::Empty | MapTile::Pellet | MapTile::PowerPellet)
    }
}

/// The raw layout of the game board, as a 2D array of characters.
pub const RAW_BOARD: [&str; BOARD_CELL_SIZE.y as usize] = [
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "   #.#.......#.#   ",
    "####.#.##-##.#.####",
    "    ...#---#...    ",
    "####.#.#####.#.####",
    "   #.#.......#.#   ",
    "####.#.#####.#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#..... .....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_time() {
        let expected_nanos = (1_000_000_000.0 / 30.0) as u64;
        assert_eq!(LOOP_TIME.as_nanos() as u64, expected_nanos);
    }

    #[test]
    fn test_raw_board_dimensions() {
        assert_eq!(RAW_BOARD.len(), BOARD_CELL_SIZE.y as usize);
        for row in RAW_BOARD {
            assert_eq!(row.len(), BOARD_CELL_SIZE.x as usize);
        }
    }

    #[test]
    fn test_edible_cell_count_matches_level_target() {
        let edible = RAW_BOARD
            .iter()
            .flat_map(|row| row.chars())
            .filter(|c| *c == '.' || *c == 'o')
            .count();
        assert_eq!(edible as u32, PELLETS_PER_LEVEL);
    }

    #[test]
    fn test_spawns_are_grid_aligned() {
        for spawn in [PLAYER_SPAWN, GHOST_SPAWN] {
            assert_eq!(spawn % CELL_UNITS, IVec2::ZERO);
        }
    }

    #[test]
    fn test_durations() {
        assert_eq!(durations::VULNERABLE, 240);
        assert_eq!(durations::CAPTURED, 90);
        assert_eq!(durations::EATEN_PAUSE, 10);
        assert_eq!(durations::DYING, 60);
    }
}

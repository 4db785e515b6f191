//! This module defines the game map and provides functions for interacting with it.

use glam::IVec2;

use crate::constants::CELL_UNITS;

pub mod builder;
pub mod direction;
pub mod parser;

/// Converts a sub-cell coordinate to the nearest cell coordinate.
///
/// Halves round towards positive infinity, so `5` is cell 1 and `-5` is cell 0.
pub const fn to_cell(subcell: i32) -> i32 {
    (subcell + CELL_UNITS / 2).div_euclid(CELL_UNITS)
}

/// Converts a sub-cell position to the nearest cell.
pub const fn cell_of(position: IVec2) -> IVec2 {
    IVec2::new(to_cell(position.x), to_cell(position.y))
}

/// Converts a cell to the sub-cell position of its top-left corner.
pub const fn to_subcell(cell: IVec2) -> IVec2 {
    IVec2::new(cell.x * CELL_UNITS, cell.y * CELL_UNITS)
}

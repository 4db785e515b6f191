//! The maze grid and its mutable pellet state.

use bevy_ecs::resource::Resource;
use glam::IVec2;
use tracing::debug;

use crate::constants::{MapTile, BOARD_CELL_SIZE, RAW_BOARD};
use crate::error::{GameError, GameResult};
use crate::map::parser::{MapTileParser, TileGrid};

/// The maze: an immutable canonical layout plus the live copy that pellets are eaten from.
///
/// The live copy is only ever restored by bulk overwrite from the canonical layout, so
/// nothing eaten in one level can leak into the next.
#[derive(Resource, Debug, Clone)]
pub struct Map {
    /// The tile data as it is right now.
    current: TileGrid,
    /// The tile data at the start of every level.
    canonical: TileGrid,
}

impl Map {
    /// Creates a new `Map` from a raw board layout.
    pub fn new(raw_board: &[&str]) -> GameResult<Map> {
        let canonical = MapTileParser::parse_board(raw_board)?;
        Ok(Map {
            current: canonical,
            canonical,
        })
    }

    /// Builds the reference maze.
    pub fn reference() -> GameResult<Map> {
        Self::new(&RAW_BOARD)
    }

    /// Restores every pellet from the canonical layout.
    pub fn reset(&mut self) {
        self.current = self.canonical;
        debug!(pellets = self.remaining_pellets(), "Map reset");
    }

    pub const fn width(&self) -> i32 {
        BOARD_CELL_SIZE.x as i32
    }

    pub const fn height(&self) -> i32 {
        BOARD_CELL_SIZE.y as i32
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        (0..self.width()).contains(&cell.x) && (0..self.height()).contains(&cell.y)
    }

    /// Returns the tile at the given cell, or `None` outside the board.
    pub fn tile(&self, cell: IVec2) -> Option<MapTile> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(self.current[cell.y as usize][cell.x as usize])
    }

    /// Returns the tile at the given cell.
    ///
    /// # Errors
    ///
    /// Returns `GameError::OutOfBounds` outside the board.
    pub fn cell_at(&self, cell: IVec2) -> GameResult<MapTile> {
        self.tile(cell).ok_or(GameError::OutOfBounds(cell))
    }

    /// Out-of-bounds cells are not walls.
    pub fn is_wall(&self, cell: IVec2) -> bool {
        self.tile(cell) == Some(MapTile::Wall)
    }

    /// Out-of-bounds cells are not floor.
    pub fn is_floor(&self, cell: IVec2) -> bool {
        self.tile(cell).is_some_and(MapTile::is_floor)
    }

    /// Eats whatever is at the given cell and returns what was there.
    ///
    /// Pellets become empty floor; every other tile is left untouched, so eating twice is harmless.
    pub fn consume(&mut self, cell: IVec2) -> GameResult<MapTile> {
        let previous = self.cell_at(cell)?;
        if previous.is_edible() {
            self.current[cell.y as usize][cell.x as usize] = MapTile::Empty;
        }
        Ok(previous)
    }

    pub fn remaining_pellets(&self) -> usize {
        self.current.iter().flatten().filter(|tile| tile.is_edible()).count()
    }

    /// Iterates every cell in row-major order along with its coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, MapTile)> + '_ {
        self.current.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, tile)| (IVec2::new(x as i32, y as i32), *tile))
        })
    }
}

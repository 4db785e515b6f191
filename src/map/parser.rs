//! Map parsing functionality for converting raw board layouts into structured data.

use crate::constants::{MapTile, BOARD_CELL_SIZE};
use crate::error::ParseError;

/// Row-major tile grid parsed from an ASCII layout.
pub type TileGrid = [[MapTile; BOARD_CELL_SIZE.x as usize]; BOARD_CELL_SIZE.y as usize];

/// Parser for converting raw board layouts into structured map data.
pub struct MapTileParser;

impl MapTileParser {
    /// Converts ASCII characters from the board layout into corresponding tile types.
    ///
    /// Walls are `#`, pellets `.` and `o`, open floor is a space and the ghost house interior is `-`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnknownCharacter` for any other character.
    pub fn parse_character(c: char) -> Result<MapTile, ParseError> {
        match c {
            '#' => Ok(MapTile::Wall),
            '.' => Ok(MapTile::Pellet),
            'o' => Ok(MapTile::PowerPellet),
            ' ' => Ok(MapTile::Empty),
            '-' => Ok(MapTile::Reserved),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a raw board layout into a tile grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the board has the wrong dimensions or contains unknown characters.
    pub fn parse_board(raw_board: &[&str]) -> Result<TileGrid, ParseError> {
        if raw_board.len() != BOARD_CELL_SIZE.y as usize {
            return Err(ParseError::ParseFailed(format!(
                "Invalid board height: expected {}, got {}",
                BOARD_CELL_SIZE.y,
                raw_board.len()
            )));
        }

        let mut tiles = [[MapTile::Empty; BOARD_CELL_SIZE.x as usize]; BOARD_CELL_SIZE.y as usize];
        for (y, line) in raw_board.iter().enumerate() {
            if line.chars().count() != BOARD_CELL_SIZE.x as usize {
                return Err(ParseError::ParseFailed(format!(
                    "Invalid board width at line {}: expected {}, got {}",
                    y,
                    BOARD_CELL_SIZE.x,
                    line.chars().count()
                )));
            }

            for (x, character) in line.chars().enumerate() {
                tiles[y][x] = Self::parse_character(character)?;
            }
        }

        Ok(tiles)
    }
}

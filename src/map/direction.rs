use glam::IVec2;
use strum_macros::{AsRefStr, EnumString};

/// The four cardinal directions.
///
/// A stationary agent has no direction; that is modelled as `Option<Direction>::None` rather than a fifth variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The four cardinal directions.
    /// This is just a convenience constant for iterating over the directions.
    pub const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Returns the opposite direction. Constant time.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Whether both directions travel along the same axis (equal or opposite).
    pub const fn same_axis(self, other: Direction) -> bool {
        self.is_horizontal() == other.is_horizontal()
    }

    /// Whether travel in this direction increases the coordinate on its axis.
    pub const fn is_positive(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }

    /// Returns the unit vector for this direction. Y grows downwards.
    pub const fn as_ivec2(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    /// The two directions at right angles to the given heading.
    ///
    /// A stationary heading counts as vertical, so it yields the horizontal pair.
    pub const fn perpendicular(heading: Option<Direction>) -> [Direction; 2] {
        match heading {
            Some(Direction::Left | Direction::Right) => [Direction::Up, Direction::Down],
            _ => [Direction::Left, Direction::Right],
        }
    }
}

impl From<Direction> for IVec2 {
    fn from(dir: Direction) -> Self {
        dir.as_ivec2()
    }
}

//! The four approaches and their fixed travel directions.

use std::fmt;

/// One of the four directional traffic streams entering the intersection.
///
/// Roads are ordered; the derived [`Ord`] gives the deterministic tie-break
/// used by the lane scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Road {
    A,
    B,
    C,
    D,
}

/// The travel direction of a vehicle, bound one-to-one to its road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Down,
    Right,
    Up,
    Left,
}

impl Road {
    /// All roads, in round-robin order.
    pub const ALL: [Road; 4] = [Road::A, Road::B, Road::C, Road::D];

    /// The fixed travel direction for vehicles on this road.
    pub fn direction(self) -> Direction {
        match self {
            Road::A => Direction::Down,
            Road::B => Direction::Right,
            Road::C => Direction::Up,
            Road::D => Direction::Left,
        }
    }

    /// The next road in the fixed cyclic order A→B→C→D→A.
    pub fn next(self) -> Road {
        match self {
            Road::A => Road::B,
            Road::B => Road::C,
            Road::C => Road::D,
            Road::D => Road::A,
        }
    }

    /// The single-letter code used by the record format.
    pub fn code(self) -> char {
        match self {
            Road::A => 'A',
            Road::B => 'B',
            Road::C => 'C',
            Road::D => 'D',
        }
    }

    /// Parses a road letter.
    pub fn from_code(code: char) -> Option<Road> {
        match code {
            'A' => Some(Road::A),
            'B' => Some(Road::B),
            'C' => Some(Road::C),
            'D' => Some(Road::D),
            _ => None,
        }
    }
}

impl Direction {
    /// The integer code used by the record format.
    pub fn code(self) -> u8 {
        match self {
            Direction::Down => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Left => 3,
        }
    }

    /// Parses a direction code.
    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            0 => Some(Direction::Down),
            1 => Some(Direction::Right),
            2 => Some(Direction::Up),
            3 => Some(Direction::Left),
            _ => None,
        }
    }

    /// True for directions that travel along the y axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Down | Direction::Up)
    }
}

impl fmt::Display for Road {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn road_direction_pairing_is_fixed() {
        assert_eq!(Road::A.direction(), Direction::Down);
        assert_eq!(Road::B.direction(), Direction::Right);
        assert_eq!(Road::C.direction(), Direction::Up);
        assert_eq!(Road::D.direction(), Direction::Left);
    }

    #[test]
    fn round_robin_cycles_all_roads() {
        let mut road = Road::A;
        let mut seen = vec![];
        for _ in 0..4 {
            seen.push(road);
            road = road.next();
        }
        assert_eq!(road, Road::A);
        assert_eq!(seen, Road::ALL);
    }
}

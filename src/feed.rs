//! The vehicle record line format and the external ingestion channel.
//!
//! Records serialize one vehicle state per line as
//! `id:road:lane:direction:x:y:speed`, with speed in units per second
//! (consumers scale by the tick rate). The original deployment tailed these
//! lines from a log file on a polling thread; here the same records travel
//! over an in-process channel drained at the start of each tick.

use std::fmt;
use std::str::FromStr;

use crate::road::{Direction, Road};

/// A serialized snapshot of one vehicle's state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRecord {
    pub id: u32,
    pub road: Road,
    /// May be out of range for the receiver's geometry; clamped on ingest.
    pub lane: usize,
    pub direction: Direction,
    pub x: f64,
    pub y: f64,
    /// Speed in units per second.
    pub speed: f64,
}

/// Why a record line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRecordError {
    /// The line did not have exactly seven `:`-separated fields.
    FieldCount,
    /// A field did not parse as its expected type.
    Field(&'static str),
}

impl fmt::Display for ParseRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseRecordError::FieldCount => {
                write!(f, "expected 7 fields in id:road:lane:direction:x:y:speed")
            }
            ParseRecordError::Field(name) => write!(f, "invalid {} field", name),
        }
    }
}

impl std::error::Error for ParseRecordError {}

impl fmt::Display for VehicleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{:.3}:{:.3}:{:.0}",
            self.id,
            self.road.code(),
            self.lane,
            self.direction.code(),
            self.x,
            self.y,
            self.speed
        )
    }
}

impl FromStr for VehicleRecord {
    type Err = ParseRecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim_end().split(':');
        let mut next = || fields.next().ok_or(ParseRecordError::FieldCount);

        let id = parse(next()?, "id")?;
        let road = {
            let field: &str = next()?;
            let mut chars = field.chars();
            match (chars.next().and_then(Road::from_code), chars.next()) {
                (Some(road), None) => road,
                _ => return Err(ParseRecordError::Field("road")),
            }
        };
        let lane = parse(next()?, "lane")?;
        let direction = Direction::from_code(parse(next()?, "direction")?)
            .ok_or(ParseRecordError::Field("direction"))?;
        let x = parse(next()?, "x")?;
        let y = parse(next()?, "y")?;
        let speed = parse(next()?, "speed")?;
        if fields.next().is_some() {
            return Err(ParseRecordError::FieldCount);
        }

        Ok(Self {
            id,
            road,
            lane,
            direction,
            x,
            y,
            speed,
        })
    }
}

fn parse<T: FromStr>(field: &str, name: &'static str) -> Result<T, ParseRecordError> {
    field.parse().map_err(|_| ParseRecordError::Field(name))
}

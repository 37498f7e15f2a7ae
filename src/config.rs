//! Static configuration for a simulation run.
//!
//! Every threshold the components consult lives here; the components
//! themselves carry no magic numbers.

use crate::road::{Direction, Road};
use crate::util::{Box2d, Interval, Point2d, Vector2d};

/// The intersection's static geometry: world bounds, the central box where
/// the two roads cross, lane layout and vehicle dimensions.
///
/// Immutable after initialization; all coordinate math derives from it.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// World width in units.
    pub world_width: f64,
    /// World height in units.
    pub world_height: f64,
    /// Width of each road's paved area, which is also the side length of the
    /// intersection box.
    pub road_width: f64,
    /// Number of lanes per road.
    pub lanes_per_road: usize,
    /// Vehicle extent orthogonal to its travel direction.
    pub vehicle_width: f64,
    /// Vehicle extent along its travel direction.
    pub vehicle_length: f64,
}

impl Geometry {
    /// Left edge of the vertical road.
    pub fn road_x_start(&self) -> f64 {
        0.5 * (self.world_width - self.road_width)
    }

    /// Top edge of the horizontal road.
    pub fn road_y_start(&self) -> f64 {
        0.5 * (self.world_height - self.road_width)
    }

    /// Width of a single lane.
    pub fn lane_width(&self) -> f64 {
        self.road_width / self.lanes_per_road as f64
    }

    /// The central box where the two roads cross.
    pub fn intersection_box(&self) -> Box2d {
        let x = self.road_x_start();
        let y = self.road_y_start();
        Box2d::new(
            Interval::new(x, x + self.road_width),
            Interval::new(y, y + self.road_width),
        )
    }

    /// Centre-line coordinate of `lane` on `road`, orthogonal to travel:
    /// an x coordinate for vertical roads, a y coordinate for horizontal ones.
    ///
    /// The lane index must already be valid; callers clamp first.
    pub fn lane_centre(&self, road: Road, lane: usize) -> f64 {
        let offset = (lane as f64 + 0.5) * self.lane_width();
        if road.direction().is_vertical() {
            self.road_x_start() + offset
        } else {
            self.road_y_start() + offset
        }
    }

    /// Clamps a lane index to the valid range, mapping out-of-range values
    /// to lane 0. Recoverable data error, never fatal.
    pub fn clamp_lane(&self, lane: usize) -> usize {
        if lane < self.lanes_per_road {
            lane
        } else {
            0
        }
    }

    /// Half-extents of a vehicle's bounding box travelling in `direction`.
    pub fn half_extents(&self, direction: Direction) -> Vector2d {
        if direction.is_vertical() {
            Vector2d::new(0.5 * self.vehicle_width, 0.5 * self.vehicle_length)
        } else {
            Vector2d::new(0.5 * self.vehicle_length, 0.5 * self.vehicle_width)
        }
    }

    /// Bounding box of a vehicle centred at `pos` travelling in `direction`.
    pub fn vehicle_bounds(&self, pos: Point2d, direction: Direction) -> Box2d {
        Box2d::disc(pos, self.half_extents(direction))
    }

    /// Centre coordinates of a vehicle entering `road` on `lane`, placed
    /// just outside the world bound on the road's approach edge.
    pub fn spawn_point(&self, road: Road, lane: usize) -> Point2d {
        let centre = self.lane_centre(road, lane);
        let half_len = 0.5 * self.vehicle_length;
        match road.direction() {
            Direction::Down => Point2d::new(centre, -half_len),
            Direction::Right => Point2d::new(-half_len, centre),
            Direction::Up => Point2d::new(centre, self.world_height + half_len),
            Direction::Left => Point2d::new(self.world_width + half_len, centre),
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            world_width: 2000.0,
            world_height: 1700.0,
            road_width: 400.0,
            lanes_per_road: 3,
            vehicle_width: 50.0,
            vehicle_length: 100.0,
        }
    }
}

/// Configuration for a simulation run, loaded once at startup.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Static intersection geometry.
    pub geometry: Geometry,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Nominal vehicle speed in units per second.
    pub vehicle_speed: f64,
    /// Total vehicle slots in the registry.
    pub capacity: usize,
    /// Maximum simultaneously live vehicles admitted by the spawn policy.
    pub max_active: usize,
    /// Minimum interval between admitted spawns, in ms.
    pub spawn_interval_ms: u64,
    /// Minimum along-travel separation between same-lane vehicles, in units.
    pub min_spacing: f64,
    /// Green time granted per waiting vehicle, in ms.
    pub clearance_ms: u64,
    /// Minimum green phase duration in ms, so an empty road cannot starve
    /// the rotation.
    pub min_phase_ms: u64,
    /// Waiting-vehicle count at which a lane preempts the round-robin.
    pub priority_threshold: i32,
    /// Probability that a spawned vehicle intends to turn left.
    pub left_turn_prob: f64,
}

impl SimConfig {
    /// Distance a vehicle moving at the nominal speed covers in one tick.
    pub fn speed_per_tick(&self) -> f64 {
        self.vehicle_speed / self.tick_rate as f64
    }

    /// Converts a frame index to simulation milliseconds.
    pub fn frame_to_ms(&self, frame: u64) -> u64 {
        frame * 1000 / self.tick_rate as u64
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            tick_rate: 60,
            vehicle_speed: 50.0,
            capacity: 200,
            max_active: 8,
            spawn_interval_ms: 2000,
            min_spacing: 100.0,
            clearance_ms: 2000,
            min_phase_ms: 5000,
            priority_threshold: 10,
            left_turn_prob: 0.3,
        }
    }
}

//! A simulated vehicle.

use crate::config::Geometry;
use crate::road::{Direction, Road};
use crate::util::{Box2d, Point2d};

/// One simulated car.
///
/// The (road, direction) pairing is fixed for the vehicle's lifetime; only
/// the lane may change, via redirection at the intersection. The bounding box
/// is derived state, recomputed from the centre position every tick.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// Registry-assigned id, unique for the simulation run.
    id: u32,
    /// The approach the vehicle travels on.
    road: Road,
    /// Lane index on `road`.
    lane: usize,
    /// World coordinates of the vehicle's centre.
    pos: Point2d,
    /// Effective speed this tick, in units per tick. Zero while waiting.
    speed: f64,
    /// Left-turn intent, decided once at spawn.
    turning_left: bool,
    /// Emergency/priority vehicle flag.
    is_priority: bool,
    /// Simulation time the vehicle was created, in ms.
    arrival_ms: u64,
    /// Set once the vehicle has entered the intersection box.
    in_intersection: bool,
    /// Axis-aligned bounds, kept in sync with `pos`.
    bounds: Box2d,
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(
        id: u32,
        road: Road,
        lane: usize,
        pos: Point2d,
        speed: f64,
        turning_left: bool,
        arrival_ms: u64,
        geometry: &Geometry,
    ) -> Self {
        Self {
            id,
            road,
            lane,
            pos,
            speed,
            turning_left,
            is_priority: false,
            arrival_ms,
            in_intersection: false,
            bounds: geometry.vehicle_bounds(pos, road.direction()),
        }
    }

    /// Gets the vehicle's id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The road the vehicle travels on.
    pub fn road(&self) -> Road {
        self.road
    }

    /// The vehicle's travel direction, fixed by its road.
    pub fn direction(&self) -> Direction {
        self.road.direction()
    }

    /// The vehicle's current lane index.
    pub fn lane(&self) -> usize {
        self.lane
    }

    pub(crate) fn set_lane(&mut self, lane: usize) {
        self.lane = lane;
    }

    /// World coordinates of the vehicle's centre.
    pub fn pos(&self) -> Point2d {
        self.pos
    }

    /// The vehicle's effective speed this tick, in units per tick.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// True while the vehicle is stationary, which is what the demand
    /// accounting counts as "waiting".
    pub fn is_waiting(&self) -> bool {
        self.speed == 0.0
    }

    /// Whether the vehicle intends to turn left at the intersection.
    pub fn turning_left(&self) -> bool {
        self.turning_left
    }

    /// Whether the vehicle carries the priority flag.
    pub fn is_priority(&self) -> bool {
        self.is_priority
    }

    pub(crate) fn set_priority(&mut self, priority: bool) {
        self.is_priority = priority;
    }

    /// Simulation time the vehicle was created, in ms.
    pub fn arrival_ms(&self) -> u64 {
        self.arrival_ms
    }

    /// True once the vehicle has entered the intersection box. Stays set
    /// so a light turning red mid-crossing cannot strand it.
    pub fn in_intersection(&self) -> bool {
        self.in_intersection
    }

    pub(crate) fn mark_in_intersection(&mut self) {
        self.in_intersection = true;
    }

    /// The vehicle's axis-aligned bounding box.
    pub fn bounds(&self) -> Box2d {
        self.bounds
    }

    /// Moves the vehicle `dist` units along its travel direction.
    pub(crate) fn advance(&mut self, dist: f64) {
        match self.direction() {
            Direction::Down => self.pos.y += dist,
            Direction::Right => self.pos.x += dist,
            Direction::Up => self.pos.y -= dist,
            Direction::Left => self.pos.x -= dist,
        }
    }

    /// Snaps the coordinate orthogonal to travel onto the lane centre line.
    pub(crate) fn set_lateral(&mut self, centre: f64) {
        if self.direction().is_vertical() {
            self.pos.x = centre;
        } else {
            self.pos.y = centre;
        }
    }

    /// Overwrites position and speed from an externally ingested record.
    pub(crate) fn reconcile(&mut self, pos: Point2d, speed: f64, lane: usize) {
        self.pos = pos;
        self.speed = speed;
        self.lane = lane;
    }

    /// Recomputes the bounding box from the centre position.
    pub(crate) fn update_bounds(&mut self, geometry: &Geometry) {
        self.bounds = geometry.vehicle_bounds(self.pos, self.direction());
    }

    /// The vehicle's progress along its travel direction: larger values are
    /// further down the road, whichever way it points.
    pub(crate) fn progress(&self) -> f64 {
        match self.direction() {
            Direction::Down => self.pos.y,
            Direction::Right => self.pos.x,
            Direction::Up => -self.pos.y,
            Direction::Left => -self.pos.x,
        }
    }
}

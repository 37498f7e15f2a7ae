//! Per-tick vehicle motion.
//!
//! Each pass decides every vehicle's effective speed from the signal state
//! and same-lane spacing, advances positions along the travel axis, snaps
//! the orthogonal coordinate onto the lane centre line, and reclaims
//! vehicles that have left the world.

use log::warn;
use smallvec::SmallVec;

use crate::config::SimConfig;
use crate::light::TrafficLightController;
use crate::registry::VehicleRegistry;
use crate::road::Direction;
use crate::util::Box2d;
use crate::vehicle::Vehicle;

/// Advances every live vehicle by one tick.
pub(crate) fn step(
    registry: &mut VehicleRegistry,
    lights: &TrafficLightController,
    config: &SimConfig,
) {
    let geometry = &config.geometry;
    let ibox = geometry.intersection_box();
    let base_speed = config.speed_per_tick();

    // Speed decisions need an immutable view of the whole set (headway looks
    // at other vehicles), so they are computed first and applied after.
    let mut speeds: SmallVec<[(u32, f64); 32]> = SmallVec::new();
    for vehicle in registry.iter_live() {
        let inside = vehicle.bounds().overlaps(&ibox);
        let speed = if inside {
            // A vehicle inside the box is never stopped; stopping
            // mid-intersection would deadlock the crossing.
            base_speed
        } else if !lights.is_green(vehicle.road()) && before_intersection(vehicle, &ibox) {
            0.0
        } else if blocked_by_leader(registry, vehicle, config.min_spacing) {
            0.0
        } else {
            base_speed
        };
        speeds.push((vehicle.id(), speed));
    }

    let mut exited: SmallVec<[u32; 8]> = SmallVec::new();
    for (id, speed) in speeds {
        let Some(vehicle) = registry.get_mut(id) else {
            continue;
        };
        vehicle.set_speed(speed);
        vehicle.advance(speed);

        let lane = vehicle.lane();
        if lane >= geometry.lanes_per_road {
            warn!("vehicle {} has invalid lane {}, clamping to 0", id, lane);
            vehicle.set_lane(geometry.clamp_lane(lane));
        }
        vehicle.set_lateral(geometry.lane_centre(vehicle.road(), vehicle.lane()));
        vehicle.update_bounds(geometry);

        if vehicle.bounds().overlaps(&ibox) {
            vehicle.mark_in_intersection();
        }
        if past_world_bound(vehicle, config) {
            exited.push(id);
        }
    }
    for id in exited {
        registry.reclaim(id);
    }
}

/// Whether the vehicle is still approaching the intersection: fully on the
/// near side of the box, in its direction of travel.
fn before_intersection(vehicle: &Vehicle, ibox: &Box2d) -> bool {
    let bounds = vehicle.bounds();
    match vehicle.direction() {
        Direction::Down => bounds.y.max <= ibox.y.min,
        Direction::Right => bounds.x.max <= ibox.x.min,
        Direction::Up => bounds.y.min >= ibox.y.max,
        Direction::Left => bounds.x.min >= ibox.x.max,
    }
}

/// Whether a same-road, same-lane vehicle ahead is within the minimum
/// spacing of this vehicle's leading edge.
fn blocked_by_leader(registry: &VehicleRegistry, vehicle: &Vehicle, min_spacing: f64) -> bool {
    registry
        .iter_live()
        .filter(|other| other.id() != vehicle.id())
        .filter(|other| other.road() == vehicle.road() && other.lane() == vehicle.lane())
        .filter(|other| other.progress() > vehicle.progress())
        .any(|leader| gap_to(vehicle, leader) < min_spacing)
}

/// Distance from the vehicle's leading edge to the leader's trailing edge.
/// Negative when the two overlap.
fn gap_to(vehicle: &Vehicle, leader: &Vehicle) -> f64 {
    let (bounds, ahead) = (vehicle.bounds(), leader.bounds());
    match vehicle.direction() {
        Direction::Down => ahead.y.min - bounds.y.max,
        Direction::Right => ahead.x.min - bounds.x.max,
        Direction::Up => bounds.y.min - ahead.y.max,
        Direction::Left => bounds.x.min - ahead.x.max,
    }
}

/// Whether the vehicle has moved entirely past the world bound opposite its
/// spawn edge.
fn past_world_bound(vehicle: &Vehicle, config: &SimConfig) -> bool {
    let bounds = vehicle.bounds();
    match vehicle.direction() {
        Direction::Down => bounds.y.min > config.geometry.world_height,
        Direction::Right => bounds.x.min > config.geometry.world_width,
        Direction::Up => bounds.y.max < 0.0,
        Direction::Left => bounds.x.max < 0.0,
    }
}

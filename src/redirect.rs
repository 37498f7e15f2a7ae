//! At-intersection lane reassignment.

use log::debug;

use crate::config::SimConfig;
use crate::light::TrafficLightController;
use crate::registry::VehicleRegistry;
use crate::util::Box2d;
use crate::vehicle::Vehicle;

/// Applies redirection to every live vehicle.
pub(crate) fn step(
    registry: &mut VehicleRegistry,
    lights: &TrafficLightController,
    config: &SimConfig,
) {
    let ibox = config.geometry.intersection_box();
    for vehicle in registry.iter_live_mut() {
        maybe_redirect(vehicle, lights, &ibox);
    }
}

/// Reassigns the vehicle's lane to match its turn intent, decided once at
/// spawn. Only vehicles geometrically inside the intersection box are
/// eligible, and only if their road holds green or they entered the box
/// before the light changed — lane changes on red are otherwise forbidden.
/// Road and direction are never altered.
fn maybe_redirect(vehicle: &mut Vehicle, lights: &TrafficLightController, ibox: &Box2d) {
    if !vehicle.bounds().overlaps(ibox) {
        return;
    }
    if !lights.is_green(vehicle.road()) && !vehicle.in_intersection() {
        return;
    }
    if vehicle.turning_left() && vehicle.lane() != 0 {
        debug!(
            "vehicle {} turning left, moving to lane 0 from lane {}",
            vehicle.id(),
            vehicle.lane()
        );
        vehicle.set_lane(0);
    }
}

//! Fixed-capacity storage for the live vehicle set.

use log::{debug, warn};

use crate::config::SimConfig;
use crate::feed::VehicleRecord;
use crate::road::Road;
use crate::util::Point2d;
use crate::vehicle::Vehicle;

/// A fixed-capacity slot table owning every live vehicle.
///
/// Slots are allocated first-fit in slot order, and enumeration yields live
/// vehicles in slot order — stable across ticks, which keeps runs
/// reproducible. Exhausting the capacity is backpressure, not an error:
/// [`spawn_with`](Self::spawn_with) simply returns `None`.
pub struct VehicleRegistry {
    slots: Box<[Option<Vehicle>]>,
    next_id: u32,
}

impl VehicleRegistry {
    /// Creates a registry with the given number of slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            next_id: 0,
        }
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live vehicles.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Allocates the first free slot and fills it with the vehicle built by
    /// `build`, which receives the assigned id. Returns `None` when every
    /// slot is taken.
    pub fn spawn_with(
        &mut self,
        build: impl FnOnce(u32) -> Vehicle,
    ) -> Option<u32> {
        let slot = self.slots.iter().position(|s| s.is_none())?;
        let id = self.next_id;
        self.next_id += 1;
        self.slots[slot] = Some(build(id));
        Some(id)
    }

    /// Frees the slot holding the vehicle with the given id.
    pub fn reclaim(&mut self, id: u32) {
        for slot in self.slots.iter_mut() {
            if slot.as_ref().map(|v| v.id()) == Some(id) {
                debug!("vehicle {} left the simulation", id);
                *slot = None;
                return;
            }
        }
    }

    /// Gets the live vehicle with the given id.
    pub fn get(&self, id: u32) -> Option<&Vehicle> {
        self.iter_live().find(|v| v.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut Vehicle> {
        self.iter_live_mut().find(|v| v.id() == id)
    }

    /// Iterates over live vehicles in slot order.
    pub fn iter_live(&self) -> impl Iterator<Item = &Vehicle> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub(crate) fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Counts live vehicles on `road` (optionally one lane of it) that are
    /// stationary. This is the demand feed for phase durations and lane
    /// priorities.
    pub fn count_waiting(&self, road: Road, lane: Option<usize>) -> usize {
        self.iter_live()
            .filter(|v| v.road() == road)
            .filter(|v| lane.map_or(true, |lane| v.lane() == lane))
            .filter(|v| v.is_waiting())
            .count()
    }

    /// Merges an externally produced record under the reconcile-by-id rule:
    /// update the live vehicle with a matching id, otherwise adopt the
    /// record into a free slot. A full table drops the record.
    pub fn apply_record(&mut self, record: &VehicleRecord, now_ms: u64, config: &SimConfig) {
        let geometry = &config.geometry;
        let lane = geometry.clamp_lane(record.lane);
        if lane != record.lane {
            warn!(
                "record for vehicle {} has invalid lane {}, clamping to 0",
                record.id, record.lane
            );
        }
        let pos = Point2d::new(record.x, record.y);
        let speed = record.speed / config.tick_rate as f64;

        if let Some(vehicle) = self.get_mut(record.id) {
            vehicle.reconcile(pos, speed, lane);
            vehicle.update_bounds(geometry);
            return;
        }

        let Some(slot) = self.slots.iter().position(|s| s.is_none()) else {
            return;
        };
        self.slots[slot] = Some(Vehicle::new(
            record.id,
            record.road,
            lane,
            pos,
            speed,
            false,
            now_ms,
            geometry,
        ));
        // Keep future spawn ids disjoint from adopted ones.
        self.next_id = self.next_id.max(record.id + 1);
        debug!("adopted external vehicle {} on {}", record.id, record.road);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SimConfig;
    use crate::road::Direction;

    fn registry_with(config: &SimConfig, count: usize) -> VehicleRegistry {
        let mut registry = VehicleRegistry::new(config.capacity);
        for _ in 0..count {
            registry
                .spawn_with(|id| {
                    Vehicle::new(
                        id,
                        Road::A,
                        0,
                        config.geometry.spawn_point(Road::A, 0),
                        0.0,
                        false,
                        0,
                        &config.geometry,
                    )
                })
                .unwrap();
        }
        registry
    }

    #[test]
    fn slots_are_reused_first_fit() {
        let config = SimConfig::default();
        let mut registry = registry_with(&config, 3);
        registry.reclaim(1);
        assert_eq!(registry.live_count(), 2);

        // The freed middle slot is taken before any later slot.
        registry
            .spawn_with(|id| {
                Vehicle::new(
                    id,
                    Road::B,
                    0,
                    config.geometry.spawn_point(Road::B, 0),
                    0.0,
                    false,
                    0,
                    &config.geometry,
                )
            })
            .unwrap();
        let roads: Vec<_> = registry.iter_live().map(|v| v.road()).collect();
        assert_eq!(roads, vec![Road::A, Road::B, Road::A]);
    }

    #[test]
    fn spawn_fails_when_every_slot_is_taken() {
        let mut config = SimConfig::default();
        config.capacity = 2;
        let mut registry = registry_with(&config, 2);
        assert!(registry.spawn_with(|_| unreachable!()).is_none());
    }

    #[test]
    fn waiting_counts_see_only_stationary_vehicles() {
        let config = SimConfig::default();
        let mut registry = registry_with(&config, 3);
        registry.get_mut(0).unwrap().set_speed(1.0);
        assert_eq!(registry.count_waiting(Road::A, None), 2);
        assert_eq!(registry.count_waiting(Road::A, Some(0)), 2);
        assert_eq!(registry.count_waiting(Road::A, Some(1)), 0);
        assert_eq!(registry.count_waiting(Road::B, None), 0);
    }

    #[test]
    fn records_reconcile_by_id_or_adopt() {
        let config = SimConfig::default();
        let mut registry = registry_with(&config, 1);

        // Known id: state is overwritten in place.
        registry.apply_record(
            &VehicleRecord {
                id: 0,
                road: Road::A,
                lane: 1,
                direction: Direction::Down,
                x: 900.0,
                y: 300.0,
                speed: 60.0,
            },
            0,
            &config,
        );
        assert_eq!(registry.live_count(), 1);
        let vehicle = registry.get(0).unwrap();
        assert_eq!(vehicle.lane(), 1);
        assert_eq!(vehicle.speed(), 1.0);

        // Unknown id: adopted into a free slot, invalid lane clamped.
        registry.apply_record(
            &VehicleRecord {
                id: 40,
                road: Road::D,
                lane: 9,
                direction: Direction::Left,
                x: 2050.0,
                y: 700.0,
                speed: 50.0,
            },
            16,
            &config,
        );
        assert_eq!(registry.live_count(), 2);
        let adopted = registry.get(40).unwrap();
        assert_eq!(adopted.lane(), 0);
        assert_eq!(adopted.arrival_ms(), 16);

        // Adoption moves the id allocator past the external id.
        let next = registry.spawn_with(|id| {
            Vehicle::new(
                id,
                Road::A,
                0,
                config.geometry.spawn_point(Road::A, 0),
                0.0,
                false,
                0,
                &config.geometry,
            )
        });
        assert_eq!(next, Some(41));
    }
}

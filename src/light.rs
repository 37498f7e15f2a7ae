//! Signal phase scheduling for the four approaches.

use log::debug;

use crate::config::SimConfig;
use crate::registry::VehicleRegistry;
use crate::road::Road;
use crate::scheduler::LanePriorityScheduler;

/// Rotates right-of-way between the four approaches.
///
/// Exactly one road holds green at any time; the other three are implicitly
/// red. When a phase expires the controller refreshes every lane's priority
/// from live demand, then either jumps to a lane whose waiting count reached
/// the priority threshold or advances round-robin. The new phase lasts long
/// enough to clear the waiting queue, floored at a minimum so an empty road
/// cannot lock the rotation.
pub struct TrafficLightController {
    /// The road currently holding green.
    green: Road,
    /// Simulation time the current phase began, in ms.
    phase_started_ms: u64,
    /// Duration of the current phase, in ms.
    phase_ms: u64,
}

impl TrafficLightController {
    /// Creates a controller with road A initially green for the minimum
    /// phase duration.
    pub fn new(now_ms: u64, config: &SimConfig) -> Self {
        Self {
            green: Road::A,
            phase_started_ms: now_ms,
            phase_ms: config.min_phase_ms,
        }
    }

    /// The road currently holding green.
    pub fn green(&self) -> Road {
        self.green
    }

    /// Whether the given road holds green.
    pub fn is_green(&self, road: Road) -> bool {
        self.green == road
    }

    /// Duration of the current phase, in ms.
    pub fn phase_ms(&self) -> u64 {
        self.phase_ms
    }

    /// Simulation time the current phase began, in ms.
    pub fn phase_started_ms(&self) -> u64 {
        self.phase_started_ms
    }

    /// Forces a new green phase for `road`, restarting the phase timer at
    /// the minimum duration.
    pub fn set_green(&mut self, road: Road, now_ms: u64, config: &SimConfig) {
        self.green = road;
        self.phase_started_ms = now_ms;
        self.phase_ms = config.min_phase_ms;
    }

    /// Evaluates the phase transition rule. Called once per tick; a no-op
    /// until the current phase has run its full duration.
    pub fn step(
        &mut self,
        now_ms: u64,
        registry: &VehicleRegistry,
        scheduler: &mut LanePriorityScheduler,
        config: &SimConfig,
    ) {
        if now_ms.saturating_sub(self.phase_started_ms) < self.phase_ms {
            return;
        }

        // Refresh each lane's priority from live demand.
        for road in Road::ALL {
            for lane in 0..config.geometry.lanes_per_road {
                let waiting = registry.count_waiting(road, Some(lane));
                scheduler.update_priority(road, lane, waiting as i32);
            }
        }

        // A lane at or above the threshold preempts the rotation; otherwise
        // advance round-robin. The popped record goes straight back in so
        // the key set stays static.
        let next = match scheduler.pop_max() {
            Some(top) => {
                let preempt = (top.priority >= config.priority_threshold).then_some(top.road);
                scheduler.insert(top);
                preempt.unwrap_or_else(|| self.green.next())
            }
            None => self.green.next(),
        };

        let waiting = registry.count_waiting(next, None) as u64;
        self.phase_ms = (waiting * config.clearance_ms).max(config.min_phase_ms);
        self.phase_started_ms = now_ms;
        if next != self.green {
            debug!(
                "green {} -> {} for {}ms ({} waiting)",
                self.green, next, self.phase_ms, waiting
            );
        }
        self.green = next;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn empty_roads_get_minimum_duration_phases_round_robin() {
        let config = SimConfig::default();
        let registry = VehicleRegistry::new(config.capacity);
        let mut scheduler = LanePriorityScheduler::with_keys(config.geometry.lanes_per_road);
        let mut lights = TrafficLightController::new(0, &config);
        assert_eq!(lights.green(), Road::A);

        // Before expiry, nothing changes.
        lights.step(config.min_phase_ms - 1, &registry, &mut scheduler, &config);
        assert_eq!(lights.green(), Road::A);

        // At expiry, rotation advances with the minimum duration.
        lights.step(config.min_phase_ms, &registry, &mut scheduler, &config);
        assert_eq!(lights.green(), Road::B);
        assert_eq!(lights.phase_ms(), config.min_phase_ms);
        assert_eq!(scheduler.len(), 12);
    }
}

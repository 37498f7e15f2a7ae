//! Admission control for new vehicles.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution};

use crate::config::SimConfig;
use crate::registry::VehicleRegistry;
use crate::road::Road;
use crate::vehicle::Vehicle;

/// Gate that decides whether a new vehicle may enter the simulation.
///
/// Admission fails, in order, on: the global spawn rate limit, the active
/// vehicle cap, a candidate spawn point too close to a same-lane occupant,
/// and registry capacity. Every rejection is silent; the tick never fails.
pub struct SpawnPolicy {
    rng: StdRng,
    turn: Bernoulli,
    last_spawn_ms: Option<u64>,
}

impl SpawnPolicy {
    /// Creates a policy with an entropy-seeded RNG.
    pub fn new(config: &SimConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a policy with a fixed seed, for reproducible runs.
    pub fn with_seed(config: &SimConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SimConfig, rng: StdRng) -> Self {
        Self {
            rng,
            turn: Bernoulli::new(config.left_turn_prob.clamp(0.0, 1.0))
                .unwrap_or_else(|_| Bernoulli::new(0.0).unwrap()),
            last_spawn_ms: None,
        }
    }

    /// Attempts to admit one new vehicle, returning its id.
    ///
    /// Road, lane and turn intent are drawn uniformly; the rate limit is
    /// global, one admission per interval, not per lane.
    pub fn try_spawn(
        &mut self,
        now_ms: u64,
        registry: &mut VehicleRegistry,
        config: &SimConfig,
    ) -> Option<u32> {
        if let Some(last) = self.last_spawn_ms {
            if now_ms.saturating_sub(last) < config.spawn_interval_ms {
                return None;
            }
        }
        if registry.live_count() >= config.max_active {
            return None;
        }

        let road = Road::ALL[self.rng.gen_range(0..Road::ALL.len())];
        let lane = self.rng.gen_range(0..config.geometry.lanes_per_road);
        let turning_left = self.turn.sample(&mut self.rng);
        let pos = config.geometry.spawn_point(road, lane);

        // Never spawn on top of a same-lane vehicle still near the entry.
        let blocked = registry
            .iter_live()
            .filter(|v| v.road() == road && v.lane() == lane)
            .any(|v| {
                let d = if road.direction().is_vertical() {
                    (v.pos().y - pos.y).abs()
                } else {
                    (v.pos().x - pos.x).abs()
                };
                d < config.min_spacing
            });
        if blocked {
            return None;
        }

        let speed = config.speed_per_tick();
        let id = registry.spawn_with(|id| {
            Vehicle::new(id, road, lane, pos, speed, turning_left, now_ms, &config.geometry)
        })?;
        self.last_spawn_ms = Some(now_ms);
        debug!(
            "spawned vehicle {} on {} lane {} (turning left: {})",
            id, road, lane, turning_left
        );
        Some(id)
    }
}

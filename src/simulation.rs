//! The simulation facade and tick loop state.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::config::SimConfig;
use crate::feed::VehicleRecord;
use crate::light::TrafficLightController;
use crate::registry::VehicleRegistry;
use crate::road::Road;
use crate::scheduler::LanePriorityScheduler;
use crate::spawn::SpawnPolicy;
use crate::vehicle::Vehicle;
use crate::{motion, redirect};

/// A four-approach intersection simulation.
///
/// All mutable state lives here and is driven by [`step`](Self::step), one
/// call per tick. Each tick runs the components in a fixed order: external
/// feed merge, spawn admission, signal phase decision, motion, then
/// at-intersection redirection. There is no internal parallelism; a tick is
/// a pure sequential pass and never fails.
pub struct Simulation {
    /// Static configuration for the run.
    config: SimConfig,
    /// The live vehicle set.
    registry: VehicleRegistry,
    /// Per-lane priority scores.
    scheduler: LanePriorityScheduler,
    /// The signal phase state.
    lights: TrafficLightController,
    /// Admission control for new vehicles.
    spawn: SpawnPolicy,
    /// The current frame of simulation.
    frame: u64,
    /// Receiving end of the external ingestion channel, if one was opened.
    feed_rx: Option<Receiver<VehicleRecord>>,
    /// Sending end kept for cloning out further producer handles.
    feed_tx: Option<Sender<VehicleRecord>>,
    /// Debugging snapshot of the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation with an entropy-seeded spawn policy.
    pub fn new(config: SimConfig) -> Self {
        let spawn = SpawnPolicy::new(&config);
        Self::with_spawn_policy(config, spawn)
    }

    /// Creates a new simulation with a fixed spawn seed, for reproducible
    /// runs and tests.
    pub fn with_seed(config: SimConfig, seed: u64) -> Self {
        let spawn = SpawnPolicy::with_seed(&config, seed);
        Self::with_spawn_policy(config, spawn)
    }

    fn with_spawn_policy(config: SimConfig, spawn: SpawnPolicy) -> Self {
        Self {
            registry: VehicleRegistry::new(config.capacity),
            scheduler: LanePriorityScheduler::with_keys(config.geometry.lanes_per_road),
            lights: TrafficLightController::new(0, &config),
            spawn,
            frame: 0,
            feed_rx: None,
            feed_tx: None,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
            config,
        }
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        let now_ms = self.now_ms();
        self.drain_feed(now_ms);
        self.spawn.try_spawn(now_ms, &mut self.registry, &self.config);
        self.lights
            .step(now_ms, &self.registry, &mut self.scheduler, &self.config);
        motion::step(&mut self.registry, &self.lights, &self.config);
        redirect::step(&mut self.registry, &self.lights, &self.config);
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = serde_json::json!({
                "frame": self.frame,
                "green": self.lights.green().to_string(),
                "vehicles": serde_json::to_value(self.snapshot()).unwrap_or_default(),
            });
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The simulation clock, derived from the frame index and tick rate.
    pub fn now_ms(&self) -> u64 {
        self.config.frame_to_ms(self.frame)
    }

    /// The run's static configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The road currently holding green.
    pub fn green_road(&self) -> Road {
        self.lights.green()
    }

    /// Whether the given road holds green.
    pub fn is_green(&self, road: Road) -> bool {
        self.lights.is_green(road)
    }

    /// Forces a new green phase for `road`, restarting the phase timer.
    pub fn set_green(&mut self, road: Road) {
        let now_ms = self.now_ms();
        self.lights.set_green(road, now_ms, &self.config);
    }

    /// Number of live vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.registry.live_count()
    }

    /// Returns an iterator over the live vehicles, in stable slot order.
    /// This is the read-only view a renderer consumes.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.registry.iter_live()
    }

    /// Gets a reference to the live vehicle with the given id.
    pub fn get_vehicle(&self, id: u32) -> Option<&Vehicle> {
        self.registry.get(id)
    }

    /// Adds a vehicle directly at its road's spawn point, bypassing the
    /// spawn policy's admission checks. Returns `None` only when the
    /// registry is full.
    pub fn add_vehicle(&mut self, road: Road, lane: usize, turning_left: bool) -> Option<u32> {
        let geometry = self.config.geometry;
        let lane = geometry.clamp_lane(lane);
        let pos = geometry.spawn_point(road, lane);
        let speed = self.config.speed_per_tick();
        let now_ms = self.now_ms();
        self.registry.spawn_with(|id| {
            Vehicle::new(id, road, lane, pos, speed, turning_left, now_ms, &geometry)
        })
    }

    /// Sets the priority flag on a vehicle.
    pub fn set_vehicle_priority(&mut self, id: u32, priority: bool) {
        if let Some(vehicle) = self.registry.get_mut(id) {
            vehicle.set_priority(priority);
        }
    }

    /// Serializes every live vehicle to the record format, speed scaled to
    /// units per second. This is what a persistence producer appends.
    pub fn snapshot(&self) -> Vec<VehicleRecord> {
        let tick_rate = self.config.tick_rate as f64;
        self.registry
            .iter_live()
            .map(|v| VehicleRecord {
                id: v.id(),
                road: v.road(),
                lane: v.lane(),
                direction: v.direction(),
                x: v.pos().x,
                y: v.pos().y,
                speed: v.speed() * tick_rate,
            })
            .collect()
    }

    /// Opens (or reuses) the external ingestion channel and returns a
    /// producer handle. Records sent on it are merged at the start of the
    /// next tick under the reconcile-by-id rule.
    pub fn feed_sender(&mut self) -> Sender<VehicleRecord> {
        if self.feed_tx.is_none() {
            let (tx, rx) = channel();
            self.feed_tx = Some(tx);
            self.feed_rx = Some(rx);
        }
        self.feed_tx.as_ref().unwrap().clone()
    }

    /// Merges any pending external records into the registry.
    fn drain_feed(&mut self, now_ms: u64) {
        let Some(rx) = &self.feed_rx else {
            return;
        };
        while let Ok(record) = rx.try_recv() {
            self.registry.apply_record(&record, now_ms, &self.config);
        }
    }

    /// Gets the debugging snapshot for the previously simulated frame.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }
}

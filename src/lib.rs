pub use cgmath;
pub use config::{Geometry, SimConfig};
pub use feed::{ParseRecordError, VehicleRecord};
pub use light::TrafficLightController;
pub use registry::VehicleRegistry;
pub use road::{Direction, Road};
pub use scheduler::{LanePriority, LanePriorityScheduler, MAX_LANE_KEYS};
pub use simulation::Simulation;
pub use spawn::SpawnPolicy;
pub use util::{Box2d, Interval, Point2d, Vector2d};
pub use vehicle::Vehicle;

mod config;
mod feed;
mod light;
mod motion;
mod redirect;
mod registry;
mod road;
mod scheduler;
mod simulation;
mod spawn;
mod util;
mod vehicle;

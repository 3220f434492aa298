#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hosts a Path Defence world together with its systems.
//!
//! [`Simulation`] is the facade players and adapters talk to: it owns the
//! level catalog, the world and the pure systems, and runs the ordered tick
//! pipeline. [`SimulationLoop`] drives a simulation from wall-clock time
//! through two cooperative tasks, one for frames and one for wave spawns, and
//! [`FramePacer`] supplies real elapsed time to hosts that run live.

mod config;
mod driver;
mod pacing;
mod session;
mod step;
mod timers;

pub use config::{ConfigError, SimConfig};
pub use driver::SimulationLoop;
pub use pacing::FramePacer;
pub use session::{Frame, SessionError, Simulation};
pub use step::RunStats;

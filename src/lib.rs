//! RPS Arena - a rock/paper/scissors cyclic-dominance particle arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, contacts, dominance, convergence)
//! - `sync`: Authority/observer protocol (local and remote topologies)
//! - `settings`: Run configuration
//! - `tally`: Win history across runs

pub mod error;
pub mod settings;
pub mod sim;
pub mod sync;
pub mod tally;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{CommandError, ConfigError, ServerError};
pub use settings::{Settings, SpeedRange};
pub use tally::{RunResult, WinTally};

/// Simulation configuration constants
pub mod consts {
    /// Authority tick period in milliseconds (10 Hz)
    pub const TICK_INTERVAL_MS: u64 = 100;
    /// Longest tick period a settings file may ask for
    pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;
    /// Delay between convergence and the automatic reseed
    pub const RESTART_DELAY_MS: u64 = 5_000;

    /// Population defaults
    pub const DEFAULT_COUNT: usize = 60;
    pub const ENTITY_RADIUS: f32 = 12.0;

    /// Per-axis speed range (units per tick)
    pub const MIN_SPEED: f32 = 0.5;
    pub const MAX_SPEED: f32 = 0.8;
}

//! Deterministic simulation module
//!
//! All arena logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by population index)
//! - No transport or platform dependencies

pub mod collision;
pub mod dominance;
pub mod lifecycle;
pub mod motion;
pub mod state;
pub mod tick;

pub use collision::{bounce_apart, detect_contacts, in_contact};
pub use dominance::{CollisionResponse, Conversion, resolve, resolve_all};
pub use lifecycle::RestartScheduler;
pub use motion::{advance, advance_all, resettle};
pub use state::{Arena, Census, Entity, Kind, RunPhase, SimulationRun, seed};
pub use tick::{TickOutcome, tick};

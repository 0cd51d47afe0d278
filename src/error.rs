//! Error types for the arena.
//!
//! The tick itself cannot fail; errors only arise when a run is configured or
//! when a command is submitted to the authority.

use thiserror::Error;

/// Rejected run configuration. No run is started when seeding fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arena dimensions must be positive and finite (got {width}x{height})")]
    InvalidArena { width: f32, height: f32 },
    #[error("arena {width}x{height} cannot hold an entity of radius {radius}")]
    ArenaTooSmall { width: f32, height: f32, radius: f32 },
    #[error("entity radius must be positive and finite (got {0})")]
    InvalidRadius(f32),
    #[error("speed range must be finite and non-negative (got {min}..={max})")]
    NegativeSpeed { min: f32, max: f32 },
    #[error("speed range minimum {min} exceeds maximum {max}")]
    InvertedSpeed { min: f32, max: f32 },
    #[error("kind set must contain at least one kind")]
    EmptyKinds,
    #[error("population count must be non-zero")]
    EmptyPopulation,
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
    #[error("tick interval {0} ms exceeds the one minute limit")]
    TickIntervalTooLong(u64),
    #[error("failed to read settings: {0}")]
    Io(String),
    #[error("failed to parse settings: {0}")]
    Parse(String),
}

/// Rejected command. The live run is never mutated when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("malformed command: {0}")]
    Malformed(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} is not supported by this authority")]
    Unsupported(&'static str),
    #[error("no run has been started")]
    NotStarted,
}

impl CommandError {
    pub(crate) fn malformed(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Failure to bring up a remote authority
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn authority thread: {0}")]
    Spawn(#[from] std::io::Error),
}

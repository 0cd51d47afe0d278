//! Run settings
//!
//! Loaded once per authority and reused for every reseed.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::{CollisionResponse, Kind};

/// Per-axis speed bounds in units per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f32,
    pub max: f32,
}

impl SpeedRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = self.min.is_finite() && self.max.is_finite();
        if !finite || self.min < 0.0 || self.max < 0.0 {
            return Err(ConfigError::NegativeSpeed {
                min: self.min,
                max: self.max,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedSpeed {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self::new(MIN_SPEED, MAX_SPEED)
    }
}

/// Simulation settings shared by every run of one authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Entities per run, split evenly across `kinds`
    pub count: usize,
    /// Radius shared by every entity of a run
    pub radius: f32,
    /// Initial per-axis speed bounds
    pub speed: SpeedRange,
    /// Kinds to seed, in seeding order (remainder goes to the first ones)
    pub kinds: Vec<Kind>,
    /// What happens to velocities when a contact converts a kind
    pub response: CollisionResponse,
    /// Authority tick period
    pub tick_interval_ms: u64,
    /// Delay between convergence and reseed
    pub restart_delay_ms: u64,
    /// Fixed RNG seed (entropy-seeded when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            radius: ENTITY_RADIUS,
            speed: SpeedRange::default(),
            kinds: Kind::ALL.to_vec(),
            response: CollisionResponse::default(),
            tick_interval_ms: TICK_INTERVAL_MS,
            restart_delay_ms: RESTART_DELAY_MS,
            seed: None,
        }
    }
}

impl Settings {
    /// Environment variable naming a JSON settings file (native only)
    #[allow(dead_code)]
    const ENV_PATH: &'static str = "RPS_ARENA_SETTINGS";

    /// Check everything that does not depend on the arena
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        self.speed.validate()?;
        if self.kinds.is_empty() {
            return Err(ConfigError::EmptyKinds);
        }
        if self.count == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::TickIntervalTooLong(self.tick_interval_ms));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Restart delay expressed in authority ticks (rounded up, at least one)
    pub fn restart_delay_ticks(&self) -> u64 {
        let interval = self.tick_interval_ms.max(1);
        self.restart_delay_ms.div_ceil(interval).max(1)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Load settings from the file named by `RPS_ARENA_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Browser builds have no settings file
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.kinds, Kind::ALL.to_vec());
        assert_eq!(settings.restart_delay_ticks(), 50);
    }

    #[test]
    fn test_restart_delay_rounds_up() {
        let settings = Settings {
            tick_interval_ms: 30,
            restart_delay_ms: 100,
            ..Default::default()
        };
        assert_eq!(settings.restart_delay_ticks(), 4);

        let settings = Settings {
            restart_delay_ms: 0,
            ..Default::default()
        };
        assert_eq!(settings.restart_delay_ticks(), 1);
    }

    #[test]
    fn test_rejects_overlong_tick_interval() {
        let settings = Settings {
            tick_interval_ms: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::TickIntervalTooLong(u64::MAX))
        );

        // An unbounded restart delay is accepted: it just never fires
        let settings = Settings {
            restart_delay_ms: u64::MAX,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_speeds() {
        let settings = Settings {
            speed: SpeedRange::new(-1.0, 2.0),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NegativeSpeed { .. })
        ));

        let settings = Settings {
            speed: SpeedRange::new(2.0, 1.0),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvertedSpeed { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_kinds() {
        let settings = Settings {
            kinds: Vec::new(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::EmptyKinds));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{"count": 9, "kinds": ["paper", "rock"], "response": "bounce"}"#)
                .unwrap();
        assert_eq!(settings.count, 9);
        assert_eq!(settings.kinds, vec![Kind::Paper, Kind::Rock]);
        assert_eq!(settings.response, CollisionResponse::Bounce);
        assert_eq!(settings.radius, ENTITY_RADIUS);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            Settings::from_json(r#"{"radius": 0.0}"#),
            Err(ConfigError::InvalidRadius(_))
        ));
        assert!(matches!(
            Settings::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}

//! Arena state and core simulation types
//!
//! A run owns one population and one arena. Entities are plain values in a
//! contiguous `Vec`, addressed by index during the pairwise scan.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::settings::Settings;

/// Particle kind. Each kind beats exactly one other kind:
/// Rock beats Scissors, Scissors beats Paper, Paper beats Rock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Rock,
    Paper,
    Scissors,
}

impl Kind {
    /// Every kind, in seeding order
    pub const ALL: [Kind; 3] = [Kind::Rock, Kind::Paper, Kind::Scissors];

    /// The kind this one converts on contact
    pub fn prey(self) -> Kind {
        match self {
            Kind::Rock => Kind::Scissors,
            Kind::Scissors => Kind::Paper,
            Kind::Paper => Kind::Rock,
        }
    }

    /// Whether `self` converts `other` on contact
    #[inline]
    pub fn beats(self, other: Kind) -> bool {
        self.prey() == other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Rock => "rock",
            Kind::Paper => "paper",
            Kind::Scissors => "scissors",
        }
    }

    fn index(self) -> usize {
        match self {
            Kind::Rock => 0,
            Kind::Paper => 1,
            Kind::Scissors => 2,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: Kind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Entity {
    pub fn new(kind: Kind, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            kind,
            pos,
            vel,
            radius,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Rectangular arena with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let valid = |d: f32| d.is_finite() && d > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidArena { width, height });
        }
        Ok(Self { width, height })
    }

    /// Check that an entity of `radius` fits between the walls
    pub fn check_fits(&self, radius: f32) -> Result<(), ConfigError> {
        if self.width < 2.0 * radius || self.height < 2.0 * radius {
            return Err(ConfigError::ArenaTooSmall {
                width: self.width,
                height: self.height,
                radius,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Per-kind member counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub rock: usize,
    pub paper: usize,
    pub scissors: usize,
}

impl Census {
    pub fn of(entities: &[Entity]) -> Self {
        let mut counts = [0usize; 3];
        for entity in entities {
            counts[entity.kind.index()] += 1;
        }
        Self {
            rock: counts[0],
            paper: counts[1],
            scissors: counts[2],
        }
    }

    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Rock => self.rock,
            Kind::Paper => self.paper,
            Kind::Scissors => self.scissors,
        }
    }

    /// Number of kinds with at least one member
    pub fn distinct(&self) -> usize {
        Kind::ALL.iter().filter(|&&k| self.count(k) > 0).count()
    }

    /// The sole remaining kind, if the population has converged
    pub fn sole_kind(&self) -> Option<Kind> {
        let mut present = Kind::ALL.into_iter().filter(|&k| self.count(k) > 0);
        match (present.next(), present.next()) {
            (Some(kind), None) => Some(kind),
            _ => None,
        }
    }

    /// Kind with the most members (ties go to the earlier kind)
    pub fn leader(&self) -> Option<Kind> {
        let mut best: Option<Kind> = None;
        for kind in Kind::ALL {
            let count = self.count(kind);
            if count > 0 && best.is_none_or(|b| count > self.count(b)) {
                best = Some(kind);
            }
        }
        best
    }
}

/// Seed a population.
///
/// `settings.count` entities are split evenly over `settings.kinds` (the
/// first kinds take the remainder), placed uniformly inside the band the
/// walls leave free, each velocity axis drawn from the speed range with a
/// random sign.
pub fn seed<R: Rng + ?Sized>(
    arena: Arena,
    settings: &Settings,
    rng: &mut R,
) -> Result<Vec<Entity>, ConfigError> {
    settings.validate()?;
    let arena = Arena::new(arena.width, arena.height)?;
    arena.check_fits(settings.radius)?;

    let radius = settings.radius;
    let kinds = settings.kinds.len();
    let per_kind = settings.count / kinds;
    let remainder = settings.count % kinds;

    let mut entities = Vec::with_capacity(settings.count);
    for (i, &kind) in settings.kinds.iter().enumerate() {
        let members = per_kind + usize::from(i < remainder);
        for _ in 0..members {
            let pos = Vec2::new(
                rng.random_range(radius..=arena.width - radius),
                rng.random_range(radius..=arena.height - radius),
            );
            let vel = Vec2::new(
                random_component(settings, rng),
                random_component(settings, rng),
            );
            entities.push(Entity::new(kind, pos, vel, radius));
        }
    }
    Ok(entities)
}

fn random_component<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> f32 {
    let magnitude = rng.random_range(settings.speed.min..=settings.speed.max);
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Freshly seeded, not yet ticked
    Seeded,
    /// Ticking, more than one kind present
    Running,
    /// One kind left; the run is frozen until it is replaced
    Converged { winner: Kind },
}

/// A single run: one arena, one population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Run number within its authority (1-based)
    pub id: u64,
    pub arena: Arena,
    pub entities: Vec<Entity>,
    pub phase: RunPhase,
    /// Ticks this run has been advanced
    pub time_ticks: u64,
}

impl SimulationRun {
    /// Seed a new run
    pub fn new<R: Rng + ?Sized>(
        id: u64,
        arena: Arena,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let entities = seed(arena, settings, rng)?;
        Ok(Self::from_entities(id, arena, entities))
    }

    /// Wrap an existing population (scenarios and tests)
    pub fn from_entities(id: u64, arena: Arena, entities: Vec<Entity>) -> Self {
        Self {
            id,
            arena,
            entities,
            phase: RunPhase::Seeded,
            time_ticks: 0,
        }
    }

    pub fn census(&self) -> Census {
        Census::of(&self.entities)
    }

    pub fn is_converged(&self) -> bool {
        matches!(self.phase, RunPhase::Converged { .. })
    }

    pub fn winner(&self) -> Option<Kind> {
        match self.phase {
            RunPhase::Converged { winner } => Some(winner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SpeedRange;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_beats_is_a_strict_cycle() {
        for a in Kind::ALL {
            for b in Kind::ALL {
                let cases = [a == b, a.beats(b), b.beats(a)];
                assert_eq!(
                    cases.iter().filter(|&&c| c).count(),
                    1,
                    "{a} vs {b} must fall in exactly one case"
                );
            }
        }
        assert!(Kind::Rock.beats(Kind::Scissors));
        assert!(Kind::Scissors.beats(Kind::Paper));
        assert!(Kind::Paper.beats(Kind::Rock));
    }

    #[test]
    fn test_kind_names() {
        for kind in Kind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(serde_json::to_string(&Kind::Scissors).unwrap(), "\"scissors\"");
    }

    #[test]
    fn test_seed_splits_evenly() {
        let mut rng = Pcg32::seed_from_u64(7);
        let arena = Arena::new(800.0, 600.0).unwrap();
        let entities = seed(arena, &Settings::default(), &mut rng).unwrap();

        assert_eq!(entities.len(), 60);
        let census = Census::of(&entities);
        for kind in Kind::ALL {
            assert_eq!(census.count(kind), 20);
        }
    }

    #[test]
    fn test_seed_remainder_goes_to_first_kinds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let arena = Arena::new(800.0, 600.0).unwrap();
        let settings = Settings {
            count: 62,
            ..Default::default()
        };
        let census = Census::of(&seed(arena, &settings, &mut rng).unwrap());
        assert_eq!(census.rock, 21);
        assert_eq!(census.paper, 21);
        assert_eq!(census.scissors, 20);
    }

    #[test]
    fn test_seed_places_inside_walls_with_speed_in_range() {
        let mut rng = Pcg32::seed_from_u64(11);
        let arena = Arena::new(300.0, 200.0).unwrap();
        let settings = Settings {
            count: 200,
            speed: SpeedRange::new(1.0, 2.0),
            ..Default::default()
        };
        for e in seed(arena, &settings, &mut rng).unwrap() {
            assert!(e.pos.x >= e.radius && e.pos.x <= arena.width - e.radius);
            assert!(e.pos.y >= e.radius && e.pos.y <= arena.height - e.radius);
            assert!((1.0..=2.0).contains(&e.vel.x.abs()));
            assert!((1.0..=2.0).contains(&e.vel.y.abs()));
        }
    }

    #[test]
    fn test_seed_with_fewer_entities_than_kinds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let arena = Arena::new(100.0, 100.0).unwrap();
        let settings = Settings {
            count: 2,
            ..Default::default()
        };
        let census = Census::of(&seed(arena, &settings, &mut rng).unwrap());
        assert_eq!(census.rock, 1);
        assert_eq!(census.paper, 1);
        assert_eq!(census.scissors, 0);
    }

    #[test]
    fn test_seed_rejects_invalid_configuration() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            Arena::new(0.0, 100.0),
            Err(ConfigError::InvalidArena { .. })
        ));
        assert!(matches!(
            seed(Arena { width: -5.0, height: 10.0 }, &Settings::default(), &mut rng),
            Err(ConfigError::InvalidArena { .. })
        ));
        assert!(matches!(
            seed(Arena::new(20.0, 100.0).unwrap(), &Settings::default(), &mut rng),
            Err(ConfigError::ArenaTooSmall { .. })
        ));
        let settings = Settings {
            kinds: Vec::new(),
            ..Default::default()
        };
        assert_eq!(
            seed(Arena::new(100.0, 100.0).unwrap(), &settings, &mut rng),
            Err(ConfigError::EmptyKinds)
        );
    }

    #[test]
    fn test_census_leader_and_sole_kind() {
        let e = |kind| Entity::new(kind, Vec2::ZERO, Vec2::ZERO, 1.0);
        let census = Census::of(&[e(Kind::Paper), e(Kind::Scissors), e(Kind::Scissors)]);
        assert_eq!(census.distinct(), 2);
        assert_eq!(census.leader(), Some(Kind::Scissors));
        assert_eq!(census.sole_kind(), None);

        let census = Census::of(&[e(Kind::Rock), e(Kind::Rock)]);
        assert_eq!(census.sole_kind(), Some(Kind::Rock));

        assert_eq!(Census::default().leader(), None);
        assert_eq!(Census::default().sole_kind(), None);
    }
}

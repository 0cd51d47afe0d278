//! The authority: sole owner of the live run.
//!
//! Everything that mutates a run (ticks, restarts, commands) goes through one
//! `Authority`, which is driven from a single thread. Observers only ever see
//! copies. The authority knows nothing about transports; callers route the
//! events it returns.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::message::{Command, Event};
use crate::error::{CommandError, ConfigError};
use crate::settings::Settings;
use crate::sim::{
    self, Arena, Census, Entity, Kind, RestartScheduler, RunPhase, SimulationRun, TickOutcome,
};

/// Where the renderers live relative to the authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Same process: snapshots are handed back from `tick`, `reset` is allowed
    Local,
    /// Observers elsewhere: every tick is published as `updateSimulation`
    Remote,
}

/// Immutable copy of a run at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub run: u64,
    /// Ticks the run has been advanced
    pub tick: u64,
    pub arena: Arena,
    pub phase: RunPhase,
    pub census: Census,
    pub entities: Vec<Entity>,
}

impl Snapshot {
    pub fn of(run: &SimulationRun) -> Self {
        Self {
            run: run.id,
            tick: run.time_ticks,
            arena: run.arena,
            phase: run.phase,
            census: run.census(),
            entities: run.entities.clone(),
        }
    }

    /// Kind with the most members
    pub fn leader(&self) -> Option<Kind> {
        self.census.leader()
    }
}

/// Result of one authority tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// State after the tick (absent until the first `start`)
    pub snapshot: Option<Snapshot>,
    /// What the simulation step did
    pub outcome: TickOutcome,
    /// Events for every observer, in order
    pub events: Vec<Event>,
}

pub struct Authority {
    settings: Settings,
    topology: Topology,
    rng: Pcg32,
    run: Option<SimulationRun>,
    runs_started: u64,
    /// Authority ticks since creation, converged or not
    clock: u64,
    restarts: RestartScheduler,
}

impl Authority {
    pub fn new(settings: Settings, topology: Topology) -> Result<Self, ConfigError> {
        settings.validate()?;
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Authority ({:?}) using RNG seed {}", topology, seed);

        Ok(Self {
            restarts: RestartScheduler::new(settings.restart_delay_ticks()),
            rng: Pcg32::seed_from_u64(seed),
            settings,
            topology,
            run: None,
            runs_started: 0,
            clock: 0,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn run(&self) -> Option<&SimulationRun> {
        self.run.as_ref()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn pending_restarts(&self) -> usize {
        self.restarts.pending()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.run.as_ref().map(Snapshot::of)
    }

    /// Apply a command. The returned events answer the submitter only.
    ///
    /// `start` seeds the first run with the requested arena; once a run
    /// exists it hands back the live population and ignores the size.
    pub fn submit(&mut self, command: Command) -> Result<Vec<Event>, CommandError> {
        log::debug!("Command: {:?}", command);
        match command {
            Command::Start { width, height } => {
                if let Some(run) = &self.run {
                    if run.arena.width != width || run.arena.height != height {
                        log::debug!(
                            "Arena already fixed at {}x{}, ignoring {}x{}",
                            run.arena.width,
                            run.arena.height,
                            width,
                            height
                        );
                    }
                    return Ok(vec![Event::started(&run.entities)]);
                }
                let arena = Arena::new(width, height)?;
                let run = self.reseed(arena)?;
                Ok(vec![Event::started(&run.entities)])
            }
            Command::Reset => {
                if self.topology == Topology::Remote {
                    return Err(CommandError::Unsupported(command.name()));
                }
                let arena = self.run.as_ref().ok_or(CommandError::NotStarted)?.arena;
                let run = self.reseed(arena)?;
                Ok(vec![Event::started(&run.entities)])
            }
        }
    }

    /// Decode and apply a JSON command
    pub fn submit_json(&mut self, text: &str) -> Result<Vec<Event>, CommandError> {
        self.submit(Command::decode(text)?)
    }

    /// Advance by one tick: fire due restarts, then step the live run.
    pub fn tick(&mut self) -> TickReport {
        self.clock += 1;
        let mut events = Vec::new();

        let fired = self.restarts.take_due(self.clock);
        if fired > 0 {
            if let Some(arena) = self.run.as_ref().map(|r| r.arena) {
                match self.reseed(arena) {
                    Ok(run) => events.push(Event::started(&run.entities)),
                    Err(e) => log::error!("Restart failed: {}", e),
                }
            }
        }

        let response = self.settings.response;
        let Some(run) = self.run.as_mut() else {
            return TickReport {
                events,
                ..Default::default()
            };
        };

        let outcome = sim::tick(run, response);
        if self.topology == Topology::Remote {
            events.push(Event::update(&run.entities));
        }
        if let Some(winner) = outcome.converged {
            events.push(Event::SimulationComplete { winner });
            let due = self.restarts.schedule(self.clock);
            log::info!("Run {} won by {}, reseeding at tick {}", run.id, winner, due);
        }

        TickReport {
            snapshot: Some(Snapshot::of(run)),
            outcome,
            events,
        }
    }

    fn reseed(&mut self, arena: Arena) -> Result<&SimulationRun, ConfigError> {
        let id = self.runs_started + 1;
        let run = SimulationRun::new(id, arena, &self.settings, &mut self.rng)?;
        self.runs_started = id;
        log::info!(
            "Run {} seeded: {} entities in {}x{}",
            id,
            run.entities.len(),
            arena.width,
            arena.height
        );
        Ok(self.run.insert(run))
    }
}

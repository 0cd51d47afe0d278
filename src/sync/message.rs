//! Command and event messages exchanged between observers and the authority.
//!
//! Messages are JSON objects tagged by `type`:
//! `{"type":"start","width":800,"height":600}`, `{"type":"reset"}`,
//! `{"type":"simulationStarted","elements":[...]}`,
//! `{"type":"updateSimulation","elements":[...]}`,
//! `{"type":"simulationComplete","winner":"rock"}`,
//! `{"type":"commandRejected","reason":"..."}`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::sim::{Entity, Kind};

/// Observer -> authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Seed the first run with this arena, or fetch the live run
    Start { width: f32, height: f32 },
    /// Discard the live run and reseed it (local authority only)
    Reset,
}

impl Command {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, CommandError> {
        serde_json::from_str(text).map_err(CommandError::malformed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Reset => "reset",
        }
    }
}

/// Authority -> observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// A fresh seed, or the live run handed to a late observer
    SimulationStarted { elements: Vec<ElementRecord> },
    /// Per-tick snapshot (remote authority only)
    UpdateSimulation { elements: Vec<ElementRecord> },
    /// Sent once per run, on the tick it converged
    SimulationComplete { winner: Kind },
    /// Reply to a command the authority refused; the run is untouched
    CommandRejected { reason: String },
}

impl Event {
    pub fn started(entities: &[Entity]) -> Self {
        Event::SimulationStarted {
            elements: ElementRecord::from_entities(entities),
        }
    }

    pub fn update(entities: &[Entity]) -> Self {
        Event::UpdateSimulation {
            elements: ElementRecord::from_entities(entities),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Population carried by the event, if any
    pub fn elements(&self) -> Option<&[ElementRecord]> {
        match self {
            Event::SimulationStarted { elements } | Event::UpdateSimulation { elements } => {
                Some(elements)
            }
            Event::SimulationComplete { .. } | Event::CommandRejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

/// Wire form of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub kind: Kind,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: f32,
}

impl ElementRecord {
    pub fn from_entities(entities: &[Entity]) -> Vec<Self> {
        entities.iter().map(Self::from).collect()
    }

    pub fn to_entities(records: &[Self]) -> Vec<Entity> {
        records.iter().map(Entity::from).collect()
    }
}

impl From<&Entity> for ElementRecord {
    fn from(e: &Entity) -> Self {
        Self {
            kind: e.kind,
            position: Position {
                x: e.pos.x,
                y: e.pos.y,
            },
            velocity: Velocity {
                dx: e.vel.x,
                dy: e.vel.y,
            },
            radius: e.radius,
        }
    }
}

impl From<&ElementRecord> for Entity {
    fn from(r: &ElementRecord) -> Self {
        Entity::new(
            r.kind,
            Vec2::new(r.position.x, r.position.y),
            Vec2::new(r.velocity.dx, r.velocity.dy),
            r.radius,
        )
    }
}

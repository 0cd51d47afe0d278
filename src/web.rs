//! Browser binding for the local authority
//!
//! The page owns the frame loop: it calls `tick()` at the tick interval and
//! draws the elements from the returned JSON.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::settings::Settings;
use crate::sim::{Census, Kind};
use crate::sync::{ElementRecord, Event, LocalSession, Snapshot};

/// What the page receives each tick
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameJson<'a> {
    run: u64,
    tick: u64,
    census: &'a Census,
    elements: Vec<ElementRecord>,
    /// Set on the tick a run converges
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<Kind>,
}

#[wasm_bindgen]
pub struct WebSimulation {
    session: LocalSession<Vec<Event>>,
    last: Option<Snapshot>,
    last_winner: Option<Kind>,
}

#[wasm_bindgen]
impl WebSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<WebSimulation, JsValue> {
        console_error_panic_hook::set_once();
        // A second instance on the same page finds the logger already set
        let _ = console_log::init_with_level(log::Level::Info);

        let settings = Settings {
            seed: Some(js_sys::Date::now() as u64),
            ..Settings::load()
        };
        let mut session =
            LocalSession::new(settings, Vec::new()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let first = session
            .start(width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        session.sink_mut().clear();
        log::info!("RPS arena ready: {} elements", first.entities.len());

        Ok(Self {
            session,
            last: Some(first),
            last_winner: None,
        })
    }

    /// Advance one tick and return the frame as JSON
    pub fn tick(&mut self) -> String {
        if let Some(snapshot) = self.session.tick() {
            self.last = Some(snapshot);
        }
        let winner = self.drain_winner();
        self.frame_json(winner)
    }

    /// Start a fresh run in the same arena
    pub fn reset(&mut self) -> Result<(), JsValue> {
        let snapshot = self
            .session
            .reset()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.session.sink_mut().clear();
        self.last = Some(snapshot);
        Ok(())
    }

    /// Kind with the most members right now
    pub fn leader(&self) -> Option<String> {
        self.last
            .as_ref()
            .and_then(Snapshot::leader)
            .map(|k| k.as_str().to_string())
    }

    /// Winner of the most recently completed run
    pub fn winner(&self) -> Option<String> {
        self.last_winner.map(|k| k.as_str().to_string())
    }
}

impl WebSimulation {
    fn drain_winner(&mut self) -> Option<Kind> {
        let mut winner = None;
        for event in self.session.sink_mut().drain(..) {
            if let Event::SimulationComplete { winner: kind } = event {
                winner = Some(kind);
            }
        }
        if winner.is_some() {
            self.last_winner = winner;
        }
        winner
    }

    fn frame_json(&self, winner: Option<Kind>) -> String {
        let Some(snapshot) = &self.last else {
            return "null".to_string();
        };
        let frame = FrameJson {
            run: snapshot.run,
            tick: snapshot.tick,
            census: &snapshot.census,
            elements: ElementRecord::from_entities(&snapshot.entities),
            winner,
        };
        serde_json::to_string(&frame).unwrap_or_else(|e| {
            log::error!("Failed to encode frame: {}", e);
            "null".to_string()
        })
    }
}

//! Local authority: the simulating process is also the renderer.
//!
//! Delivery is a direct call. The caller drives `tick` from its own frame
//! loop and renders the snapshot it gets back; lifecycle events
//! (`simulationStarted`, `simulationComplete`) go to the injected sink.

use super::authority::{Authority, Snapshot, Topology};
use super::message::{Command, Event};
use super::transport::{Recipient, Transport};
use crate::error::{CommandError, ConfigError};
use crate::settings::Settings;

pub struct LocalSession<S: Transport> {
    authority: Authority,
    sink: S,
}

impl<S: Transport> LocalSession<S> {
    pub fn new(settings: Settings, sink: S) -> Result<Self, ConfigError> {
        Ok(Self {
            authority: Authority::new(settings, Topology::Local)?,
            sink,
        })
    }

    /// Seed the first run, or return the live one
    pub fn start(&mut self, width: f32, height: f32) -> Result<Snapshot, CommandError> {
        self.command(Command::Start { width, height })
    }

    /// Discard the live run and reseed it immediately
    pub fn reset(&mut self) -> Result<Snapshot, CommandError> {
        self.command(Command::Reset)
    }

    /// Advance one tick; `None` until `start` has succeeded
    pub fn tick(&mut self) -> Option<Snapshot> {
        let report = self.authority.tick();
        self.deliver(&report.events);
        report.snapshot
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.authority.snapshot()
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn command(&mut self, command: Command) -> Result<Snapshot, CommandError> {
        let events = self.authority.submit(command)?;
        self.deliver(&events);
        self.authority.snapshot().ok_or(CommandError::NotStarted)
    }

    fn deliver(&mut self, events: &[Event]) {
        for event in events {
            self.sink.publish(Recipient::All, event);
        }
    }
}

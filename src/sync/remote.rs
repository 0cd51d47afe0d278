//! Remote authority: one thread simulates, any number of observers render.
//!
//! The authority thread ticks on a fixed period whether or not anyone is
//! connected, and is the only code touching the live run. Observers talk to
//! it through an in-proc channel carrying JSON text, and receive events the
//! same way. Commands are applied between ticks, never during one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::authority::{Authority, Topology};
use super::message::{Command, ElementRecord, Event};
use super::transport::{ChannelHub, ObserverId, Recipient, Transport};
use crate::error::ServerError;
use crate::settings::Settings;
use crate::sim::{Entity, Kind};

/// Messages into the authority thread
enum Inbound {
    Connect {
        id: ObserverId,
        outbox: Sender<String>,
    },
    Command {
        from: ObserverId,
        text: String,
    },
    Disconnect {
        id: ObserverId,
    },
}

/// Handle to a running authority thread. Dropping it stops the thread.
pub struct RemoteServer {
    inbox: Sender<Inbound>,
    running: Arc<AtomicBool>,
    next_id: AtomicU64,
    worker: Option<JoinHandle<()>>,
}

impl RemoteServer {
    pub fn spawn(settings: Settings) -> Result<Self, ServerError> {
        let authority = Authority::new(settings, Topology::Remote)?;
        let (inbox, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let worker = thread::Builder::new()
            .name("rps-authority".into())
            .spawn(move || serve(authority, rx, flag))?;

        Ok(Self {
            inbox,
            running,
            next_id: AtomicU64::new(1),
            worker: Some(worker),
        })
    }

    /// Register a new observer
    pub fn connect(&self) -> Observer {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (outbox, events) = mpsc::channel();
        if self.inbox.send(Inbound::Connect { id, outbox }).is_err() {
            log::warn!("Authority thread is gone; observer {} will stay idle", id);
        }
        Observer {
            id,
            commands: self.inbox.clone(),
            events,
            latest: None,
            last_winner: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop the authority thread and wait for it
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Authority thread panicked");
            }
        }
    }
}

impl Drop for RemoteServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Authority thread body
fn serve(mut authority: Authority, inbox: Receiver<Inbound>, running: Arc<AtomicBool>) {
    let period = authority.settings().tick_interval();
    let mut hub = ChannelHub::default();
    let mut next_tick = Instant::now() + period;
    log::info!("Authority thread started ({:?} per tick)", period);

    while running.load(Ordering::Relaxed) {
        // Apply commands until the tick is due
        loop {
            let now = Instant::now();
            if now >= next_tick {
                break;
            }
            match inbox.recv_timeout(next_tick - now) {
                Ok(message) => handle(&mut authority, &mut hub, message),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(next_tick.saturating_duration_since(Instant::now()));
                    break;
                }
            }
        }

        let report = authority.tick();
        for event in &report.events {
            hub.publish(Recipient::All, event);
        }

        next_tick += period;
        let now = Instant::now();
        if next_tick < now {
            // Fell behind: skip the missed ticks rather than bursting
            next_tick = now + period;
        }
    }
    log::info!("Authority thread stopped after {} ticks", authority.clock());
}

fn handle(authority: &mut Authority, hub: &mut ChannelHub, message: Inbound) {
    match message {
        Inbound::Connect { id, outbox } => hub.register(id, outbox),
        Inbound::Disconnect { id } => {
            hub.unregister(id);
        }
        Inbound::Command { from, text } => match authority.submit_json(&text) {
            Ok(replies) => {
                for event in &replies {
                    hub.publish(Recipient::Observer(from), event);
                }
            }
            Err(e) => {
                log::warn!("Rejected command from observer {}: {}", from, e);
                let reply = Event::CommandRejected {
                    reason: e.to_string(),
                };
                hub.publish(Recipient::Observer(from), &reply);
            }
        },
    }
}

/// Observer side of a remote authority.
///
/// Never blocks the caller's frame loop: `poll` drains whatever has arrived
/// and the last known population stays available between updates.
pub struct Observer {
    id: ObserverId,
    commands: Sender<Inbound>,
    events: Receiver<String>,
    latest: Option<Vec<Entity>>,
    last_winner: Option<Kind>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Ask for the live run, seeding it with this arena if there is none.
    /// Returns false if the authority is gone.
    pub fn start(&self, width: f32, height: f32) -> bool {
        match (Command::Start { width, height }).encode() {
            Ok(text) => self.send_raw(text),
            Err(e) => {
                log::error!("Failed to encode start command: {}", e);
                false
            }
        }
    }

    /// Send an already-encoded command
    pub fn send_raw(&self, text: impl Into<String>) -> bool {
        self.commands
            .send(Inbound::Command {
                from: self.id,
                text: text.into(),
            })
            .is_ok()
    }

    /// Drain every event that has arrived, updating the local copy
    pub fn poll(&mut self) -> Vec<Event> {
        let texts: Vec<String> = self.events.try_iter().collect();
        texts.iter().filter_map(|text| self.accept(text)).collect()
    }

    /// Wait up to `timeout` for the next event (for headless consumers)
    pub fn poll_timeout(&mut self, timeout: Duration) -> Option<Event> {
        let text = self.events.recv_timeout(timeout).ok()?;
        self.accept(&text)
    }

    /// Last population received
    pub fn latest(&self) -> Option<&[Entity]> {
        self.latest.as_deref()
    }

    /// Winner of the most recent completed run
    pub fn last_winner(&self) -> Option<Kind> {
        self.last_winner
    }

    fn accept(&mut self, text: &str) -> Option<Event> {
        let event = match Event::decode(text) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Observer {} dropped undecodable event: {}", self.id, e);
                return None;
            }
        };
        match &event {
            Event::SimulationStarted { elements } | Event::UpdateSimulation { elements } => {
                self.latest = Some(ElementRecord::to_entities(elements));
            }
            Event::SimulationComplete { winner } => self.last_winner = Some(*winner),
            Event::CommandRejected { .. } => {}
        }
        Some(event)
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        let _ = self.commands.send(Inbound::Disconnect { id: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn fast_settings() -> Settings {
        Settings {
            seed: Some(77),
            tick_interval_ms: 5,
            restart_delay_ms: 20,
            ..Default::default()
        }
    }

    /// Poll until an event matches, failing after `WAIT`
    fn wait_for(observer: &mut Observer, pred: impl Fn(&Event) -> bool) -> Event {
        let deadline = Instant::now() + WAIT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            assert!(!left.is_zero(), "timed out waiting for event");
            if let Some(event) = observer.poll_timeout(left) {
                if pred(&event) {
                    return event;
                }
            }
        }
    }

    fn is_started(event: &Event) -> bool {
        matches!(event, Event::SimulationStarted { .. })
    }

    #[test]
    fn test_start_then_updates() {
        let server = RemoteServer::spawn(fast_settings()).unwrap();
        let mut observer = server.connect();
        assert!(observer.start(500.0, 400.0));

        let started = wait_for(&mut observer, is_started);
        assert_eq!(started.elements().unwrap().len(), 60);

        wait_for(&mut observer, |e| matches!(e, Event::UpdateSimulation { .. }));
        assert_eq!(observer.latest().unwrap().len(), 60);
        server.shutdown();
    }

    #[test]
    fn test_late_observer_joins_live_run() {
        let server = RemoteServer::spawn(fast_settings()).unwrap();
        let mut first = server.connect();
        first.start(500.0, 400.0);
        wait_for(&mut first, is_started);

        let mut second = server.connect();
        second.start(900.0, 900.0);
        let joined = wait_for(&mut second, is_started);

        // Same run: every element still lies in the first observer's arena
        for element in joined.elements().unwrap() {
            let reach = element.radius + 5.0;
            assert!(element.position.x <= 500.0 + reach);
            assert!(element.position.y <= 400.0 + reach);
        }
    }

    fn rejection(observer: &mut Observer) -> String {
        match observer.poll_timeout(WAIT) {
            Some(Event::CommandRejected { reason }) => reason,
            other => panic!("expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_rejected_commands_are_answered() {
        let server = RemoteServer::spawn(fast_settings()).unwrap();
        let mut observer = server.connect();
        let mut bystander = server.connect();

        assert!(observer.send_raw(r#"{"type":"start","width":300}"#));
        assert!(rejection(&mut observer).contains("malformed"));

        assert!(observer.start(0.0, 300.0));
        assert!(rejection(&mut observer).contains("arena"));

        observer.start(300.0, 300.0);
        wait_for(&mut observer, is_started);

        assert!(observer.send_raw(r#"{"type":"reset"}"#));
        let reason = wait_for(&mut observer, |e| matches!(e, Event::CommandRejected { .. }));
        assert_eq!(
            reason,
            Event::CommandRejected {
                reason: "reset is not supported by this authority".to_string()
            }
        );

        // Rejections only go to the sender
        assert!(
            bystander
                .poll()
                .iter()
                .all(|e| !matches!(e, Event::CommandRejected { .. }))
        );
    }

    #[test]
    fn test_disconnect_does_not_disturb_others() {
        let server = RemoteServer::spawn(fast_settings()).unwrap();
        let mut stays = server.connect();
        let leaves = server.connect();
        leaves.start(600.0, 600.0);
        drop(leaves);

        stays.start(600.0, 600.0);
        wait_for(&mut stays, is_started);
        for _ in 0..3 {
            wait_for(&mut stays, |e| matches!(e, Event::UpdateSimulation { .. }));
        }
        assert!(server.is_running());
    }

    #[test]
    fn test_convergence_and_restart_are_published() {
        let settings = Settings {
            kinds: vec![Kind::Paper],
            count: 4,
            ..fast_settings()
        };
        let server = RemoteServer::spawn(settings).unwrap();
        let mut observer = server.connect();
        observer.start(300.0, 300.0);
        wait_for(&mut observer, is_started);

        wait_for(&mut observer, |e| matches!(e, Event::SimulationComplete { .. }));
        assert_eq!(observer.last_winner(), Some(Kind::Paper));

        // The reseed after the delay is pushed to every observer
        wait_for(&mut observer, is_started);
        wait_for(&mut observer, |e| matches!(e, Event::SimulationComplete { .. }));
    }
}

//! Transport abstraction for authority events.
//!
//! Implementations:
//! - `DirectSink` / `Vec<Event>`: same-process delivery for the local authority
//! - `ChannelHub`: fan-out over in-proc channels for the remote authority

use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

use super::message::Event;

/// Observer handle issued by a remote authority
pub type ObserverId = u64;

/// Where an event is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every registered observer
    All,
    /// Only the observer that sent the command being answered
    Observer(ObserverId),
}

/// Minimal transport trait for authority events.
pub trait Transport {
    fn publish(&mut self, to: Recipient, event: &Event);
}

/// Calls a closure for every event, whatever the recipient
pub struct DirectSink<F: FnMut(&Event)>(pub F);

impl<F: FnMut(&Event)> Transport for DirectSink<F> {
    fn publish(&mut self, _to: Recipient, event: &Event) {
        (self.0)(event)
    }
}

/// Keeps every event in order
impl Transport for Vec<Event> {
    fn publish(&mut self, _to: Recipient, event: &Event) {
        self.push(event.clone());
    }
}

/// Fans encoded events out to registered observers.
///
/// An observer whose receiver has been dropped is pruned on the next failed
/// send; the authority never waits on one.
#[derive(Default)]
pub struct ChannelHub {
    observers: BTreeMap<ObserverId, Sender<String>>,
}

impl ChannelHub {
    pub fn register(&mut self, id: ObserverId, outbox: Sender<String>) {
        self.observers.insert(id, outbox);
        log::info!("Observer {} connected ({} total)", id, self.observers.len());
    }

    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.remove(&id).is_some();
        if removed {
            log::info!("Observer {} disconnected ({} left)", id, self.observers.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Transport for ChannelHub {
    fn publish(&mut self, to: Recipient, event: &Event) {
        let text = match event.encode() {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to encode event: {}", e);
                return;
            }
        };

        match to {
            Recipient::All => {
                self.observers.retain(|id, outbox| {
                    let alive = outbox.send(text.clone()).is_ok();
                    if !alive {
                        log::warn!("Observer {} went away, dropping it", id);
                    }
                    alive
                });
            }
            Recipient::Observer(id) => {
                let gone = self
                    .observers
                    .get(&id)
                    .is_some_and(|outbox| outbox.send(text).is_err());
                if gone {
                    log::warn!("Observer {} went away, dropping it", id);
                    self.observers.remove(&id);
                }
            }
        }
    }
}

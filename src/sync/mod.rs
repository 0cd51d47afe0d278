//! Authority/observer synchronization
//!
//! One authority owns and advances the live run; observers send commands and
//! render the snapshots they are sent. Two topologies:
//! - `local`: authority and renderer share a process, delivery is a direct call
//! - `remote`: authority runs on its own thread, observers connect over channels

pub mod authority;
pub mod local;
pub mod message;
pub mod remote;
pub mod transport;

pub use authority::{Authority, Snapshot, TickReport, Topology};
pub use local::LocalSession;
pub use message::{Command, ElementRecord, Event, Position, Velocity};
pub use remote::{Observer, RemoteServer};
pub use transport::{ChannelHub, DirectSink, ObserverId, Recipient, Transport};

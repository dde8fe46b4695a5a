//! Peer-to-peer networking core of the Ember node.
//!
//! The [`network::Server`] sits between the secure transport (consumed
//! through the [`host::Host`] contract) and the higher-level node services
//! (consensus, sync, mempool), which register application protocols and
//! message discovered peers. It schedules outbound dials under a
//! per-direction slot budget, keeps the connected peer set and its
//! bootstrap accounting consistent under concurrent transport
//! notifications, and fans peer lifecycle events out to subscribers.

pub mod config;
pub mod error;
pub mod host;
pub mod network;
pub mod secrets;
pub mod shutdown;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use config::{Config, NetworkConfig};
pub use error::NetworkError;
pub use network::{PeerEvent, PeerEventType, Server};
pub use types::{AddrInfo, Direction};

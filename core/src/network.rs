//! The peer-to-peer networking server and its building blocks.
pub mod bootnodes;
pub mod connections;
pub mod dial;
pub mod discovery;
pub mod event;
pub(crate) mod identity;
pub mod protocols;
pub mod server;
pub(crate) mod watch;

pub use dial::{DialPriority, DialQueue, DialTask};
pub use event::{PeerEvent, PeerEventType, Subscription};
pub use protocols::{ClientHandle, Protocol};
pub use server::{
	NetworkHandle, Server, DEFAULT_BUFFER_TIMEOUT, DEFAULT_JOIN_TIMEOUT, MIN_BOOTNODES,
	MIN_PEER_CONNECTIONS,
};

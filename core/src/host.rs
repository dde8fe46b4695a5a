//! Contract of the secure transport backing the networking server.
//!
//! The transport is built elsewhere; the core drives it exclusively through
//! [`Host`] and observes connection lifecycle through the [`HostEvent`]
//! channel handed over by the transport factory. Implementations must speak
//! an authenticated, encrypted channel (Noise or equivalent) keyed by the
//! identity from the secrets manager.
use async_trait::async_trait;
use color_eyre::Result;
use libp2p::identity::Keypair;
use libp2p::{Multiaddr, PeerId};
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::types::{AddrInfo, Connectedness, Direction};

/// Peerstore retention for addresses learned through the core.
pub const ADDRESS_TTL: Duration = Duration::from_secs(60 * 60);

/// A raw bidirectional stream multiplexed over a peer connection.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

pub type Stream = Box<dyn AsyncStream>;

/// Server-side handler invoked for every inbound stream of a protocol.
pub type StreamHandler = Arc<dyn Fn(PeerId, Stream) + Send + Sync>;

/// Connection lifecycle notifications fired from transport internals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
	ConnectionEstablished { peer_id: PeerId, direction: Direction },
	ConnectionClosed { peer_id: PeerId },
}

/// Builds the transport from the node identity, returning the host handle
/// and the channel its connection notifications arrive on.
pub type TransportFactory =
	Box<dyn FnOnce(Keypair) -> Result<(Arc<dyn Host>, UnboundedReceiver<HostEvent>)> + Send>;

#[automock]
#[async_trait]
pub trait Host: Send + Sync {
	fn id(&self) -> PeerId;

	fn addrs(&self) -> Vec<Multiaddr>;

	fn listen(&self, addr: Multiaddr) -> Result<()>;

	/// Dials the peer and completes the transport-level handshake. Blocks
	/// until the connection is established or fails.
	async fn connect(&self, addr: AddrInfo) -> Result<()>;

	async fn close_peer(&self, peer_id: PeerId) -> Result<()>;

	async fn close(&self) -> Result<()>;

	fn connectedness(&self, peer_id: PeerId) -> Connectedness;

	async fn new_stream(&self, peer_id: PeerId, protocol: &str) -> Result<Stream>;

	fn set_stream_handler(&self, protocol: &str, handler: StreamHandler);

	fn add_addr(&self, peer_id: PeerId, addr: Multiaddr, ttl: Duration);

	fn peer_info(&self, peer_id: PeerId) -> AddrInfo;

	fn protocols(&self, peer_id: PeerId) -> Vec<String>;
}

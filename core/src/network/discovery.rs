//! Contract of the external peer discovery service.
//!
//! Discovery keeps a Kademlia-style routing table and feeds peer candidates
//! into the dial queue; the core only consumes its routing callbacks and
//! forwards lifecycle events to it.
use async_trait::async_trait;
use color_eyre::Result;
use libp2p::PeerId;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::network::event::PeerEvent;
use crate::network::protocols::Protocol;
use crate::network::server::NetworkHandle;
use crate::types::AddrInfo;

/// Routing table membership changes, pumped into the dial queue by the
/// server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutingEvent {
	PeerAdded(PeerId),
	PeerRemoved(PeerId),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DiscoveryService: Send + Sync {
	async fn start(&self) -> Result<()>;

	async fn close(&self);

	/// Seeds the routing table with the bootstrap set.
	fn connect_to_bootnodes(&self, bootnodes: &[AddrInfo]);

	/// Receives every peer lifecycle event the server emits.
	fn handle_peer_event(&self, event: PeerEvent);
}

/// Everything the server wires up for a discovery implementation.
pub struct DiscoveryParts {
	pub service: Arc<dyn DiscoveryService>,
	pub routing_events: UnboundedReceiver<RoutingEvent>,
	/// The discovery RPC protocol to expose, if the implementation has one.
	pub protocol: Option<(String, Arc<dyn Protocol>)>,
}

/// Builds the discovery service against a non-owning server handle.
pub type DiscoveryFactory = Box<dyn FnOnce(NetworkHandle) -> Result<DiscoveryParts> + Send>;

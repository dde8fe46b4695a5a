//! Networking server configuration.
use libp2p::{multiaddr::Protocol, Multiaddr};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use crate::host::TransportFactory;
use crate::network::discovery::DiscoveryFactory;
use crate::secrets::SecretsManager;
use crate::telemetry::Metrics;

pub const DEFAULT_PORT: u16 = 1478;

/// Reserved outbound/inbound dial ratio; accepted but not yet enforced.
pub const DEFAULT_DIAL_RATIO: f64 = 0.2;

pub const DEFAULT_MAX_INBOUND_PEERS: i64 = 32;
pub const DEFAULT_MAX_OUTBOUND_PEERS: i64 = 8;

/// Chain-level networking parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
	/// Chain identifier validated during the identity handshake (default: 100)
	pub chain_id: u64,
	/// Bootstrap peers as `/p2p`-suffixed multiaddress strings. Required
	/// unless discovery is disabled.
	pub bootnodes: Option<Vec<String>>,
}

impl Default for ChainConfig {
	fn default() -> Self {
		Self {
			chain_id: 100,
			bootnodes: None,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	/// TCP listener address (default: 0.0.0.0:1478)
	pub listen_addr: SocketAddr,
	/// If set, the advertised address is rewritten to `nat_addr` with the
	/// listener port.
	pub nat_addr: Option<IpAddr>,
	/// If set (and `nat_addr` is not), replaces the advertised addresses.
	pub dns: Option<Multiaddr>,
	/// Inbound connection slot budget (default: 32)
	pub max_inbound_peers: i64,
	/// Outbound connection slot budget (default: 8)
	pub max_outbound_peers: i64,
	/// Disables peer discovery and bootnode handling (default: false)
	pub no_discover: bool,
	/// Reserved dial/accept ratio policy knob; parsed and kept for a future
	/// outbound/inbound bound, not enforced anywhere yet (default: 0.2)
	pub dial_ratio: f64,
	/// Allows the peer maintainer to fall back to the peerstore when
	/// discovery is disabled. Requires a persistent peerstore and is
	/// currently a no-op (default: false)
	pub peerstore_top_up: bool,
	#[serde(flatten)]
	pub chain: ChainConfig,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
			nat_addr: None,
			dns: None,
			max_inbound_peers: DEFAULT_MAX_INBOUND_PEERS,
			max_outbound_peers: DEFAULT_MAX_OUTBOUND_PEERS,
			no_discover: false,
			dial_ratio: DEFAULT_DIAL_RATIO,
			peerstore_top_up: false,
			chain: ChainConfig::default(),
		}
	}
}

impl NetworkConfig {
	/// The multiaddress the transport binds to.
	pub fn listen_multiaddr(&self) -> Multiaddr {
		Multiaddr::empty()
			.with(Protocol::from(self.listen_addr.ip()))
			.with(Protocol::Tcp(self.listen_addr.port()))
	}

	/// Applies the NAT/DNS advertisement policy to the transport's own
	/// listening addresses.
	pub fn advertised_addrs(&self, addrs: Vec<Multiaddr>) -> Vec<Multiaddr> {
		if let Some(nat_addr) = self.nat_addr {
			return vec![Multiaddr::empty()
				.with(Protocol::from(nat_addr))
				.with(Protocol::Tcp(self.listen_addr.port()))];
		}

		if let Some(dns) = &self.dns {
			return vec![dns.clone()];
		}

		addrs
	}
}

/// Full server configuration: the serializable options plus the runtime
/// collaborators the core drives.
pub struct Config {
	pub network: NetworkConfig,
	pub secrets_manager: Arc<dyn SecretsManager>,
	pub metrics: Arc<dyn Metrics>,
	pub transport: TransportFactory,
	pub discovery: Option<DiscoveryFactory>,
}

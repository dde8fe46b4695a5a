//! Shared networking structs and enums.
use color_eyre::{eyre::eyre, Report, Result};
use libp2p::{multiaddr::Protocol, Multiaddr, PeerId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Direction of a connection, from the local node's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
	Inbound,
	Outbound,
}

impl Display for Direction {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Direction::Inbound => write!(f, "inbound"),
			Direction::Outbound => write!(f, "outbound"),
		}
	}
}

/// Transport-level connectivity of a remote peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectedness {
	NotConnected,
	Connected,
	CanConnect,
	CannotConnect,
}

/// A peer identity together with its known dialable addresses.
///
/// The string form is the `/p2p`-suffixed multiaddress, e.g.
/// `/ip4/127.0.0.1/tcp/1478/p2p/12D3Koo...`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddrInfo {
	pub peer_id: PeerId,
	pub addrs: Vec<Multiaddr>,
}

impl AddrInfo {
	pub fn new(peer_id: PeerId, addrs: Vec<Multiaddr>) -> Self {
		AddrInfo { peer_id, addrs }
	}
}

impl FromStr for AddrInfo {
	type Err = Report;

	fn from_str(s: &str) -> Result<Self> {
		let addr: Multiaddr = s.parse()?;

		let mut peer_id = None;
		let base: Multiaddr = addr
			.iter()
			.filter(|protocol| match protocol {
				Protocol::P2p(id) => {
					peer_id = Some(*id);
					false
				},
				_ => true,
			})
			.collect();

		let Some(peer_id) = peer_id else {
			return Err(eyre!("multiaddress {s} is missing a /p2p peer identity"));
		};

		Ok(AddrInfo {
			peer_id,
			addrs: vec![base],
		})
	}
}

impl TryFrom<String> for AddrInfo {
	type Error = Report;

	fn try_from(value: String) -> Result<Self> {
		value.parse()
	}
}

impl From<AddrInfo> for String {
	fn from(value: AddrInfo) -> Self {
		value.to_string()
	}
}

impl Display for AddrInfo {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.addrs.first() {
			Some(addr) => write!(f, "{addr}/p2p/{}", self.peer_id),
			None => write!(f, "/p2p/{}", self.peer_id),
		}
	}
}

/// A member of the connected peer set.
#[derive(Clone, Debug)]
pub struct PeerRecord {
	pub info: AddrInfo,
	pub direction: Direction,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn addr_info_round_trip() {
		let addr = "/ip4/159.73.143.3/tcp/1478/p2p/12D3KooWBmwkafWE2fqGMvSqyN9BV5wM675VcDJHDMAXGEHf5GwM";
		let info: AddrInfo = addr.parse().unwrap();
		assert_eq!(
			info.addrs,
			vec!["/ip4/159.73.143.3/tcp/1478".parse::<Multiaddr>().unwrap()]
		);
		assert_eq!(info.to_string(), addr);

		let reparsed: AddrInfo = info.to_string().parse().unwrap();
		assert_eq!(reparsed, info);
	}

	#[test]
	fn addr_info_requires_peer_identity() {
		assert!("/ip4/127.0.0.1/tcp/1478".parse::<AddrInfo>().is_err());
		assert!("not a multiaddress".parse::<AddrInfo>().is_err());
	}

	#[test]
	fn direction_display() {
		assert_eq!(Direction::Inbound.to_string(), "inbound");
		assert_eq!(Direction::Outbound.to_string(), "outbound");
	}
}

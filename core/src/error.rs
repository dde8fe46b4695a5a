use libp2p::PeerId;
use thiserror::Error;

/// Error kinds raised by the networking core.
///
/// Configuration errors are fatal at startup and surface from
/// [`Server::new`](crate::network::Server::new) and
/// [`Server::start`](crate::network::Server::start); transport runtime
/// failures are reported through peer events and logs instead.
#[derive(Debug, Error)]
pub enum NetworkError {
	#[error("no bootnodes specified")]
	NoBootnodes,

	#[error("minimum 1 bootnode is required")]
	MinBootnodes,

	#[error("timeout waiting for peer {remote}, local peer {local}")]
	JoinTimeout { local: PeerId, remote: PeerId },

	#[error("protocol not found: {0}")]
	ProtocolNotFound(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn join_timeout_names_both_peers() {
		let local = PeerId::random();
		let remote = PeerId::random();
		let message = NetworkError::JoinTimeout { local, remote }.to_string();
		assert!(message.contains(&local.to_string()));
		assert!(message.contains(&remote.to_string()));
	}
}

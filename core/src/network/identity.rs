//! Identity handshake run before a peer joins the connected set.
//!
//! Both sides of a fresh transport connection exchange a status frame over
//! a dedicated stream; only once chain ids match does the peer become a
//! registered member. Connections that arrive with no free slot survive
//! only if they were marked as temporary dials beforehand.
use codec::{Decode, Encode};
use color_eyre::{eyre::eyre, Result};
use libp2p::PeerId;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::host::{Stream, StreamHandler};
use crate::network::event::PeerEventType;
use crate::network::protocols::{ClientHandle, Protocol};
use crate::network::server::{NetworkHandle, Server};
use crate::types::Direction;

pub(crate) const PROTOCOL_ID: &str = "/ember/id/1.0.0";

/// Upper bound on an incoming status frame.
const MAX_STATUS_FRAME_SIZE: u32 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub(crate) struct Status {
	pub chain_id: u64,
	pub temporary_dial: bool,
}

/// Registers the identity protocol with the server.
pub(crate) fn setup(server: &Server) {
	let protocol = IdentityProtocol {
		handle: server.handle(),
		chain_id: server.chain_id(),
	};
	server.register_protocol(PROTOCOL_ID, Arc::new(protocol));
}

/// Entry point for transport connection notifications; failures tear the
/// connection down instead of bubbling.
pub(crate) async fn handle_connected(server: Server, peer_id: PeerId, direction: Direction) {
	if let Err(error) = handshake(&server, peer_id, direction).await {
		debug!(peer = %peer_id, %direction, "identity handshake failed: {error:#}");
		server.disconnect(peer_id, "identity handshake failed").await;
	}
}

async fn handshake(server: &Server, peer_id: PeerId, direction: Direction) -> Result<()> {
	if server.has_peer(peer_id) {
		return Ok(());
	}

	let temporary_dial = server.has_temporary_dial(peer_id);
	if !server.has_free_connection_slot(direction) && !temporary_dial {
		return Err(eyre!("no available connection slots"));
	}

	server.update_pending_conn_count(1, direction);
	let exchange = exchange_status(server, peer_id).await;
	server.update_pending_conn_count(-1, direction);

	let status = exchange?;
	if status.chain_id != server.chain_id() {
		return Err(eyre!(
			"peer {peer_id} is on a different chain: {} != {}",
			status.chain_id,
			server.chain_id()
		));
	}

	// temporary dials, locally marked or remotely flagged, complete the
	// hello but never join the peer set
	if temporary_dial || status.temporary_dial {
		server.fetch_and_set_temporary_dial(peer_id, true);
		server.emit_event(peer_id, PeerEventType::DialCompleted);
		return Ok(());
	}

	server.add_peer(peer_id, direction);
	Ok(())
}

async fn exchange_status(server: &Server, peer_id: PeerId) -> Result<Status> {
	let mut stream = server.host().new_stream(peer_id, PROTOCOL_ID).await?;

	let own = Status {
		chain_id: server.chain_id(),
		temporary_dial: server.has_temporary_dial(peer_id),
	};
	write_status(&mut stream, &own).await?;
	read_status(&mut stream).await
}

struct IdentityProtocol {
	handle: NetworkHandle,
	chain_id: u64,
}

impl Protocol for IdentityProtocol {
	fn client(&self, stream: Stream) -> ClientHandle {
		Box::new(stream)
	}

	fn handler(&self) -> StreamHandler {
		let handle = self.handle.clone();
		let chain_id = self.chain_id;

		Arc::new(move |peer_id, stream| {
			let handle = handle.clone();
			tokio::spawn(async move {
				if let Err(error) = serve_stream(stream, &handle, chain_id, peer_id).await {
					debug!(peer = %peer_id, "identity exchange failed: {error:#}");
					handle.disconnect(peer_id, "identity handshake failed").await;
				}
			});
		})
	}
}

/// Responder side of the hello exchange.
pub(crate) async fn serve_stream(
	mut stream: Stream,
	handle: &NetworkHandle,
	chain_id: u64,
	peer_id: PeerId,
) -> Result<()> {
	let remote = read_status(&mut stream).await?;

	let own = Status {
		chain_id,
		temporary_dial: handle.has_temporary_dial(peer_id),
	};
	write_status(&mut stream, &own).await?;

	if remote.chain_id != chain_id {
		return Err(eyre!(
			"peer {peer_id} is on a different chain: {} != {chain_id}",
			remote.chain_id
		));
	}

	Ok(())
}

pub(crate) async fn write_status<S>(stream: &mut S, status: &Status) -> Result<()>
where
	S: AsyncWriteExt + Unpin,
{
	let frame = status.encode();
	stream.write_u32(frame.len() as u32).await?;
	stream.write_all(&frame).await?;
	stream.flush().await?;
	Ok(())
}

pub(crate) async fn read_status<S>(stream: &mut S) -> Result<Status>
where
	S: AsyncReadExt + Unpin,
{
	let len = stream.read_u32().await?;
	if len > MAX_STATUS_FRAME_SIZE {
		return Err(eyre!("status frame too large: {len} bytes"));
	}

	let mut frame = vec![0u8; len as usize];
	stream.read_exact(&mut frame).await?;
	Status::decode(&mut &frame[..]).map_err(|error| eyre!("malformed status frame: {error}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn status_frame_round_trip() {
		let (mut local, mut remote) = tokio::io::duplex(256);
		let status = Status {
			chain_id: 100,
			temporary_dial: true,
		};

		write_status(&mut local, &status).await.unwrap();
		assert_eq!(read_status(&mut remote).await.unwrap(), status);
	}

	#[tokio::test]
	async fn oversized_frames_are_rejected() {
		let (mut local, mut remote) = tokio::io::duplex(256);
		local.write_u32(MAX_STATUS_FRAME_SIZE + 1).await.unwrap();
		assert!(read_status(&mut remote).await.is_err());
	}

	#[tokio::test]
	async fn malformed_frames_are_rejected() {
		let (mut local, mut remote) = tokio::io::duplex(256);
		local.write_u32(1).await.unwrap();
		local.write_all(&[0xff]).await.unwrap();
		// a one-byte frame cannot carry the status
		assert!(read_status(&mut remote).await.is_err());
	}
}

//! Application protocol registry.
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::host::{Stream, StreamHandler};

/// Opaque client-side handle produced by a protocol's stream wrapper;
/// callers downcast to the protocol's concrete client type.
pub type ClientHandle = Box<dyn Any + Send>;

/// An application protocol multiplexed over the transport: a server-side
/// stream handler and a client-side stream wrapper.
pub trait Protocol: Send + Sync {
	/// Wraps a fresh outbound stream into the protocol's client handle.
	fn client(&self, stream: Stream) -> ClientHandle;

	/// The handler invoked for every inbound stream of this protocol.
	fn handler(&self) -> StreamHandler;
}

/// Registered protocols, keyed by protocol id.
#[derive(Default)]
pub(crate) struct ProtocolRegistry {
	protocols: Mutex<HashMap<String, Arc<dyn Protocol>>>,
}

impl ProtocolRegistry {
	pub(crate) fn register(&self, protocol_id: &str, protocol: Arc<dyn Protocol>) {
		self.protocols
			.lock()
			.unwrap()
			.insert(protocol_id.to_string(), protocol);
	}

	/// Looks the protocol up, releasing the registry lock before returning
	/// so callers can open streams without holding it.
	pub(crate) fn lookup(&self, protocol_id: &str) -> Option<Arc<dyn Protocol>> {
		self.protocols.lock().unwrap().get(protocol_id).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use libp2p::PeerId;

	struct EchoClient;

	struct EchoProtocol;

	impl Protocol for EchoProtocol {
		fn client(&self, _stream: Stream) -> ClientHandle {
			Box::new(EchoClient)
		}

		fn handler(&self) -> StreamHandler {
			Arc::new(|_peer_id: PeerId, _stream: Stream| {})
		}
	}

	#[tokio::test]
	async fn register_and_lookup() {
		let registry = ProtocolRegistry::default();
		registry.register("/echo/1.0.0", Arc::new(EchoProtocol));

		let protocol = registry.lookup("/echo/1.0.0").unwrap();
		let (stream, _remote) = tokio::io::duplex(64);
		let handle = protocol.client(Box::new(stream));
		assert!(handle.downcast::<EchoClient>().is_ok());

		assert!(registry.lookup("/missing/1.0.0").is_none());
	}
}

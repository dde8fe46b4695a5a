//! Bootstrap peer set.
use libp2p::PeerId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::AddrInfo;

/// The node's bootstrap peers, frozen at startup.
///
/// Only the connected-count moves after construction; the list and the
/// id lookup map stay read-only for the lifetime of the server.
#[derive(Default)]
pub struct BootnodeSet {
	bootnodes: Vec<AddrInfo>,
	by_id: HashMap<PeerId, AddrInfo>,
	connected_count: AtomicI64,
}

impl BootnodeSet {
	pub fn new(bootnodes: Vec<AddrInfo>) -> Self {
		let by_id = bootnodes
			.iter()
			.map(|bootnode| (bootnode.peer_id, bootnode.clone()))
			.collect();

		Self {
			bootnodes,
			by_id,
			connected_count: AtomicI64::new(0),
		}
	}

	pub fn is_bootnode(&self, peer_id: &PeerId) -> bool {
		self.by_id.contains_key(peer_id)
	}

	pub fn get_all(&self) -> &[AddrInfo] {
		&self.bootnodes
	}

	pub fn has_any(&self) -> bool {
		!self.bootnodes.is_empty()
	}

	pub fn len(&self) -> usize {
		self.bootnodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bootnodes.is_empty()
	}

	pub fn connected_count(&self) -> i64 {
		self.connected_count.load(Ordering::SeqCst)
	}

	pub fn increase_connected(&self, delta: i64) {
		self.connected_count.fetch_add(delta, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bootnode() -> AddrInfo {
		AddrInfo::new(PeerId::random(), vec!["/ip4/127.0.0.1/tcp/1478".parse().unwrap()])
	}

	#[test]
	fn membership_and_counting() {
		let first = bootnode();
		let second = bootnode();
		let set = BootnodeSet::new(vec![first.clone(), second.clone()]);

		assert!(set.has_any());
		assert_eq!(set.len(), 2);
		assert!(set.is_bootnode(&first.peer_id));
		assert!(set.is_bootnode(&second.peer_id));
		assert!(!set.is_bootnode(&PeerId::random()));

		assert_eq!(set.connected_count(), 0);
		set.increase_connected(1);
		set.increase_connected(1);
		assert_eq!(set.connected_count(), 2);
		set.increase_connected(-1);
		assert_eq!(set.connected_count(), 1);
	}

	#[test]
	fn empty_set() {
		let set = BootnodeSet::default();
		assert!(!set.has_any());
		assert!(set.is_empty());
		assert_eq!(set.connected_count(), 0);
	}
}

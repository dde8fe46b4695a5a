//! Priority queue of pending outbound dials.
use libp2p::PeerId;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::types::AddrInfo;

/// Scheduling class of a dial. Smaller values dial first; insertion order
/// breaks ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DialPriority {
	/// An explicit join request.
	RequestedDial = 0,
	/// Discovery or bootstrap top-up traffic.
	RandomDial = 1,
}

#[derive(Clone, Debug)]
pub struct DialTask {
	pub addr_info: AddrInfo,
	pub priority: DialPriority,
	seq: u64,
}

/// Heap entry; the authoritative task state lives in the per-peer index, so
/// entries invalidated by a merge or a cancel are skipped on pop.
#[derive(PartialEq, Eq)]
struct HeapItem {
	priority: DialPriority,
	seq: u64,
	peer_id: PeerId,
}

impl Ord for HeapItem {
	fn cmp(&self, other: &Self) -> CmpOrdering {
		// BinaryHeap is a max-heap; invert so the smallest
		// (priority, seq) pops first
		(other.priority, other.seq).cmp(&(self.priority, self.seq))
	}
}

impl PartialOrd for HeapItem {
	fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
		Some(self.cmp(other))
	}
}

#[derive(Default)]
struct Inner {
	heap: BinaryHeap<HeapItem>,
	tasks: HashMap<PeerId, DialTask>,
	next_seq: u64,
	closed: bool,
}

/// Dial tasks keyed by peer identity, ordered by (priority, insertion).
///
/// A peer appears at most once: re-adding an enqueued peer merges into the
/// existing task, keeping the stricter priority and refreshing the address
/// list.
#[derive(Default)]
pub struct DialQueue {
	inner: Mutex<Inner>,
	notify: Notify,
}

impl DialQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, addr_info: AddrInfo, priority: DialPriority) {
		{
			let mut guard = self.inner.lock().unwrap();
			let inner = &mut *guard;
			if inner.closed {
				return;
			}

			let peer_id = addr_info.peer_id;
			match inner.tasks.get_mut(&peer_id) {
				Some(task) => {
					task.addr_info = addr_info;
					if priority < task.priority {
						task.priority = priority;
						inner.heap.push(HeapItem {
							priority,
							seq: task.seq,
							peer_id,
						});
					}
				},
				None => {
					let seq = inner.next_seq;
					inner.next_seq += 1;
					inner.tasks.insert(
						peer_id,
						DialTask {
							addr_info,
							priority,
							seq,
						},
					);
					inner.heap.push(HeapItem {
						priority,
						seq,
						peer_id,
					});
				},
			}
		}

		self.notify.notify_one();
	}

	/// Waits for the next task. Returns `None` once the queue is closed.
	pub async fn pop(&self) -> Option<DialTask> {
		loop {
			let notified = self.notify.notified();

			{
				let mut guard = self.inner.lock().unwrap();
				let inner = &mut *guard;
				if inner.closed {
					return None;
				}

				while let Some(item) = inner.heap.pop() {
					let current = match inner.tasks.get(&item.peer_id) {
						Some(task) => task,
						// cancelled while enqueued
						None => continue,
					};
					// a merge may have re-pushed this peer with a stricter
					// priority; only the entry matching the live task wins
					if current.seq != item.seq || current.priority != item.priority {
						continue;
					}

					return inner.tasks.remove(&item.peer_id);
				}
			}

			notified.await;
		}
	}

	/// Removes any enqueued task for the peer.
	pub fn del(&self, peer_id: &PeerId) {
		self.inner.lock().unwrap().tasks.remove(peer_id);
	}

	/// Unblocks pending and future `pop` calls with the closed sentinel.
	pub fn close(&self) {
		self.inner.lock().unwrap().closed = true;
		self.notify.notify_waiters();
		self.notify.notify_one();
	}

	pub fn len(&self) -> usize {
		self.inner.lock().unwrap().tasks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, peer_id: &PeerId) -> bool {
		self.inner.lock().unwrap().tasks.contains_key(peer_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	fn task_for(peer_id: PeerId, port: u16) -> AddrInfo {
		AddrInfo::new(
			peer_id,
			vec![format!("/ip4/127.0.0.1/tcp/{port}").parse().unwrap()],
		)
	}

	#[tokio::test]
	async fn requested_dials_pop_before_random_ones() {
		let queue = DialQueue::new();
		let random = PeerId::random();
		let requested = PeerId::random();

		queue.add(task_for(random, 1), DialPriority::RandomDial);
		queue.add(task_for(requested, 2), DialPriority::RequestedDial);

		assert_eq!(queue.pop().await.unwrap().addr_info.peer_id, requested);
		assert_eq!(queue.pop().await.unwrap().addr_info.peer_id, random);
	}

	#[tokio::test]
	async fn fifo_within_a_priority() {
		let queue = DialQueue::new();
		let peers: Vec<PeerId> = (0..4).map(|_| PeerId::random()).collect();
		for (i, peer) in peers.iter().enumerate() {
			queue.add(task_for(*peer, i as u16 + 1), DialPriority::RandomDial);
		}

		for peer in &peers {
			assert_eq!(queue.pop().await.unwrap().addr_info.peer_id, *peer);
		}
	}

	#[tokio::test]
	async fn merge_keeps_the_stricter_priority_and_fresh_addrs() {
		let queue = DialQueue::new();
		let peer = PeerId::random();
		let other = PeerId::random();

		queue.add(task_for(other, 1), DialPriority::RandomDial);
		queue.add(task_for(peer, 2), DialPriority::RandomDial);
		queue.add(task_for(peer, 3), DialPriority::RequestedDial);
		assert_eq!(queue.len(), 2);

		let first = queue.pop().await.unwrap();
		assert_eq!(first.addr_info.peer_id, peer);
		assert_eq!(first.priority, DialPriority::RequestedDial);
		assert_eq!(first.addr_info, task_for(peer, 3));

		assert_eq!(queue.pop().await.unwrap().addr_info.peer_id, other);
		assert!(queue.is_empty());
	}

	#[tokio::test]
	async fn downgrade_attempts_are_ignored() {
		let queue = DialQueue::new();
		let peer = PeerId::random();

		queue.add(task_for(peer, 1), DialPriority::RequestedDial);
		queue.add(task_for(peer, 2), DialPriority::RandomDial);

		let task = queue.pop().await.unwrap();
		assert_eq!(task.priority, DialPriority::RequestedDial);
		// the merge still refreshed the address list
		assert_eq!(task.addr_info, task_for(peer, 2));
	}

	#[tokio::test]
	async fn del_cancels_an_enqueued_peer() {
		let queue = DialQueue::new();
		let cancelled = PeerId::random();
		let kept = PeerId::random();

		queue.add(task_for(cancelled, 1), DialPriority::RequestedDial);
		queue.add(task_for(kept, 2), DialPriority::RandomDial);
		queue.del(&cancelled);

		assert_eq!(queue.pop().await.unwrap().addr_info.peer_id, kept);
		assert!(queue.is_empty());
	}

	#[tokio::test]
	async fn pop_blocks_until_an_add() {
		let queue = std::sync::Arc::new(DialQueue::new());
		let popper = queue.clone();
		let handle = tokio::spawn(async move { popper.pop().await });

		tokio::time::sleep(Duration::from_millis(20)).await;
		assert!(!handle.is_finished());

		let peer = PeerId::random();
		queue.add(task_for(peer, 1), DialPriority::RandomDial);
		let task = handle.await.unwrap().unwrap();
		assert_eq!(task.addr_info.peer_id, peer);
	}

	#[tokio::test]
	async fn close_wakes_poppers_forever() {
		let queue = std::sync::Arc::new(DialQueue::new());
		let popper = queue.clone();
		let handle = tokio::spawn(async move { popper.pop().await });

		tokio::time::sleep(Duration::from_millis(10)).await;
		queue.close();
		assert!(handle.await.unwrap().is_none());

		// adds after close are ignored and pop stays closed
		queue.add(task_for(PeerId::random(), 1), DialPriority::RequestedDial);
		assert!(queue.is_empty());
		assert!(queue.pop().await.is_none());
	}
}

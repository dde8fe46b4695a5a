//! One-shot completion slots for callers waiting on a dial outcome.
use color_eyre::Result;
use libp2p::PeerId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::NetworkError;

/// Per-peer join watchers. A watcher resolves when a qualifying lifecycle
/// event arrives for its peer, or with a timeout error otherwise.
///
/// Registering a second watcher for the same peer replaces the first; the
/// replaced waiter resolves with the timeout error.
#[derive(Default)]
pub(crate) struct JoinWatchers {
	watchers: Mutex<HashMap<PeerId, oneshot::Sender<()>>>,
}

impl JoinWatchers {
	/// Waits up to `timeout` for the peer's dial outcome.
	pub(crate) async fn watch(
		&self,
		local_id: PeerId,
		peer_id: PeerId,
		timeout: Duration,
	) -> Result<()> {
		let receiver = self.register(peer_id);

		let timed_out = NetworkError::JoinTimeout {
			local: local_id,
			remote: peer_id,
		};

		match tokio::time::timeout(timeout, receiver).await {
			Ok(Ok(())) => Ok(()),
			// the slot was replaced by a newer watcher; it owns the map
			// entry now, so there is nothing to deregister
			Ok(Err(_)) => Err(timed_out.into()),
			Err(_) => {
				self.deregister(&peer_id);
				Err(timed_out.into())
			},
		}
	}

	/// Resolves the watcher for the peer, if any.
	pub(crate) fn complete(&self, peer_id: &PeerId) {
		if let Some(sender) = self.watchers.lock().unwrap().remove(peer_id) {
			let _ = sender.send(());
		}
	}

	fn register(&self, peer_id: PeerId) -> oneshot::Receiver<()> {
		let (sender, receiver) = oneshot::channel();
		self.watchers.lock().unwrap().insert(peer_id, sender);
		receiver
	}

	fn deregister(&self, peer_id: &PeerId) {
		self.watchers.lock().unwrap().remove(peer_id);
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.watchers.lock().unwrap().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	#[tokio::test]
	async fn completion_resolves_the_watcher() {
		let watchers = Arc::new(JoinWatchers::default());
		let local = PeerId::random();
		let peer = PeerId::random();

		let waiting = watchers.clone();
		let handle = tokio::spawn(async move {
			waiting.watch(local, peer, Duration::from_secs(5)).await
		});

		tokio::time::sleep(Duration::from_millis(10)).await;
		watchers.complete(&peer);

		assert!(handle.await.unwrap().is_ok());
		assert_eq!(watchers.len(), 0);
	}

	#[tokio::test]
	async fn timeout_carries_both_peer_ids() {
		let watchers = JoinWatchers::default();
		let local = PeerId::random();
		let peer = PeerId::random();

		let result = watchers.watch(local, peer, Duration::from_millis(20)).await;
		let report = result.unwrap_err();
		let error = report.downcast_ref::<NetworkError>().unwrap();
		assert!(matches!(
			error,
			NetworkError::JoinTimeout { local: l, remote: r } if *l == local && *r == peer
		));
		assert_eq!(watchers.len(), 0);
	}

	#[tokio::test]
	async fn second_watch_replaces_the_first() {
		let watchers = Arc::new(JoinWatchers::default());
		let local = PeerId::random();
		let peer = PeerId::random();

		let replaced = watchers.clone();
		let first = tokio::spawn(async move {
			replaced.watch(local, peer, Duration::from_secs(5)).await
		});
		tokio::time::sleep(Duration::from_millis(10)).await;

		let current = watchers.clone();
		let second = tokio::spawn(async move {
			current.watch(local, peer, Duration::from_secs(5)).await
		});
		tokio::time::sleep(Duration::from_millis(10)).await;

		// the replaced waiter resolves as timed out right away
		let first_result = first.await.unwrap();
		assert!(first_result
			.unwrap_err()
			.downcast_ref::<NetworkError>()
			.is_some());

		watchers.complete(&peer);
		assert!(second.await.unwrap().is_ok());
	}

	#[tokio::test]
	async fn complete_without_watcher_is_a_no_op() {
		let watchers = JoinWatchers::default();
		watchers.complete(&PeerId::random());
	}
}

//! Peer lifecycle events and the in-process bus carrying them.
use libp2p::PeerId;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::telemetry::{MetricCounter, Metrics};

/// Ring capacity per subscriber; a lagging subscriber loses the oldest
/// events instead of blocking the emitter.
const SUBSCRIPTION_BUFFER_SIZE: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerEventType {
	AddedToDialQueue,
	Connected,
	Disconnected,
	FailedToConnect,
	AlreadyConnected,
	DialCompleted,
}

impl Display for PeerEventType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let name = match self {
			PeerEventType::AddedToDialQueue => "added to dial queue",
			PeerEventType::Connected => "connected",
			PeerEventType::Disconnected => "disconnected",
			PeerEventType::FailedToConnect => "failed to connect",
			PeerEventType::AlreadyConnected => "already connected",
			PeerEventType::DialCompleted => "dial completed",
		};
		f.write_str(name)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerEvent {
	pub peer_id: PeerId,
	pub event_type: PeerEventType,
}

/// Many-to-many fan-out of [`PeerEvent`]s.
///
/// Emission never blocks on subscribers. Each subscriber observes events in
/// publish order; slow subscribers drop their oldest buffered events, which
/// is logged once per subscription and counted in telemetry.
pub(crate) struct EventBus {
	sender: broadcast::Sender<PeerEvent>,
	metrics: Arc<dyn Metrics>,
}

impl EventBus {
	pub(crate) fn new(metrics: Arc<dyn Metrics>) -> Self {
		let (sender, _) = broadcast::channel(SUBSCRIPTION_BUFFER_SIZE);
		Self { sender, metrics }
	}

	pub(crate) fn emit(&self, event: PeerEvent) {
		self.metrics.count(MetricCounter::PeerEvent);
		if self.sender.send(event).is_err() {
			trace!(peer = %event.peer_id, event = %event.event_type, "no active event subscribers");
		}
	}

	pub(crate) fn subscribe(&self) -> Subscription {
		Subscription {
			receiver: self.sender.subscribe(),
			metrics: self.metrics.clone(),
			lag_reported: false,
		}
	}
}

/// A typed receiver over the event bus.
pub struct Subscription {
	receiver: broadcast::Receiver<PeerEvent>,
	metrics: Arc<dyn Metrics>,
	lag_reported: bool,
}

impl Subscription {
	/// The next event, in publish order. Returns `None` once the bus is
	/// gone. Dropped events are skipped, not surfaced as errors.
	pub async fn next(&mut self) -> Option<PeerEvent> {
		loop {
			match self.receiver.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(dropped)) => {
					self.metrics
						.count_n(MetricCounter::DroppedSubscriptionEvents, dropped);
					if !self.lag_reported {
						warn!(dropped, "subscription is lagging, dropping oldest peer events");
						self.lag_reported = true;
					}
				},
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::telemetry::NoopMetrics;

	fn bus() -> EventBus {
		EventBus::new(Arc::new(NoopMetrics))
	}

	fn event(peer_id: PeerId, event_type: PeerEventType) -> PeerEvent {
		PeerEvent {
			peer_id,
			event_type,
		}
	}

	#[tokio::test]
	async fn subscribers_see_events_in_publish_order() {
		let bus = bus();
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		let peer = PeerId::random();
		let sequence = [
			PeerEventType::AddedToDialQueue,
			PeerEventType::Connected,
			PeerEventType::Disconnected,
		];
		for event_type in sequence {
			bus.emit(event(peer, event_type));
		}

		for subscription in [&mut first, &mut second] {
			for event_type in sequence {
				assert_eq!(subscription.next().await, Some(event(peer, event_type)));
			}
		}
	}

	#[tokio::test]
	async fn emitting_without_subscribers_does_not_block() {
		let bus = bus();
		bus.emit(event(PeerId::random(), PeerEventType::Connected));
	}

	#[tokio::test]
	async fn lagging_subscriber_drops_oldest_and_recovers() {
		let bus = bus();
		let mut subscription = bus.subscribe();

		let peer = PeerId::random();
		let total = SUBSCRIPTION_BUFFER_SIZE + 16;
		for _ in 0..total {
			bus.emit(event(peer, PeerEventType::Connected));
		}
		bus.emit(event(peer, PeerEventType::Disconnected));

		// the oldest events are gone but the stream keeps flowing
		let first = subscription.next().await.unwrap();
		assert_eq!(first.event_type, PeerEventType::Connected);

		let mut seen = 1;
		loop {
			let event = subscription.next().await.unwrap();
			seen += 1;
			if event.event_type == PeerEventType::Disconnected {
				break;
			}
		}
		assert!(seen <= SUBSCRIPTION_BUFFER_SIZE + 1);
	}

	#[tokio::test]
	async fn subscription_ends_when_the_bus_is_dropped() {
		let bus = bus();
		let mut subscription = bus.subscribe();
		drop(bus);
		assert_eq!(subscription.next().await, None);
	}
}

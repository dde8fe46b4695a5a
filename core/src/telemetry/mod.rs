//! Metric taxonomy and the sink the networking server reports into.
use mockall::automock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricCounter {
	PeerEvent,
	DroppedSubscriptionEvents,
	FailedDials,
}

pub trait MetricName {
	fn name(&self) -> &'static str;
}

impl MetricName for MetricCounter {
	fn name(&self) -> &'static str {
		use MetricCounter::*;
		match self {
			PeerEvent => "ember.network.peer_event",
			DroppedSubscriptionEvents => "ember.network.dropped_subscription_events",
			FailedDials => "ember.network.failed_dials",
		}
	}
}

/// Gauge snapshots refreshed by the peer registry and connection counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
	TotalPeerCount(usize),
	InboundConnections(i64),
	OutboundConnections(i64),
	PendingInboundConnections(i64),
	PendingOutboundConnections(i64),
}

impl MetricName for MetricValue {
	fn name(&self) -> &'static str {
		use MetricValue::*;
		match self {
			TotalPeerCount(_) => "ember.network.peers",
			InboundConnections(_) => "ember.network.inbound_connections",
			OutboundConnections(_) => "ember.network.outbound_connections",
			PendingInboundConnections(_) => "ember.network.pending_inbound_connections",
			PendingOutboundConnections(_) => "ember.network.pending_outbound_connections",
		}
	}
}

/// Sink for the counters and gauges the core maintains. Implementations are
/// expected to be cheap; `record` and `count` run on hot paths.
#[automock]
pub trait Metrics: Send + Sync {
	fn count(&self, counter: MetricCounter);

	fn record(&self, value: MetricValue);

	fn count_n(&self, counter: MetricCounter, n: u64) {
		for _ in 0..n {
			self.count(counter);
		}
	}
}

/// Discards everything; the default sink when none is configured.
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
	fn count(&self, _counter: MetricCounter) {}

	fn record(&self, _value: MetricValue) {}

	fn count_n(&self, _counter: MetricCounter, _n: u64) {}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn metric_names_are_namespaced() {
		assert_eq!(MetricCounter::PeerEvent.name(), "ember.network.peer_event");
		assert_eq!(
			MetricValue::TotalPeerCount(0).name(),
			"ember.network.peers"
		);
	}
}

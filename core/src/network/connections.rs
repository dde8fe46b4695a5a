//! Connection slot accounting.
use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::Direction;

/// Atomic tallies of active and pending connections per direction, checked
/// against the configured slot budgets.
///
/// The check-then-reserve usage is optimistic: the dial worker checks for a
/// free outbound slot before popping a task, and the counter only moves once
/// the transport reports the connection. The transient overshoot is bounded
/// by the number of dials in flight.
pub struct ConnectionCounters {
	max_inbound: i64,
	max_outbound: i64,

	inbound: AtomicI64,
	outbound: AtomicI64,

	pending_inbound: AtomicI64,
	pending_outbound: AtomicI64,
}

impl ConnectionCounters {
	pub fn new(max_inbound: i64, max_outbound: i64) -> Self {
		Self {
			max_inbound,
			max_outbound,
			inbound: AtomicI64::new(0),
			outbound: AtomicI64::new(0),
			pending_inbound: AtomicI64::new(0),
			pending_outbound: AtomicI64::new(0),
		}
	}

	pub fn has_free_connection_slot(&self, direction: Direction) -> bool {
		self.active_count(direction) + self.pending_count(direction) < self.max(direction)
	}

	pub fn has_free_outbound(&self) -> bool {
		self.has_free_connection_slot(Direction::Outbound)
	}

	pub fn update_active(&self, delta: i64, direction: Direction) {
		match direction {
			Direction::Inbound => self.inbound.fetch_add(delta, Ordering::SeqCst),
			Direction::Outbound => self.outbound.fetch_add(delta, Ordering::SeqCst),
		};
	}

	pub fn update_pending(&self, delta: i64, direction: Direction) {
		match direction {
			Direction::Inbound => self.pending_inbound.fetch_add(delta, Ordering::SeqCst),
			Direction::Outbound => self.pending_outbound.fetch_add(delta, Ordering::SeqCst),
		};
	}

	pub fn active_count(&self, direction: Direction) -> i64 {
		match direction {
			Direction::Inbound => self.inbound.load(Ordering::SeqCst),
			Direction::Outbound => self.outbound.load(Ordering::SeqCst),
		}
	}

	pub fn pending_count(&self, direction: Direction) -> i64 {
		match direction {
			Direction::Inbound => self.pending_inbound.load(Ordering::SeqCst),
			Direction::Outbound => self.pending_outbound.load(Ordering::SeqCst),
		}
	}

	fn max(&self, direction: Direction) -> i64 {
		match direction {
			Direction::Inbound => self.max_inbound,
			Direction::Outbound => self.max_outbound,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use test_case::test_case;

	#[test_case(Direction::Inbound)]
	#[test_case(Direction::Outbound)]
	fn active_plus_pending_fills_the_budget(direction: Direction) {
		let counters = ConnectionCounters::new(2, 2);
		assert!(counters.has_free_connection_slot(direction));

		counters.update_active(1, direction);
		assert!(counters.has_free_connection_slot(direction));

		counters.update_pending(1, direction);
		assert!(!counters.has_free_connection_slot(direction));

		counters.update_pending(-1, direction);
		assert!(counters.has_free_connection_slot(direction));
	}

	#[test]
	fn directions_are_independent() {
		let counters = ConnectionCounters::new(1, 1);
		counters.update_active(1, Direction::Inbound);

		assert!(!counters.has_free_connection_slot(Direction::Inbound));
		assert!(counters.has_free_outbound());
		assert_eq!(counters.active_count(Direction::Outbound), 0);
	}

	#[test]
	fn zero_budget_has_no_free_slots() {
		let counters = ConnectionCounters::new(0, 0);
		assert!(!counters.has_free_connection_slot(Direction::Inbound));
		assert!(!counters.has_free_outbound());
	}
}

//! Cooperative shutdown signal shared by all long-running tasks.
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Clonable controller around a one-shot shutdown reason.
///
/// Every long-lived loop selects on [`Controller::triggered_shutdown`]; the
/// first call to [`Controller::trigger_shutdown`] wins and wakes them all.
pub struct Controller<T: Clone> {
	inner: Arc<Inner<T>>,
}

struct Inner<T> {
	reason: Mutex<Option<T>>,
	notify: Notify,
}

impl<T: Clone> Clone for Controller<T> {
	fn clone(&self) -> Self {
		Controller {
			inner: self.inner.clone(),
		}
	}
}

impl<T: Clone> Default for Controller<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Clone> Controller<T> {
	pub fn new() -> Self {
		Controller {
			inner: Arc::new(Inner {
				reason: Mutex::new(None),
				notify: Notify::new(),
			}),
		}
	}

	/// Triggers the shutdown, waking every waiting task. Returns the reason
	/// back to the caller if a shutdown was already in flight.
	pub fn trigger_shutdown(&self, reason: T) -> Result<(), T> {
		{
			let mut slot = self.inner.reason.lock().unwrap();
			if slot.is_some() {
				return Err(reason);
			}
			*slot = Some(reason);
		}
		self.inner.notify.notify_waiters();
		Ok(())
	}

	pub fn is_triggered(&self) -> bool {
		self.inner.reason.lock().unwrap().is_some()
	}

	/// Completes with the shutdown reason once one has been given.
	pub async fn triggered_shutdown(&self) -> T {
		loop {
			let notified = self.inner.notify.notified();
			if let Some(reason) = self.inner.reason.lock().unwrap().clone() {
				return reason;
			}
			notified.await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[tokio::test]
	async fn waiters_observe_the_reason() {
		let controller = Controller::<String>::new();
		let waiter = controller.clone();
		let handle = tokio::spawn(async move { waiter.triggered_shutdown().await });

		tokio::time::sleep(Duration::from_millis(10)).await;
		controller.trigger_shutdown("done".to_string()).unwrap();

		assert_eq!(handle.await.unwrap(), "done");
	}

	#[tokio::test]
	async fn second_trigger_is_rejected() {
		let controller = Controller::<String>::new();
		assert!(controller.trigger_shutdown("first".to_string()).is_ok());
		assert_eq!(
			controller.trigger_shutdown("second".to_string()),
			Err("second".to_string())
		);
		assert_eq!(controller.triggered_shutdown().await, "first");
		assert!(controller.is_triggered());
	}
}

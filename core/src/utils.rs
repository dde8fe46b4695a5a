use futures::Future;
use tokio::task::JoinHandle;
use tracing::{Instrument, Level, Subscriber};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Spawns a task that inherits the caller's tracing span.
pub fn spawn_in_span<F>(future: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tokio::spawn(future.in_current_span())
}

pub fn default_subscriber(log_level: Level) -> impl Subscriber + Send + Sync {
	FmtSubscriber::builder()
		.with_env_filter(EnvFilter::new(format!("ember_network={log_level}")))
		.finish()
}

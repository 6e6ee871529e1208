/// sink for errors on best-effort paths (publish failures, per-recipient
/// processing failures). deployments plug their error tracker in here.
pub trait Reporter: Sync + Send {
	fn report(&self, context: &str, error: &dyn std::fmt::Display);
}

/// default reporter, forwards to the log
pub struct LogReporter;

impl Reporter for LogReporter {
	fn report(&self, context: &str, error: &dyn std::fmt::Display) {
		tracing::error!("[{context}] {error}");
	}
}

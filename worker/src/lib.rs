pub mod dispatcher;

pub use dispatcher::{JobError, JobResult};

pub fn spawn(
	ctx: quill::Context,
	concurrency: usize,
	poll: u64,
	stop: impl StopToken,
) -> tokio::task::JoinHandle<()> {
	use dispatcher::JobDispatcher;
	tokio::spawn(async move {
		tracing::info!("starting worker task");
		ctx.run(concurrency, poll, stop).await
	})
}

pub trait StopToken: Sync + Send + 'static {
	fn stop(&self) -> bool;
}

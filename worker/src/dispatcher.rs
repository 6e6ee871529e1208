use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder};

use quill::{model, Context, Event};
use quill::traits::Processor;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
	#[error("database error: {0:?}")]
	Database(#[from] sea_orm::DbErr),

	#[error("invalid payload json: {0:?}")]
	Json(#[from] serde_json::Error),

	#[error("error processing event: {0:?}")]
	Processor(#[from] quill::traits::process::ProcessorError),
}

pub type JobResult<T> = Result<T, JobError>;

#[async_trait::async_trait]
pub trait JobDispatcher: Sized {
	async fn poll(&self) -> JobResult<Option<model::job::Model>>;
	async fn lock(&self, job_internal: i64) -> JobResult<bool>;
	async fn run(self, concurrency: usize, poll_interval: u64, stop: impl crate::StopToken);
}

#[async_trait::async_trait]
impl JobDispatcher for Context {
	async fn poll(&self) -> JobResult<Option<model::job::Model>> {
		Ok(
			model::job::Entity::find()
				.filter(model::job::Column::NotBefore.lte(chrono::Utc::now()))
				.order_by(model::job::Column::NotBefore, Order::Asc)
				.one(self.db())
				.await?
		)
	}

	async fn lock(&self, job_internal: i64) -> JobResult<bool> {
		let res = model::job::Entity::delete(
			model::job::ActiveModel {
				internal: sea_orm::ActiveValue::Set(job_internal),
				..Default::default()
			}
		)
			.exec(self.db())
			.await?;

		if res.rows_affected < 1 {
			return Ok(false);
		}

		Ok(true)
	}

	async fn run(self, concurrency: usize, poll_interval: u64, stop: impl crate::StopToken) {
		macro_rules! restart {
			(now) => { continue };
			() => {
				{
					tokio::time::sleep(std::time::Duration::from_secs(poll_interval)).await;
					continue;
				}
			}
		}

		let mut pool = tokio::task::JoinSet::new();

		loop {
			if stop.stop() {
				tracing::info!("stopping worker");
				break;
			}

			let job = match self.poll().await {
				Ok(Some(j)) => j,
				Ok(None) => restart!(),
				Err(e) => {
					tracing::error!("error polling for jobs: {e}");
					restart!()
				},
			};

			match self.lock(job.internal).await {
				Ok(true) => {},
				Ok(false) => restart!(now),
				Err(e) => {
					tracing::error!("error locking job: {e}");
					restart!()
				},
			}

			if job.expired(self.cfg().queue.job_expiration_days) {
				tracing::info!("dropping expired job {job:?}");
				restart!(now);
			}

			let _ctx = self.clone();
			pool.spawn(async move {
				if let Err(e) = execute(&_ctx, &job).await {
					tracing::error!("failed processing job '{}': {e}", job.event);
					let active = job.clone().repeat();
					let mut count = 0;
					loop {
						match model::job::Entity::insert(active.clone()).exec(_ctx.db()).await {
							Err(e) => tracing::error!("could not insert back job '{}': {e}", job.event),
							Ok(_) => break,
						}
						count += 1;
						if count > _ctx.cfg().queue.reinsertion_attempt_limit {
							tracing::error!("reached job reinsertion limit, dropping {job:#?}");
							break;
						}
						tokio::time::sleep(std::time::Duration::from_secs(poll_interval)).await;
					}
				}
			});

			while pool.len() >= concurrency {
				if let Some(Err(e)) = pool.join_next().await {
					tracing::error!("failed joining processing task: {e}");
				}
			}
		}

		while let Some(joined) = pool.join_next().await {
			if let Err(e) = joined {
				tracing::error!("failed joining processing task: {e}");
			}
		}
	}
}

/// deserialize and hand a claimed job to the notice engine. per-recipient
/// failures are already isolated downstream, an error here means the whole
/// event should be retried.
pub async fn execute(ctx: &Context, job: &model::job::Model) -> JobResult<Vec<quill::traits::process::Outcome>> {
	let event: Event = serde_json::from_str(&job.payload)?;
	Ok(ctx.process(&event, job.tag.as_deref()).await?)
}

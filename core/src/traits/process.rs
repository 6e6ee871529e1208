use std::time::Duration;

use sea_orm::TransactionTrait;

use crate::events::Event;
use crate::traits::{
	bundle::{BundleError, Bundler, Placed},
	eligible::{Eligibility, EligibilityError},
	resolve::{NoticeParams, Resolver, ResolverError},
	withdraw::{lock_key, Withdrawer},
};

/// staleness guard on the per-tag lock, in case a consumer dies mid-tag
const TAG_LOCK_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
	#[error("database error while processing: {0:?}")]
	Database(#[from] sea_orm::DbErr),

	#[error("cache error while processing: {0:?}")]
	Cache(#[from] crate::cache::CacheError),

	#[error("failed resolving event: {0:?}")]
	Resolver(#[from] ResolverError),

	#[error("failed checking eligibility: {0:?}")]
	Eligibility(#[from] EligibilityError),

	#[error("failed bundling notice: {0:?}")]
	Bundle(#[from] BundleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// self-notification, disabled preference or block: expected behavior
	Ineligible,
	/// the event's tag was withdrawn before this consumer got to it
	Suppressed,
}

/// per-recipient result of processing one event, also the administrative
/// replay surface
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Delivered { recipient: i64, placed: Placed },
	Skipped { recipient: i64, reason: SkipReason },
	Failed { recipient: i64 },
}

#[async_trait::async_trait]
pub trait Processor {
	/// consumer-side entry point: resolve, then fan out per recipient with
	/// isolation, so one bad recipient never aborts the batch
	async fn process(&self, event: &Event, tag: Option<&str>) -> Result<Vec<Outcome>, ProcessorError>;
}

#[async_trait::async_trait]
impl Processor for crate::Context {
	async fn process(&self, event: &Event, tag: Option<&str>) -> Result<Vec<Outcome>, ProcessorError> {
		let Some(params) = self.resolve(event).await? else {
			return Ok(Vec::new());
		};

		let mut outcomes = Vec::with_capacity(params.recipients.len());
		for &recipient in &params.recipients {
			match deliver(self, &params, recipient, tag).await {
				Ok(outcome) => outcomes.push(outcome),
				Err(e) => {
					tracing::error!("failed delivering {:?} to {recipient}: {e}", params.notice_type);
					self.reporter().report("notice delivery", &e);
					outcomes.push(Outcome::Failed { recipient });
				},
			}
		}

		Ok(outcomes)
	}
}

async fn deliver(
	ctx: &crate::Context,
	params: &NoticeParams,
	recipient: i64,
	tag: Option<&str>,
) -> Result<Outcome, ProcessorError> {
	let tx = ctx.db().begin().await?;

	if !ctx.eligible(recipient, params.actor, params.notice_type, &tx).await? {
		return Ok(Outcome::Skipped { recipient, reason: SkipReason::Ineligible });
	}

	let Some(tag) = tag else {
		let placed = ctx.put_notice(params, recipient, &tx).await?;
		tx.commit().await?;
		return Ok(Outcome::Delivered { recipient, placed });
	};

	// hold the tag lock while mutating so a concurrent withdraw cannot
	// interleave between the skip check and the write
	let lock = lock_key(tag);
	let poll = Duration::from_millis(ctx.cfg().notify.lock_poll_interval_ms);
	while !ctx.cache().acquire(&lock, TAG_LOCK_TTL).await? {
		ctx.clock().sleep(poll).await;
	}

	let res = deliver_tagged(ctx, params, recipient, tag, tx).await;

	if let Err(e) = ctx.cache().release(&lock).await {
		tracing::warn!("failed releasing tag lock '{lock}': {e}");
	}

	res
}

async fn deliver_tagged(
	ctx: &crate::Context,
	params: &NoticeParams,
	recipient: i64,
	tag: &str,
	tx: sea_orm::DatabaseTransaction,
) -> Result<Outcome, ProcessorError> {
	// check immediately before writing: a withdraw that landed while this
	// event sat in the queue must win
	if ctx.suppressed(tag).await? {
		return Ok(Outcome::Skipped { recipient, reason: SkipReason::Suppressed });
	}

	let placed = ctx.put_notice(params, recipient, &tx).await?;
	tx.commit().await?;

	// undo log for late withdrawals. failing to record means a later
	// withdraw cannot retract this notice, worth reporting
	if let Err(e) = ctx.record(tag, placed.notice().internal).await {
		tracing::error!("failed recording notice {} under tag '{tag}': {e}", placed.notice().internal);
		ctx.reporter().report("notice registry", &e);
	}

	Ok(Outcome::Delivered { recipient, placed })
}

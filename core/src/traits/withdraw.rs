use std::time::Duration;

use sea_orm::EntityTrait;

use crate::cache::CacheError;
use crate::model;

/// tag-scoped cache keys for the suppression primitives
pub fn skip_key(tag: &str) -> String {
	format!("notice-skip:{tag}")
}

pub fn registry_key(tag: &str) -> String {
	format!("notice-registry:{tag}")
}

pub fn lock_key(tag: &str) -> String {
	format!("notice-lock:{tag}")
}

#[derive(Debug, thiserror::Error)]
pub enum WithdrawError {
	#[error("database error while withdrawing: {0:?}")]
	Database(#[from] sea_orm::DbErr),

	#[error("cache error while withdrawing: {0:?}")]
	Cache(#[from] CacheError),
}

/// asynchronous suppression of in-flight notifications for one tag:
/// raise the skip flag so consumers abort, then retract whatever already
/// landed via the delete registry
#[async_trait::async_trait]
pub trait Withdrawer {
	/// suppress and retract. spins on the tag lock with no timeout of its
	/// own, callers must bound it. returns how many notices were retracted.
	async fn withdraw(&self, tag: &str) -> Result<u64, WithdrawError>;

	/// consumer-side check, to run immediately before creating or bundling
	async fn suppressed(&self, tag: &str) -> Result<bool, CacheError>;

	/// consumer-side undo log: remember a notice created under this tag
	async fn record(&self, tag: &str, notice: i64) -> Result<(), CacheError>;
}

#[async_trait::async_trait]
impl Withdrawer for crate::Context {
	async fn withdraw(&self, tag: &str) -> Result<u64, WithdrawError> {
		let poll = Duration::from_millis(self.cfg().notify.lock_poll_interval_ms);
		let lock = lock_key(tag);

		// wait for any consumer currently mutating this tag to finish
		while self.cache().held(&lock).await? {
			self.clock().sleep(poll).await;
		}

		self.cache().raise(&skip_key(tag), self.retention()).await?;

		let registry = registry_key(tag);
		let mut retracted = 0;
		for member in self.cache().members(&registry).await? {
			let Ok(notice) = member.parse::<i64>() else {
				tracing::warn!("ignoring malformed registry member '{member}' for tag '{tag}'");
				continue;
			};
			// stale registry entries may point at rows long gone
			let res = model::notice::Entity::soft_delete(notice)
				.exec(self.db())
				.await?;
			retracted += res.rows_affected;
		}
		self.cache().purge(&registry).await?;

		tracing::info!("withdrew tag '{tag}', retracted {retracted} notices");
		Ok(retracted)
	}

	async fn suppressed(&self, tag: &str) -> Result<bool, CacheError> {
		self.cache().raised(&skip_key(tag)).await
	}

	async fn record(&self, tag: &str, notice: i64) -> Result<(), CacheError> {
		self.cache()
			.add(&registry_key(tag), &notice.to_string(), self.retention())
			.await
	}
}

impl crate::Context {
	pub(crate) fn retention(&self) -> Duration {
		Duration::from_secs(self.cfg().notify.retention_days as u64 * 24 * 60 * 60)
	}
}

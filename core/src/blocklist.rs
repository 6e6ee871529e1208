use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
	#[error("block relationship source unavailable: {0}")]
	Unavailable(String),
}

/// directional block lookup, owned by the surrounding user system
#[async_trait::async_trait]
pub trait BlockGraph: Sync + Send {
	/// whether `user` has blocked `target`
	async fn blocked(&self, user: i64, target: i64) -> Result<bool, BlockError>;
}

/// default when no block source is wired: nobody blocks anybody
pub struct NoBlocks;

#[async_trait::async_trait]
impl BlockGraph for NoBlocks {
	async fn blocked(&self, _user: i64, _target: i64) -> Result<bool, BlockError> {
		Ok(false)
	}
}

/// fixed set of (blocker, blocked) pairs, for tests
#[derive(Default)]
pub struct StaticBlocks(pub HashSet<(i64, i64)>);

#[async_trait::async_trait]
impl BlockGraph for StaticBlocks {
	async fn blocked(&self, user: i64, target: i64) -> Result<bool, BlockError> {
		Ok(self.0.contains(&(user, target)))
	}
}

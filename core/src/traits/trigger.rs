use sea_orm::{ActiveValue::{NotSet, Set}, EntityTrait};

use crate::events::Event;
use crate::model;
use crate::traits::withdraw::skip_key;

/// producer-side entry point. publishing is fire-and-forget: failures are
/// logged and reported but never surface to the triggering action.
#[async_trait::async_trait]
pub trait Notifier {
	async fn trigger(&self, event: Event, tag: Option<String>);
}

#[async_trait::async_trait]
impl Notifier for crate::Context {
	async fn trigger(&self, event: Event, tag: Option<String>) {
		if let Some(ref tag) = tag {
			// a fresh trigger always overrides a prior withdrawal
			if let Err(e) = self.cache().clear(&skip_key(tag)).await {
				tracing::warn!("failed clearing skip flag for '{tag}': {e}");
				self.reporter().report("notice trigger", &e);
			}
		}

		let payload = match serde_json::to_string(&event) {
			Ok(p) => p,
			Err(e) => {
				tracing::error!("failed serializing event payload: {e}");
				self.reporter().report("notice publish", &e);
				return;
			},
		};

		let now = self.clock().now();
		let job = model::job::ActiveModel {
			internal: NotSet,
			event: Set(crate::Context::new_id()),
			tag: Set(tag),
			payload: Set(payload),
			published: Set(now),
			not_before: Set(now),
			attempt: Set(0),
		};

		if let Err(e) = model::job::Entity::insert(job).exec(self.db()).await {
			tracing::error!("failed publishing notice event: {e}");
			self.reporter().report("notice publish", &e);
		}
	}
}

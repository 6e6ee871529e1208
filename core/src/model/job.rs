use sea_orm::entity::prelude::*;

/// queued notice events awaiting a consumer worker. producers insert here
/// fire-and-forget, workers poll and lock by deleting the row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i64,
	/// correlation id assigned at publish time
	#[sea_orm(unique)]
	pub event: String,
	/// withdraw tag, when the producer wants this event suppressible
	pub tag: Option<String>,
	/// serialized crate::events::Event
	pub payload: String,
	pub published: ChronoDateTimeUtc,
	pub not_before: ChronoDateTimeUtc,
	pub attempt: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn next_attempt(&self) -> ChronoDateTimeUtc {
		match self.attempt {
			0 => chrono::Utc::now() + std::time::Duration::from_secs(10),
			1 => chrono::Utc::now() + std::time::Duration::from_secs(60),
			2 => chrono::Utc::now() + std::time::Duration::from_secs(5 * 60),
			3 => chrono::Utc::now() + std::time::Duration::from_secs(20 * 60),
			4 => chrono::Utc::now() + std::time::Duration::from_secs(60 * 60),
			5 => chrono::Utc::now() + std::time::Duration::from_secs(12 * 60 * 60),
			_ => chrono::Utc::now() + std::time::Duration::from_secs(24 * 60 * 60),
		}
	}

	pub fn expired(&self, days: u32) -> bool {
		chrono::Utc::now() - self.published > chrono::Duration::days(days as i64)
	}

	pub fn repeat(self) -> ActiveModel {
		ActiveModel {
			internal: sea_orm::ActiveValue::NotSet,
			not_before: sea_orm::ActiveValue::Set(self.next_attempt()),
			event: sea_orm::ActiveValue::Set(self.event),
			tag: sea_orm::ActiveValue::Set(self.tag),
			payload: sea_orm::ActiveValue::Set(self.payload),
			published: sea_orm::ActiveValue::Set(self.published),
			attempt: sea_orm::ActiveValue::Set(self.attempt + 1),
		}
	}
}

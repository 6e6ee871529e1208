use sea_orm::{
	sea_query::{Expr, OnConflict},
	ActiveValue::{NotSet, Set},
	ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};

use crate::model;
use crate::traits::resolve::NoticeParams;

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
	#[error("database error while bundling: {0:?}")]
	Database(#[from] sea_orm::DbErr),

	#[error("stored notice data is not valid json: {0:?}")]
	Json(#[from] serde_json::Error),
}

/// what the bundler did for one recipient: exactly one of the two
#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
	Created(model::notice::Model),
	Bundled(model::notice::Model),
}

impl Placed {
	pub fn notice(&self) -> &model::notice::Model {
		match self {
			Placed::Created(n) | Placed::Bundled(n) => n,
		}
	}

	pub fn created(&self) -> bool {
		matches!(self, Placed::Created(_))
	}

	pub fn bundled(&self) -> bool {
		matches!(self, Placed::Bundled(_))
	}
}

/// merge policy for bundled notice data: later event wins per field, list
/// fields concatenate and dedupe by their "id" sub-field
pub fn merge_payload(base: serde_json::Value, patch: &serde_json::Value) -> serde_json::Value {
	let (serde_json::Value::Object(mut base), serde_json::Value::Object(patch)) = (base, patch) else {
		return patch.clone();
	};

	for (key, incoming) in patch {
		match (base.get_mut(key), incoming) {
			(Some(serde_json::Value::Array(stored)), serde_json::Value::Array(incoming)) => {
				for item in incoming {
					let duplicate = match item.get("id") {
						Some(id) => stored.iter().any(|x| x.get("id") == Some(id)),
						None => stored.contains(item),
					};
					if !duplicate {
						stored.push(item.clone());
					}
				}
			},
			_ => {
				base.insert(key.clone(), incoming.clone());
			},
		}
	}

	serde_json::Value::Object(base)
}

/// multiset form of a notice's subjects, the bundle-matching key alongside
/// (type, recipient, message)
fn signature(rows: &[model::notice_entity::Model]) -> Vec<(model::EntityRole, i32, i64)> {
	let mut sig: Vec<_> = rows
		.iter()
		.map(|r| (r.role, r.entity_type, r.entity))
		.collect();
	sig.sort();
	sig
}

#[async_trait::async_trait]
pub trait Bundler {
	/// unread, undeleted notices this event may merge into, oldest first
	async fn find_bundleables(
		&self,
		params: &NoticeParams,
		recipient: i64,
		tx: &DatabaseTransaction,
	) -> Result<Vec<model::notice::Model>, BundleError>;

	/// bundle-or-create for one already-eligible recipient
	async fn put_notice(
		&self,
		params: &NoticeParams,
		recipient: i64,
		tx: &DatabaseTransaction,
	) -> Result<Placed, BundleError>;

	async fn create_notice(
		&self,
		params: &NoticeParams,
		recipient: i64,
		tx: &DatabaseTransaction,
	) -> Result<model::notice::Model, BundleError>;

	/// idempotently attach an actor and re-surface the notice as unread
	async fn add_actor(
		&self,
		notice: i64,
		actor: i64,
		tx: &DatabaseTransaction,
	) -> Result<(), BundleError>;
}

#[async_trait::async_trait]
impl Bundler for crate::Context {
	async fn find_bundleables(
		&self,
		params: &NoticeParams,
		recipient: i64,
		tx: &DatabaseTransaction,
	) -> Result<Vec<model::notice::Model>, BundleError> {
		// message equality is exact, null included
		let message_cond = match params.message {
			Some(ref m) => Condition::all().add(model::notice_detail::Column::Message.eq(m.as_str())),
			None => Condition::all().add(model::notice_detail::Column::Message.is_null()),
		};

		let candidates = model::notice::Entity::find()
			.find_also_related(model::notice_detail::Entity)
			.filter(model::notice::Column::Recipient.eq(recipient))
			.filter(model::notice::Column::Unread.eq(true))
			.filter(model::notice::Column::Deleted.eq(false))
			.filter(model::notice_detail::Column::NoticeType.eq(params.notice_type))
			.filter(message_cond)
			.order_by_asc(model::notice::Column::Created)
			.all(tx)
			.await?;

		let incoming_sig = self.intern_signature(params, tx).await?;

		let mut bundleable = Vec::new();
		for (notice, detail) in candidates {
			let Some(detail) = detail else { continue };

			if !params.bundle.merge_data && detail.data_value()? != params.data {
				continue;
			}

			let stored = model::notice_entity::Entity::find_by_notice(notice.internal)
				.all(tx)
				.await?;
			if signature(&stored) != incoming_sig {
				continue;
			}

			bundleable.push(notice);
		}

		Ok(bundleable)
	}

	async fn put_notice(
		&self,
		params: &NoticeParams,
		recipient: i64,
		tx: &DatabaseTransaction,
	) -> Result<Placed, BundleError> {
		if params.bundle.disabled {
			return Ok(Placed::Created(self.create_notice(params, recipient, tx).await?));
		}

		let target = self.find_bundleables(params, recipient, tx).await?.into_iter().next();

		// bundling needs somebody to attach, and resends never bundle
		let (Some(target), Some(actor), false) = (target, params.actor, params.bundle.force_new) else {
			return Ok(Placed::Created(self.create_notice(params, recipient, tx).await?));
		};

		self.add_actor(target.internal, actor, tx).await?;

		if params.bundle.merge_data {
			if let Some(ref incoming) = params.data {
				let detail = model::notice_detail::Entity::find_by_id(target.detail)
					.one(tx)
					.await?
					.ok_or(sea_orm::DbErr::RecordNotFound(format!("notice_detail#{}", target.detail)))?;
				let merged = match detail.data_value()? {
					Some(stored) => merge_payload(stored, incoming),
					None => incoming.clone(),
				};
				model::notice_detail::Entity::update_many()
					.col_expr(model::notice_detail::Column::Data, Expr::value(serde_json::to_string(&merged)?))
					.filter(model::notice_detail::Column::Internal.eq(target.detail))
					.exec(tx)
					.await?;
			}
		}

		tracing::debug!("bundled {:?} for {recipient} into notice {}", params.notice_type, target.internal);
		Ok(Placed::Bundled(target))
	}

	async fn create_notice(
		&self,
		params: &NoticeParams,
		recipient: i64,
		tx: &DatabaseTransaction,
	) -> Result<model::notice::Model, BundleError> {
		let now = self.clock().now();

		let data = match params.data {
			Some(ref d) => Some(serde_json::to_string(d)?),
			None => None,
		};

		let detail = model::notice_detail::Entity::insert(model::notice_detail::ActiveModel {
			internal: NotSet,
			notice_type: Set(params.notice_type),
			message: Set(params.message.clone()),
			data: Set(data),
			created: Set(now),
		})
			.exec(tx)
			.await?
			.last_insert_id;

		let notice = model::notice::Entity::insert(model::notice::ActiveModel {
			internal: NotSet,
			recipient: Set(recipient),
			detail: Set(detail),
			unread: Set(true),
			deleted: Set(false),
			created: Set(now),
			updated: Set(now),
		})
			.exec(tx)
			.await?
			.last_insert_id;

		if let Some(actor) = params.actor {
			model::notice_actor::Entity::insert(model::notice_actor::ActiveModel {
				internal: NotSet,
				notice: Set(notice),
				actor: Set(actor),
				created: Set(now),
			})
				.exec(tx)
				.await?;
		}

		for spec in &params.entities {
			let entity_type = model::entity_type::Entity::resolve(spec.table, tx).await?;
			model::notice_entity::Entity::insert(model::notice_entity::ActiveModel {
				internal: NotSet,
				notice: Set(notice),
				role: Set(spec.role),
				entity_type: Set(entity_type),
				entity: Set(spec.id),
			})
				.exec(tx)
				.await?;
		}

		tracing::debug!("created notice {notice} ({:?}) for {recipient}", params.notice_type);
		Ok(model::notice::Model {
			internal: notice,
			recipient,
			detail,
			unread: true,
			deleted: false,
			created: now,
			updated: now,
		})
	}

	async fn add_actor(
		&self,
		notice: i64,
		actor: i64,
		tx: &DatabaseTransaction,
	) -> Result<(), BundleError> {
		let inserted = model::notice_actor::Entity::insert(model::notice_actor::ActiveModel {
			internal: NotSet,
			notice: Set(notice),
			actor: Set(actor),
			created: Set(self.clock().now()),
		})
			.on_conflict(
				OnConflict::columns([
					model::notice_actor::Column::Actor,
					model::notice_actor::Column::Notice,
				])
					.do_nothing()
					.to_owned()
			)
			.exec_without_returning(tx)
			.await?;

		if inserted == 0 {
			tracing::debug!("actor {actor} already attached to notice {notice}");
		}

		// a new contribution re-surfaces the notice
		model::notice::Entity::update_many()
			.col_expr(model::notice::Column::Unread, Expr::value(true))
			.col_expr(model::notice::Column::Updated, Expr::value(self.clock().now()))
			.filter(model::notice::Column::Internal.eq(notice))
			.exec(tx)
			.await?;

		Ok(())
	}
}

impl crate::Context {
	/// resolve the incoming entity specs against the entity_type lookup so
	/// they compare against stored rows
	async fn intern_signature(
		&self,
		params: &NoticeParams,
		tx: &DatabaseTransaction,
	) -> Result<Vec<(model::EntityRole, i32, i64)>, BundleError> {
		let mut sig = Vec::with_capacity(params.entities.len());
		for spec in &params.entities {
			let entity_type = model::entity_type::Entity::resolve(spec.table, tx).await?;
			sig.push((spec.role, entity_type, spec.id));
		}
		sig.sort();
		Ok(sig)
	}
}

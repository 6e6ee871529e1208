use sea_orm::{entity::prelude::*, sea_query::Expr};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notices")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i64,
	pub recipient: i64,
	#[sea_orm(unique)]
	pub detail: i64,
	pub unread: bool,
	pub deleted: bool,
	pub created: ChronoDateTimeUtc,
	pub updated: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::notice_detail::Entity",
		from = "Column::Detail",
		to = "super::notice_detail::Column::Internal",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Details,
	#[sea_orm(has_many = "super::notice_actor::Entity")]
	Actors,
	#[sea_orm(has_many = "super::notice_entity::Entity")]
	Entities,
}

impl Related<super::notice_detail::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Details.def()
	}
}

impl Related<super::notice_actor::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Actors.def()
	}
}

impl Related<super::notice_entity::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Entities.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	/// marking a notice read permanently removes it from the bundle window
	pub fn mark_read(internal: i64) -> sea_orm::UpdateMany<Entity> {
		Entity::update_many()
			.col_expr(Column::Unread, Expr::value(false))
			.filter(Column::Internal.eq(internal))
	}

	/// notices are never hard-deleted, retraction only flips this flag
	pub fn soft_delete(internal: i64) -> sea_orm::UpdateMany<Entity> {
		Entity::update_many()
			.col_expr(Column::Deleted, Expr::value(true))
			.filter(Column::Internal.eq(internal))
	}
}

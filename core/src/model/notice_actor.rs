use sea_orm::entity::prelude::*;

/// who contributed to a bundled notice. unique on (actor, notice) so
/// attaching the same actor twice is a no-op, never an error.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notice_actors")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i64,
	pub notice: i64,
	pub actor: i64,
	pub created: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::notice::Entity",
		from = "Column::Notice",
		to = "super::notice::Column::Internal",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	Notices,
}

impl Related<super::notice::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Notices.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_by_notice(notice: i64) -> Select<Entity> {
		Entity::find().filter(Column::Notice.eq(notice))
	}
}

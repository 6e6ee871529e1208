use sea_orm::entity::prelude::*;

/// the part an entity plays inside a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, DeriveActiveEnum, serde::Serialize, serde::Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
	#[sea_orm(string_value = "target")]
	Target,
	#[sea_orm(string_value = "comment")]
	Comment,
	#[sea_orm(string_value = "reply")]
	Reply,
	#[sea_orm(string_value = "circle")]
	Circle,
}

/// subject rows of a notice. the multiset of (role, entity_type, entity)
/// is the notice's entity signature, fixed at creation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notice_entities")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i64,
	pub notice: i64,
	pub role: EntityRole,
	pub entity_type: i32,
	pub entity: i64,
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
	#[sea_orm(
		belongs_to = "super::entity_type::Entity",
		from = "Column::EntityType",
		to = "super::entity_type::Column::Internal",
		on_update = "Cascade",
		on_delete = "Cascade"
	)]
	EntityTypes,
}

impl Related<super::notice::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Notices.def()
	}
}

impl Related<super::entity_type::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::EntityTypes.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_by_notice(notice: i64) -> Select<Entity> {
		Entity::find().filter(Column::Notice.eq(notice))
	}
}

use sea_orm::{entity::prelude::*, ActiveValue::{NotSet, Set}, ConnectionTrait};

/// lookup mapping logical entity table names ("article", "comment", ...)
/// to small integer ids referenced by notice_entities
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "entity_types")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i32,
	#[sea_orm(unique)]
	pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::notice_entity::Entity")]
	NoticeEntities,
}

impl Related<super::notice_entity::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::NoticeEntities.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	/// get-or-create the id for a table name
	pub async fn resolve<C: ConnectionTrait>(name: &str, db: &C) -> Result<i32, DbErr> {
		if let Some(known) = Entity::find()
			.filter(Column::Name.eq(name))
			.one(db)
			.await?
		{
			return Ok(known.internal);
		}

		let res = Entity::insert(ActiveModel {
			internal: NotSet,
			name: Set(name.to_string()),
		})
			.exec(db)
			.await?;

		Ok(res.last_insert_id)
	}
}

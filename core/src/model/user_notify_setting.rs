use sea_orm::entity::prelude::*;

/// per-user notification preferences. a missing row means the user never
/// completed onboarding and receives nothing but official notices.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_notify_settings")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i64,
	#[sea_orm(unique)]
	pub user: i64,
	/// master switch, gates everything except official notices
	pub enabled: bool,
	pub new_follower: bool,
	pub mention: bool,
	pub article_new_comment: bool,
	pub article_new_appreciation: bool,
	pub article_new_subscription: bool,
	pub comment_new_reply: bool,
	pub comment_liked: bool,
	pub new_donation: bool,
	pub circle_new_follower: bool,
	pub circle_new_subscriber: bool,
	pub circle_new_discussion: bool,
	pub circle_new_broadcast: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
	pub fn find_by_user(user: i64) -> Select<Entity> {
		Entity::find().filter(Column::User.eq(user))
	}
}

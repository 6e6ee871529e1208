use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum UserNotifySettings {
	Table,
	Internal,
	User,
	Enabled,
	NewFollower,
	Mention,
	ArticleNewComment,
	ArticleNewAppreciation,
	ArticleNewSubscription,
	CommentNewReply,
	CommentLiked,
	NewDonation,
	CircleNewFollower,
	CircleNewSubscriber,
	CircleNewDiscussion,
	CircleNewBroadcast,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(UserNotifySettings::Table)
					.comment("per-user notification preferences, absence means deliver official notices only")
					.col(
						ColumnDef::new(UserNotifySettings::Internal)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(UserNotifySettings::User).big_integer().not_null().unique_key())
					.col(ColumnDef::new(UserNotifySettings::Enabled).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::NewFollower).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::Mention).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::ArticleNewComment).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::ArticleNewAppreciation).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::ArticleNewSubscription).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::CommentNewReply).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::CommentLiked).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::NewDonation).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::CircleNewFollower).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::CircleNewSubscriber).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::CircleNewDiscussion).boolean().not_null().default(true))
					.col(ColumnDef::new(UserNotifySettings::CircleNewBroadcast).boolean().not_null().default(true))
					.to_owned()
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(UserNotifySettings::Table).to_owned())
			.await?;

		Ok(())
	}
}

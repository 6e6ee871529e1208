use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum NoticeDetails {
	Table,
	Internal,
	NoticeType,
	Message,
	Data,
	Created,
}

#[derive(DeriveIden)]
pub enum Notices {
	Table,
	Internal,
	Recipient,
	Detail,
	Unread,
	Deleted,
	Created,
	Updated,
}

#[derive(DeriveIden)]
pub enum NoticeActors {
	Table,
	Internal,
	Notice,
	Actor,
	Created,
}

#[derive(DeriveIden)]
pub enum EntityTypes {
	Table,
	Internal,
	Name,
}

#[derive(DeriveIden)]
pub enum NoticeEntities {
	Table,
	Internal,
	Notice,
	Role,
	EntityType,
	Entity,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(NoticeDetails::Table)
					.comment("shared payload of a notice: type, verbatim message, merged data blob")
					.col(
						ColumnDef::new(NoticeDetails::Internal)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(NoticeDetails::NoticeType).string().not_null())
					.col(ColumnDef::new(NoticeDetails::Message).string().null())
					.col(ColumnDef::new(NoticeDetails::Data).string().null())
					.col(ColumnDef::new(NoticeDetails::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Notices::Table)
					.comment("one notice per recipient, bundling appends actors to an existing row")
					.col(
						ColumnDef::new(Notices::Internal)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Notices::Recipient).big_integer().not_null())
					.col(ColumnDef::new(Notices::Detail).big_integer().not_null().unique_key())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-notices-detail")
							.from(Notices::Table, Notices::Detail)
							.to(NoticeDetails::Table, NoticeDetails::Internal)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(Notices::Unread).boolean().not_null().default(true))
					.col(ColumnDef::new(Notices::Deleted).boolean().not_null().default(false))
					.col(ColumnDef::new(Notices::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.col(ColumnDef::new(Notices::Updated).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-notices-recipient-unread")
					.table(Notices::Table)
					.col(Notices::Recipient)
					.col(Notices::Unread)
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(NoticeActors::Table)
					.comment("actors aggregated onto a notice, at most once each")
					.col(
						ColumnDef::new(NoticeActors::Internal)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(NoticeActors::Notice).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-notice-actors-notice")
							.from(NoticeActors::Table, NoticeActors::Notice)
							.to(Notices::Table, Notices::Internal)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(NoticeActors::Actor).big_integer().not_null())
					.col(ColumnDef::new(NoticeActors::Created).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.unique()
					.name("index-notice-actors-actor-notice")
					.table(NoticeActors::Table)
					.col(NoticeActors::Actor)
					.col(NoticeActors::Notice)
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(EntityTypes::Table)
					.comment("logical table names referenced by notice entities")
					.col(
						ColumnDef::new(EntityTypes::Internal)
							.integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(EntityTypes::Name).string().not_null().unique_key())
					.to_owned()
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(NoticeEntities::Table)
					.comment("subject rows of a notice, fixed at creation")
					.col(
						ColumnDef::new(NoticeEntities::Internal)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(NoticeEntities::Notice).big_integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-notice-entities-notice")
							.from(NoticeEntities::Table, NoticeEntities::Notice)
							.to(Notices::Table, Notices::Internal)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(NoticeEntities::Role).string().not_null())
					.col(ColumnDef::new(NoticeEntities::EntityType).integer().not_null())
					.foreign_key(
						ForeignKey::create()
							.name("fkey-notice-entities-entity-type")
							.from(NoticeEntities::Table, NoticeEntities::EntityType)
							.to(EntityTypes::Table, EntityTypes::Internal)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade)
					)
					.col(ColumnDef::new(NoticeEntities::Entity).big_integer().not_null())
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-notice-entities-notice")
					.table(NoticeEntities::Table)
					.col(NoticeEntities::Notice)
					.to_owned()
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(NoticeEntities::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(EntityTypes::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(NoticeActors::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Notices::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(NoticeDetails::Table).to_owned())
			.await?;

		Ok(())
	}
}

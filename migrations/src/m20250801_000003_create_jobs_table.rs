use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Jobs {
	Table,
	Internal,
	Event,
	Tag,
	Payload,
	Published,
	NotBefore,
	Attempt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(Jobs::Table)
					.comment("queued notice events, rows are claimed by deletion")
					.col(
						ColumnDef::new(Jobs::Internal)
							.big_integer()
							.not_null()
							.primary_key()
							.auto_increment()
					)
					.col(ColumnDef::new(Jobs::Event).string().not_null().unique_key())
					.col(ColumnDef::new(Jobs::Tag).string().null())
					.col(ColumnDef::new(Jobs::Payload).string().not_null())
					.col(ColumnDef::new(Jobs::Published).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.col(ColumnDef::new(Jobs::NotBefore).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
					.col(ColumnDef::new(Jobs::Attempt).integer().not_null().default(0))
					.to_owned()
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("index-jobs-not-before")
					.table(Jobs::Table)
					.col((Jobs::NotBefore, IndexOrder::Asc))
					.to_owned()
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_index(Index::drop().name("index-jobs-not-before").table(Jobs::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Jobs::Table).to_owned())
			.await?;

		Ok(())
	}
}

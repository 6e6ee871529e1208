use sea_orm_migration::prelude::*;

mod m20250801_000001_create_notice_tables;
mod m20250801_000002_create_notify_settings;
mod m20250801_000003_create_jobs_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m20250801_000001_create_notice_tables::Migration),
			Box::new(m20250801_000002_create_notify_settings::Migration),
			Box::new(m20250801_000003_create_jobs_table::Migration),
		]
	}
}

pub use sea_orm_migration::MigratorTrait;

use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
	#[error("entity source unavailable: {0}")]
	Unavailable(String),
}

/// whatever the resolver needs for message interpolation, not the full row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedEntity {
	pub id: i64,
	pub title: String,
}

/// materializes platform entities (articles, campaigns, comments) owned by
/// the surrounding system. the engine only ever reads titles from it.
#[async_trait::async_trait]
pub trait EntityLoader: Sync + Send {
	async fn load(&self, table: &str, id: i64) -> Result<Option<LoadedEntity>, LoaderError>;
}

/// default when no loader is wired: everything is unknown
pub struct NullLoader;

#[async_trait::async_trait]
impl EntityLoader for NullLoader {
	async fn load(&self, _table: &str, _id: i64) -> Result<Option<LoadedEntity>, LoaderError> {
		Ok(None)
	}
}

/// fixed table of entities, for tests and local tooling
#[derive(Default)]
pub struct StaticLoader(HashMap<(String, i64), String>);

impl StaticLoader {
	pub fn with(mut self, table: &str, id: i64, title: &str) -> Self {
		self.0.insert((table.to_string(), id), title.to_string());
		self
	}
}

#[async_trait::async_trait]
impl EntityLoader for StaticLoader {
	async fn load(&self, table: &str, id: i64) -> Result<Option<LoadedEntity>, LoaderError> {
		Ok(
			self.0
				.get(&(table.to_string(), id))
				.map(|title| LoadedEntity { id, title: title.clone() })
		)
	}
}

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::blocklist::{BlockGraph, NoBlocks};
use crate::cache::{MemoryCache, SuppressionCache};
use crate::clock::{Clock, TokioClock};
use crate::config::Config;
use crate::loader::{EntityLoader, NullLoader};
use crate::locale::{BuiltinLocales, Locale, Localizer};
use crate::report::{LogReporter, Reporter};

#[derive(Clone)]
pub struct Context(Arc<ContextInner>);

struct ContextInner {
	db: DatabaseConnection,
	config: Config,
	cache: Arc<dyn SuppressionCache>,
	clock: Arc<dyn Clock>,
	blocks: Arc<dyn BlockGraph>,
	loader: Arc<dyn EntityLoader>,
	locale: Arc<dyn Localizer>,
	reporter: Arc<dyn Reporter>,
}

/// everything the engine talks to but does not own. every slot has a
/// default so the binary can boot before the platform wires its own.
pub struct Collaborators {
	pub cache: Arc<dyn SuppressionCache>,
	pub clock: Arc<dyn Clock>,
	pub blocks: Arc<dyn BlockGraph>,
	pub loader: Arc<dyn EntityLoader>,
	pub locale: Arc<dyn Localizer>,
	pub reporter: Arc<dyn Reporter>,
}

impl Default for Collaborators {
	fn default() -> Self {
		let clock: Arc<dyn Clock> = Arc::new(TokioClock);
		Collaborators {
			cache: Arc::new(MemoryCache::new(clock.clone())),
			clock,
			blocks: Arc::new(NoBlocks),
			loader: Arc::new(NullLoader),
			locale: Arc::new(BuiltinLocales),
			reporter: Arc::new(LogReporter),
		}
	}
}

impl Context {
	pub fn new(db: DatabaseConnection, config: Config, collab: Collaborators) -> Self {
		Context(Arc::new(ContextInner {
			db, config,
			cache: collab.cache,
			clock: collab.clock,
			blocks: collab.blocks,
			loader: collab.loader,
			locale: collab.locale,
			reporter: collab.reporter,
		}))
	}

	pub fn db(&self) -> &DatabaseConnection {
		&self.0.db
	}

	pub fn cfg(&self) -> &Config {
		&self.0.config
	}

	pub fn cache(&self) -> &dyn SuppressionCache {
		&*self.0.cache
	}

	pub fn clock(&self) -> &dyn Clock {
		&*self.0.clock
	}

	pub fn blocks(&self) -> &dyn BlockGraph {
		&*self.0.blocks
	}

	pub fn loader(&self) -> &dyn EntityLoader {
		&*self.0.loader
	}

	pub fn locale(&self) -> &dyn Localizer {
		&*self.0.locale
	}

	pub fn reporter(&self) -> &dyn Reporter {
		&*self.0.reporter
	}

	pub fn default_locale(&self) -> Locale {
		Locale::parse(&self.0.config.notify.default_locale).unwrap_or_default()
	}

	pub fn new_id() -> String {
		uuid::Uuid::new_v4().to_string()
	}
}

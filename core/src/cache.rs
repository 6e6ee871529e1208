use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::Clock;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
	#[error("cache backend unavailable: {0}")]
	Unavailable(String),

	#[error("cache state poisoned")]
	Poisoned,
}

pub type CacheResult<T> = Result<T, CacheError>;

/// ttl'd presence flag, the skip-flag primitive
#[async_trait::async_trait]
pub trait TtlFlag: Sync + Send {
	async fn raise(&self, key: &str, ttl: Duration) -> CacheResult<()>;
	async fn raised(&self, key: &str) -> CacheResult<bool>;
	async fn clear(&self, key: &str) -> CacheResult<()>;
}

/// ttl'd set of members, the delete-registry primitive
#[async_trait::async_trait]
pub trait TtlSet: Sync + Send {
	async fn add(&self, key: &str, member: &str, ttl: Duration) -> CacheResult<()>;
	async fn members(&self, key: &str) -> CacheResult<Vec<String>>;
	async fn purge(&self, key: &str) -> CacheResult<()>;
}

/// mutual exclusion flag held by a consumer while mutating per-tag state
#[async_trait::async_trait]
pub trait TagLock: Sync + Send {
	async fn acquire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;
	async fn release(&self, key: &str) -> CacheResult<()>;
	async fn held(&self, key: &str) -> CacheResult<bool>;
}

/// the three capabilities the withdraw coordinator needs, usually provided
/// by one backing store
pub trait SuppressionCache: TtlFlag + TtlSet + TagLock {}
impl<T: TtlFlag + TtlSet + TagLock> SuppressionCache for T {}

enum Slot {
	Flag,
	Set(HashSet<String>),
}

struct Entry {
	expires: DateTime<Utc>,
	slot: Slot,
}

/// in-process cache with clock-based expiry, the default backing store.
/// deployments spanning multiple consumer hosts should substitute a shared
/// store implementing the same three traits.
pub struct MemoryCache {
	entries: Mutex<HashMap<String, Entry>>,
	clock: Arc<dyn Clock>,
}

impl MemoryCache {
	pub fn new(clock: Arc<dyn Clock>) -> Self {
		MemoryCache {
			entries: Mutex::new(HashMap::new()),
			clock,
		}
	}

	fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
		self.clock.now() + chrono::Duration::from_std(ttl).unwrap_or_default()
	}

	fn live<'a>(&self, entries: &'a HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
		entries
			.get(key)
			.filter(|e| e.expires > self.clock.now())
	}
}

#[async_trait::async_trait]
impl TtlFlag for MemoryCache {
	async fn raise(&self, key: &str, ttl: Duration) -> CacheResult<()> {
		let expires = self.expiry(ttl);
		let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		entries.insert(key.to_string(), Entry { expires, slot: Slot::Flag });
		Ok(())
	}

	async fn raised(&self, key: &str) -> CacheResult<bool> {
		let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		Ok(matches!(self.live(&entries, key), Some(Entry { slot: Slot::Flag, .. })))
	}

	async fn clear(&self, key: &str) -> CacheResult<()> {
		let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		entries.remove(key);
		Ok(())
	}
}

#[async_trait::async_trait]
impl TtlSet for MemoryCache {
	async fn add(&self, key: &str, member: &str, ttl: Duration) -> CacheResult<()> {
		let expires = self.expiry(ttl);
		let now = self.clock.now();
		let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		match entries.get_mut(key) {
			Some(entry) if entry.expires > now => {
				if let Slot::Set(ref mut members) = entry.slot {
					members.insert(member.to_string());
					entry.expires = expires;
					return Ok(());
				}
				// key held a flag, overwrite below
			},
			_ => {},
		}
		let mut members = HashSet::new();
		members.insert(member.to_string());
		entries.insert(key.to_string(), Entry { expires, slot: Slot::Set(members) });
		Ok(())
	}

	async fn members(&self, key: &str) -> CacheResult<Vec<String>> {
		let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		match self.live(&entries, key) {
			Some(Entry { slot: Slot::Set(members), .. }) => Ok(members.iter().cloned().collect()),
			_ => Ok(Vec::new()),
		}
	}

	async fn purge(&self, key: &str) -> CacheResult<()> {
		let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		entries.remove(key);
		Ok(())
	}
}

#[async_trait::async_trait]
impl TagLock for MemoryCache {
	async fn acquire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
		let expires = self.expiry(ttl);
		let now = self.clock.now();
		let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		if matches!(entries.get(key), Some(e) if e.expires > now) {
			return Ok(false);
		}
		entries.insert(key.to_string(), Entry { expires, slot: Slot::Flag });
		Ok(true)
	}

	async fn release(&self, key: &str) -> CacheResult<()> {
		let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		entries.remove(key);
		Ok(())
	}

	async fn held(&self, key: &str) -> CacheResult<bool> {
		let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
		Ok(self.live(&entries, key).is_some())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::clock::ManualClock;

	fn cache() -> (Arc<ManualClock>, MemoryCache) {
		let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
		let cache = MemoryCache::new(clock.clone());
		(clock, cache)
	}

	#[tokio::test]
	async fn flags_expire_with_the_clock() {
		let (clock, cache) = cache();
		cache.raise("skip:x", Duration::from_secs(60)).await.unwrap();
		assert!(cache.raised("skip:x").await.unwrap());
		clock.advance(Duration::from_secs(61));
		assert!(!cache.raised("skip:x").await.unwrap());
	}

	#[tokio::test]
	async fn cleared_flags_stay_down() {
		let (_clock, cache) = cache();
		cache.raise("skip:x", Duration::from_secs(60)).await.unwrap();
		cache.clear("skip:x").await.unwrap();
		assert!(!cache.raised("skip:x").await.unwrap());
	}

	#[tokio::test]
	async fn sets_collect_and_purge() {
		let (_clock, cache) = cache();
		cache.add("reg:x", "1", Duration::from_secs(60)).await.unwrap();
		cache.add("reg:x", "2", Duration::from_secs(60)).await.unwrap();
		cache.add("reg:x", "2", Duration::from_secs(60)).await.unwrap();
		let mut members = cache.members("reg:x").await.unwrap();
		members.sort();
		assert_eq!(members, vec!["1".to_string(), "2".to_string()]);
		cache.purge("reg:x").await.unwrap();
		assert!(cache.members("reg:x").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn locks_are_exclusive_until_released() {
		let (clock, cache) = cache();
		assert!(cache.acquire("lock:x", Duration::from_secs(60)).await.unwrap());
		assert!(!cache.acquire("lock:x", Duration::from_secs(60)).await.unwrap());
		assert!(cache.held("lock:x").await.unwrap());
		cache.release("lock:x").await.unwrap();
		assert!(cache.acquire("lock:x", Duration::from_secs(60)).await.unwrap());
		// a crashed holder loses the lock once the ttl lapses
		clock.advance(Duration::from_secs(61));
		assert!(cache.acquire("lock:x", Duration::from_secs(60)).await.unwrap());
	}
}

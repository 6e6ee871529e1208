use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// time source for the engine. injected so suppression spin-waits and cache
/// expiry can be driven deterministically in tests.
#[async_trait::async_trait]
pub trait Clock: Sync + Send {
	fn now(&self) -> DateTime<Utc>;
	async fn sleep(&self, duration: std::time::Duration);
}

pub struct TokioClock;

#[async_trait::async_trait]
impl Clock for TokioClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}

	async fn sleep(&self, duration: std::time::Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// clock that only moves when told to. sleepers wake on every advance and
/// re-check their deadline.
pub struct ManualClock {
	now: Mutex<DateTime<Utc>>,
	tick: tokio::sync::Notify,
}

impl ManualClock {
	pub fn new(start: DateTime<Utc>) -> Self {
		ManualClock {
			now: Mutex::new(start),
			tick: tokio::sync::Notify::new(),
		}
	}

	pub fn advance(&self, by: std::time::Duration) {
		{
			let mut now = self.now.lock().expect("clock mutex poisoned");
			*now += chrono::Duration::from_std(by).unwrap_or_default();
		}
		self.tick.notify_waiters();
	}
}

#[async_trait::async_trait]
impl Clock for ManualClock {
	fn now(&self) -> DateTime<Utc> {
		*self.now.lock().expect("clock mutex poisoned")
	}

	async fn sleep(&self, duration: std::time::Duration) {
		let deadline = self.now() + chrono::Duration::from_std(duration).unwrap_or_default();
		loop {
			let tick = self.tick.notified();
			tokio::pin!(tick);
			// arm the waiter before re-checking, an advance landing between
			// the check and the await must not be lost
			tick.as_mut().enable();
			if self.now() >= deadline {
				return;
			}
			tick.await;
		}
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;
	use std::time::Duration;

	use super::*;

	#[tokio::test]
	async fn manual_sleeps_block_until_advanced_past_the_deadline() {
		let clock = Arc::new(ManualClock::new(Utc::now()));
		let sleeper = tokio::spawn({
			let clock = clock.clone();
			async move { clock.sleep(Duration::from_secs(10)).await }
		});

		for _ in 0..20 {
			tokio::task::yield_now().await;
		}
		assert!(!sleeper.is_finished());

		// a partial advance wakes the sleeper but the deadline holds it
		clock.advance(Duration::from_secs(5));
		for _ in 0..20 {
			tokio::task::yield_now().await;
		}
		assert!(!sleeper.is_finished());

		clock.advance(Duration::from_secs(5));
		sleeper.await.unwrap();
	}
}

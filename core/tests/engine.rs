use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ActiveValue::{NotSet, Set}, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use quill::{model, Collaborators, Config, Context, Event};
use quill::blocklist::StaticBlocks;
use quill::cache::MemoryCache;
use quill::clock::ManualClock;
use quill::traits::{Notifier, Processor, Withdrawer};
use quill::traits::withdraw::lock_key;
use quill::traits::process::{Outcome, SkipReason};
use quill_migrations::{Migrator, MigratorTrait};

// single connection so every query sees the same in-memory database
async fn memory_db() -> DatabaseConnection {
	let mut opts = ConnectOptions::new("sqlite::memory:");
	opts.max_connections(1);
	let db = Database::connect(opts).await.expect("failed connecting to in-memory db");
	Migrator::up(&db, None).await.expect("failed applying migrations");
	db
}

async fn ctx() -> Context {
	Context::new(memory_db().await, Config::default(), Collaborators::default())
}

async fn ctx_with(collab: Collaborators) -> Context {
	Context::new(memory_db().await, Config::default(), collab)
}

async fn seed_settings(ctx: &Context, user: i64) {
	seed_settings_with(ctx, user, |_| {}).await
}

async fn seed_settings_with<F>(ctx: &Context, user: i64, tweak: F)
where
	F: FnOnce(&mut model::user_notify_setting::ActiveModel),
{
	let mut setting = model::user_notify_setting::ActiveModel {
		internal: NotSet,
		user: Set(user),
		enabled: Set(true),
		new_follower: Set(true),
		mention: Set(true),
		article_new_comment: Set(true),
		article_new_appreciation: Set(true),
		article_new_subscription: Set(true),
		comment_new_reply: Set(true),
		comment_liked: Set(true),
		new_donation: Set(true),
		circle_new_follower: Set(true),
		circle_new_subscriber: Set(true),
		circle_new_discussion: Set(true),
		circle_new_broadcast: Set(true),
	};
	tweak(&mut setting);
	model::user_notify_setting::Entity::insert(setting)
		.exec(ctx.db())
		.await
		.expect("failed seeding settings");
}

async fn notices_for(ctx: &Context, recipient: i64) -> Vec<model::notice::Model> {
	model::notice::Entity::find()
		.filter(model::notice::Column::Recipient.eq(recipient))
		.all(ctx.db())
		.await
		.expect("failed listing notices")
}

async fn actor_count(ctx: &Context, notice: i64) -> u64 {
	model::notice_actor::Entity::find_by_notice(notice)
		.count(ctx.db())
		.await
		.expect("failed counting actors")
}

fn delivered(outcomes: &[Outcome]) -> &Outcome {
	assert_eq!(outcomes.len(), 1);
	assert!(matches!(outcomes[0], Outcome::Delivered { .. }), "expected delivery, got {outcomes:?}");
	&outcomes[0]
}

#[tokio::test]
async fn same_event_from_two_actors_bundles_into_one_notice() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	let first = ctx
		.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, None)
		.await.unwrap();
	let Outcome::Delivered { placed, .. } = delivered(&first) else { unreachable!() };
	assert!(placed.created());

	let second = ctx
		.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 3, article: 9 }, None)
		.await.unwrap();
	let Outcome::Delivered { placed, .. } = delivered(&second) else { unreachable!() };
	assert!(placed.bundled());

	let notices = notices_for(&ctx, 1).await;
	assert_eq!(notices.len(), 1);
	assert_eq!(actor_count(&ctx, notices[0].internal).await, 2);
}

#[tokio::test]
async fn read_notices_never_absorb_new_events() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, None)
		.await.unwrap();
	let first = notices_for(&ctx, 1).await.remove(0);

	model::notice::Entity::mark_read(first.internal)
		.exec(ctx.db())
		.await.unwrap();

	let outcomes = ctx
		.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 3, article: 9 }, None)
		.await.unwrap();
	let Outcome::Delivered { placed, .. } = delivered(&outcomes) else { unreachable!() };
	assert!(placed.created());
	assert_eq!(notices_for(&ctx, 1).await.len(), 2);
}

#[tokio::test]
async fn repeated_actor_attaches_once_and_resurfaces() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, None)
		.await.unwrap();
	let notice = notices_for(&ctx, 1).await.remove(0);

	// recipient reads it, then the same actor appreciates again
	model::notice::Entity::mark_read(notice.internal)
		.exec(ctx.db())
		.await.unwrap();

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, None)
		.await.unwrap();

	// read rows are not bundle targets, so this lands as a new notice
	let notices = notices_for(&ctx, 1).await;
	assert_eq!(notices.len(), 2);

	// but an unread bundle absorbs the duplicate actor without a second row
	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, None)
		.await.unwrap();
	let notices = notices_for(&ctx, 1).await;
	assert_eq!(notices.len(), 2);
	let unread: Vec<_> = notices.iter().filter(|n| n.unread).collect();
	assert_eq!(unread.len(), 1);
	assert_eq!(actor_count(&ctx, unread[0].internal).await, 1);
}

#[tokio::test]
async fn unbundled_types_always_create_rows() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	for comment in [4, 5] {
		ctx.process(&Event::ArticleNewComment { recipient: 1, actor: 2, article: 9, comment }, None)
			.await.unwrap();
	}
	// even an identical comment event gets its own row
	ctx.process(&Event::ArticleNewComment { recipient: 1, actor: 3, article: 9, comment: 4 }, None)
		.await.unwrap();

	assert_eq!(notices_for(&ctx, 1).await.len(), 3);
}

#[tokio::test]
async fn invitations_resend_instead_of_bundling() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::CircleInvitation { recipient: 1, actor: 2, circle: 7 }, None)
		.await.unwrap();
	ctx.process(&Event::CircleInvitation { recipient: 1, actor: 2, circle: 7 }, None)
		.await.unwrap();

	assert_eq!(notices_for(&ctx, 1).await.len(), 2);
}

#[tokio::test]
async fn differing_data_blocks_the_bundle() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(
		&Event::PaymentReceivedDonation { recipient: Some(1), actor: 2, transaction: 70, amount: 5, currency: "HKD".into() },
		None,
	).await.unwrap();
	ctx.process(
		&Event::PaymentReceivedDonation { recipient: Some(1), actor: 3, transaction: 70, amount: 10, currency: "HKD".into() },
		None,
	).await.unwrap();

	assert_eq!(notices_for(&ctx, 1).await.len(), 2);
}

#[tokio::test]
async fn discussion_events_merge_their_data() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::CircleMemberNewDiscussion { recipient: 1, actor: 2, circle: 7, comment: 40 }, None)
		.await.unwrap();
	let outcomes = ctx
		.process(&Event::InCircleNewDiscussionReply { recipient: 1, actor: 3, circle: 7, reply: 41 }, None)
		.await.unwrap();
	let Outcome::Delivered { placed, .. } = delivered(&outcomes) else { unreachable!() };
	assert!(placed.bundled());

	let notices = notices_for(&ctx, 1).await;
	assert_eq!(notices.len(), 1);

	let detail = model::notice_detail::Entity::find_by_id(notices[0].detail)
		.one(ctx.db())
		.await.unwrap().unwrap();
	let data = detail.data_value().unwrap().unwrap();
	assert_eq!(data["comments"][0]["id"], 40);
	assert_eq!(data["replies"][0]["id"], 41);
	assert_eq!(actor_count(&ctx, notices[0].internal).await, 2);
}

#[tokio::test]
async fn self_notifications_are_skipped() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	let outcomes = ctx
		.process(&Event::UserNewFollower { recipient: 1, actor: 1 }, None)
		.await.unwrap();
	assert_eq!(outcomes, vec![Outcome::Skipped { recipient: 1, reason: SkipReason::Ineligible }]);
	assert!(notices_for(&ctx, 1).await.is_empty());
}

#[tokio::test]
async fn disabled_preferences_silence_the_category() {
	let ctx = ctx().await;
	seed_settings_with(&ctx, 1, |s| s.new_follower = Set(false)).await;

	let outcomes = ctx
		.process(&Event::UserNewFollower { recipient: 1, actor: 2 }, None)
		.await.unwrap();
	assert_eq!(outcomes, vec![Outcome::Skipped { recipient: 1, reason: SkipReason::Ineligible }]);
}

#[tokio::test]
async fn missing_settings_row_fails_closed_except_official() {
	let ctx = ctx().await;

	// no settings row for user 1
	let outcomes = ctx
		.process(&Event::UserNewFollower { recipient: 1, actor: 2 }, None)
		.await.unwrap();
	assert_eq!(outcomes, vec![Outcome::Skipped { recipient: 1, reason: SkipReason::Ineligible }]);

	let outcomes = ctx
		.process(&Event::UserBanned { recipient: 1, locale: ctx.default_locale() }, None)
		.await.unwrap();
	delivered(&outcomes);

	let notices = notices_for(&ctx, 1).await;
	assert_eq!(notices.len(), 1);
	let detail = model::notice_detail::Entity::find_by_id(notices[0].detail)
		.one(ctx.db())
		.await.unwrap().unwrap();
	assert!(detail.message.is_some());
}

#[tokio::test]
async fn blocked_actors_are_silenced() {
	let blocks = StaticBlocks([(1, 2)].into_iter().collect());
	let ctx = ctx_with(Collaborators { blocks: Arc::new(blocks), ..Default::default() }).await;
	seed_settings(&ctx, 1).await;

	let outcomes = ctx
		.process(&Event::UserNewFollower { recipient: 1, actor: 2 }, None)
		.await.unwrap();
	assert_eq!(outcomes, vec![Outcome::Skipped { recipient: 1, reason: SkipReason::Ineligible }]);

	// the block is directional
	let outcomes = ctx
		.process(&Event::UserNewFollower { recipient: 1, actor: 3 }, None)
		.await.unwrap();
	delivered(&outcomes);
}

#[tokio::test]
async fn withdraw_before_processing_suppresses_the_tag() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.withdraw("appreciation:9").await.unwrap();

	let outcomes = ctx
		.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, Some("appreciation:9"))
		.await.unwrap();
	assert_eq!(outcomes, vec![Outcome::Skipped { recipient: 1, reason: SkipReason::Suppressed }]);
	assert!(notices_for(&ctx, 1).await.is_empty());
}

#[tokio::test]
async fn withdraw_after_processing_retracts_the_notice() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, Some("appreciation:9"))
		.await.unwrap();
	assert!(!notices_for(&ctx, 1).await[0].deleted);

	let retracted = ctx.withdraw("appreciation:9").await.unwrap();
	assert_eq!(retracted, 1);
	assert!(notices_for(&ctx, 1).await[0].deleted);

	// the registry is drained, a second withdraw retracts nothing
	assert_eq!(ctx.withdraw("appreciation:9").await.unwrap(), 0);
}

fn manual_ctx() -> (Arc<ManualClock>, Collaborators) {
	let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
	let collab = Collaborators {
		cache: Arc::new(MemoryCache::new(clock.clone())),
		clock: clock.clone(),
		..Default::default()
	};
	(clock, collab)
}

#[tokio::test]
async fn withdraw_waits_out_a_held_tag_lock() {
	let (clock, collab) = manual_ctx();
	let ctx = ctx_with(collab).await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, Some("appreciation:9"))
		.await.unwrap();

	// a consumer is mid-mutation on this tag
	assert!(ctx.cache().acquire(&lock_key("appreciation:9"), Duration::from_secs(60)).await.unwrap());

	let withdrawing = tokio::spawn({
		let ctx = ctx.clone();
		async move { ctx.withdraw("appreciation:9").await }
	});

	for _ in 0..20 {
		tokio::task::yield_now().await;
	}
	assert!(!withdrawing.is_finished());

	ctx.cache().release(&lock_key("appreciation:9")).await.unwrap();
	clock.advance(Duration::from_millis(500));

	let retracted = withdrawing.await.unwrap().unwrap();
	assert_eq!(retracted, 1);
	assert!(notices_for(&ctx, 1).await[0].deleted);
}

#[tokio::test]
async fn tagged_delivery_waits_for_a_stale_lock_to_lapse() {
	let (clock, collab) = manual_ctx();
	let ctx = ctx_with(collab).await;
	seed_settings(&ctx, 1).await;

	// a crashed consumer left the lock behind
	assert!(ctx.cache().acquire(&lock_key("appreciation:9"), Duration::from_secs(60)).await.unwrap());

	let delivering = tokio::spawn({
		let ctx = ctx.clone();
		async move {
			ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, Some("appreciation:9"))
				.await
		}
	});

	for _ in 0..20 {
		tokio::task::yield_now().await;
	}
	assert!(!delivering.is_finished());

	// the ttl lapse frees the lock and the poll interval has elapsed too
	clock.advance(Duration::from_secs(61));

	let outcomes = delivering.await.unwrap().unwrap();
	delivered(&outcomes);
	assert_eq!(notices_for(&ctx, 1).await.len(), 1);
}

#[tokio::test]
async fn retraction_count_skips_stale_registry_entries() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, Some("appreciation:9"))
		.await.unwrap();
	// registry entry for a notice that never made it to the table
	ctx.record("appreciation:9", 9999).await.unwrap();

	assert_eq!(ctx.withdraw("appreciation:9").await.unwrap(), 1);
	assert!(notices_for(&ctx, 1).await[0].deleted);
}

#[tokio::test]
async fn fresh_trigger_overrides_a_prior_withdrawal() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.withdraw("appreciation:9").await.unwrap();
	ctx.trigger(
		Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 },
		Some("appreciation:9".to_string()),
	).await;

	let job = model::job::Entity::find()
		.one(ctx.db())
		.await.unwrap()
		.expect("trigger should have queued a job");
	assert_eq!(job.tag.as_deref(), Some("appreciation:9"));

	let event: Event = serde_json::from_str(&job.payload).unwrap();
	let outcomes = ctx.process(&event, job.tag.as_deref()).await.unwrap();
	delivered(&outcomes);
}

#[tokio::test]
async fn trigger_round_trips_through_the_queue() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.trigger(Event::UserNewFollower { recipient: 1, actor: 2 }, None).await;
	ctx.trigger(Event::CommentLiked { recipient: 1, actor: 2, comment: 4 }, None).await;

	let jobs = model::job::Entity::find().all(ctx.db()).await.unwrap();
	assert_eq!(jobs.len(), 2);

	for job in jobs {
		let event: Event = serde_json::from_str(&job.payload).unwrap();
		ctx.process(&event, job.tag.as_deref()).await.unwrap();
	}
	assert_eq!(notices_for(&ctx, 1).await.len(), 2);
}

#[tokio::test]
async fn follower_lifecycle_bundles_until_read() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	// actor 2 follows: notice created, unread, one actor
	ctx.process(&Event::UserNewFollower { recipient: 1, actor: 2 }, None).await.unwrap();
	let notice = notices_for(&ctx, 1).await.remove(0);
	assert!(notice.unread);
	assert_eq!(actor_count(&ctx, notice.internal).await, 1);

	// actor 3 follows before the first is read: same notice, two actors
	ctx.process(&Event::UserNewFollower { recipient: 1, actor: 3 }, None).await.unwrap();
	assert_eq!(notices_for(&ctx, 1).await.len(), 1);
	assert_eq!(actor_count(&ctx, notice.internal).await, 2);

	// the recipient reads it, actor 4 follows: a fresh notice
	model::notice::Entity::mark_read(notice.internal)
		.exec(ctx.db())
		.await.unwrap();
	ctx.process(&Event::UserNewFollower { recipient: 1, actor: 4 }, None).await.unwrap();

	let notices = notices_for(&ctx, 1).await;
	assert_eq!(notices.len(), 2);
	let fresh = notices.iter().find(|n| n.internal != notice.internal).unwrap();
	assert!(fresh.unread);
	assert_eq!(actor_count(&ctx, fresh.internal).await, 1);
}

#[tokio::test]
async fn entity_signature_separates_targets() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 2, article: 9 }, None)
		.await.unwrap();
	// same type and recipient but another article must not join the bundle
	ctx.process(&Event::ArticleNewAppreciation { recipient: 1, actor: 3, article: 10 }, None)
		.await.unwrap();

	assert_eq!(notices_for(&ctx, 1).await.len(), 2);
}

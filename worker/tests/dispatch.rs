use sea_orm::{ActiveValue::Set, ConnectOptions, Database, EntityTrait};

use quill::{model, Collaborators, Config, Context, Event};
use quill::traits::Notifier;
use quill_migrations::{Migrator, MigratorTrait};
use quill_worker::dispatcher::{execute, JobDispatcher};

async fn ctx() -> Context {
	let mut opts = ConnectOptions::new("sqlite::memory:");
	opts.max_connections(1);
	let db = Database::connect(opts).await.expect("failed connecting to in-memory db");
	Migrator::up(&db, None).await.expect("failed applying migrations");
	Context::new(db, Config::default(), Collaborators::default())
}

async fn seed_settings(ctx: &Context, user: i64) {
	model::user_notify_setting::Entity::insert(model::user_notify_setting::ActiveModel {
		internal: sea_orm::ActiveValue::NotSet,
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
	})
		.exec(ctx.db())
		.await
		.expect("failed seeding settings");
}

#[tokio::test]
async fn triggered_events_are_polled_locked_and_executed() {
	let ctx = ctx().await;
	seed_settings(&ctx, 1).await;

	ctx.trigger(Event::UserNewFollower { recipient: 1, actor: 2 }, None).await;

	let job = ctx.poll().await.unwrap().expect("queued job should be pollable");
	assert!(ctx.lock(job.internal).await.unwrap());
	// the row is gone, a second worker cannot claim it
	assert!(!ctx.lock(job.internal).await.unwrap());

	let outcomes = execute(&ctx, &job).await.unwrap();
	assert_eq!(outcomes.len(), 1);

	let notices = model::notice::Entity::find().all(ctx.db()).await.unwrap();
	assert_eq!(notices.len(), 1);
	assert_eq!(notices[0].recipient, 1);
}

#[tokio::test]
async fn future_jobs_are_not_polled() {
	let ctx = ctx().await;

	ctx.trigger(Event::UserNewFollower { recipient: 1, actor: 2 }, None).await;
	let job = ctx.poll().await.unwrap().expect("queued job should be pollable");
	assert!(ctx.lock(job.internal).await.unwrap());

	// reinsert as a failed attempt: not_before moves into the future
	model::job::Entity::insert(job.repeat()).exec(ctx.db()).await.unwrap();
	assert!(ctx.poll().await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_payloads_surface_as_job_errors() {
	let ctx = ctx().await;

	let job = model::job::Model {
		internal: 1,
		event: "test".to_string(),
		tag: None,
		payload: "not json".to_string(),
		published: chrono::Utc::now(),
		not_before: chrono::Utc::now(),
		attempt: 0,
	};
	assert!(matches!(execute(&ctx, &job).await, Err(quill_worker::JobError::Json(_))));
}

use serde_json::json;

use crate::events::Event;
use crate::locale::Locale;
use crate::model::{EntityRole, NoticeType};

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
	#[error("failed loading entity for message interpolation: {0:?}")]
	Loader(#[from] crate::loader::LoaderError),
}

/// one subject of a notice, before entity table names are interned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
	pub role: EntityRole,
	pub table: &'static str,
	pub id: i64,
}

impl EntitySpec {
	pub fn target(table: &'static str, id: i64) -> Self {
		EntitySpec { role: EntityRole::Target, table, id }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BundleRule {
	/// never merge, every event gets its own notice
	pub disabled: bool,
	/// merge incoming data into the stored detail when bundling
	pub merge_data: bool,
	/// explicit resend, create a new notice even when a bundle target exists
	pub force_new: bool,
}

/// canonical notice specification the bundler consumes, one per event
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeParams {
	pub notice_type: NoticeType,
	pub recipients: Vec<i64>,
	pub actor: Option<i64>,
	pub entities: Vec<EntitySpec>,
	pub message: Option<String>,
	pub data: Option<serde_json::Value>,
	pub bundle: BundleRule,
}

impl NoticeParams {
	fn new(notice_type: NoticeType, recipient: i64) -> Self {
		NoticeParams {
			notice_type,
			recipients: vec![recipient],
			actor: None,
			entities: Vec::new(),
			message: None,
			data: None,
			bundle: BundleRule::default(),
		}
	}

	fn actor(mut self, actor: i64) -> Self {
		self.actor = Some(actor);
		self
	}

	fn entity(mut self, spec: EntitySpec) -> Self {
		self.entities.push(spec);
		self
	}

	fn message(mut self, message: String) -> Self {
		self.message = Some(message);
		self
	}

	fn data(mut self, data: serde_json::Value) -> Self {
		self.data = Some(data);
		self
	}

	fn no_bundle(mut self) -> Self {
		self.bundle.disabled = true;
		self
	}

	fn merged(mut self) -> Self {
		self.bundle.merge_data = true;
		self
	}

	fn resend(mut self) -> Self {
		self.bundle.force_new = true;
		self
	}
}

/// maps a raw domain event onto canonical notice params. `Ok(None)` means
/// the event cannot address anyone and the whole batch is a no-op.
#[async_trait::async_trait]
pub trait Resolver {
	async fn resolve(&self, event: &Event) -> Result<Option<NoticeParams>, ResolverError>;
}

#[async_trait::async_trait]
impl Resolver for crate::Context {
	async fn resolve(&self, event: &Event) -> Result<Option<NoticeParams>, ResolverError> {
		// closed set: every new Event variant must get an arm here, the
		// compiler refuses a partial match
		let params = match *event {
			Event::UserNewFollower { recipient, actor } =>
				NoticeParams::new(NoticeType::UserNewFollower, recipient)
					.actor(actor),

			Event::ArticlePublished { recipient, article } =>
				NoticeParams::new(NoticeType::ArticlePublished, recipient)
					.entity(EntitySpec::target("article", article)),
			Event::RevisedArticlePublished { recipient, article } =>
				NoticeParams::new(NoticeType::RevisedArticlePublished, recipient)
					.entity(EntitySpec::target("article", article)),
			Event::RevisedArticleNotPublished { recipient, article } =>
				NoticeParams::new(NoticeType::RevisedArticleNotPublished, recipient)
					.entity(EntitySpec::target("article", article)),
			Event::CircleNewArticle { recipient, circle, article } =>
				NoticeParams::new(NoticeType::CircleNewArticle, recipient)
					.entity(EntitySpec::target("article", article))
					.entity(EntitySpec { role: EntityRole::Circle, table: "circle", id: circle }),

			Event::ArticleNewAppreciation { recipient, actor, article } =>
				NoticeParams::new(NoticeType::ArticleNewAppreciation, recipient)
					.actor(actor)
					.entity(EntitySpec::target("article", article)),
			Event::ArticleNewSubscriber { recipient, actor, article } =>
				NoticeParams::new(NoticeType::ArticleNewSubscriber, recipient)
					.actor(actor)
					.entity(EntitySpec::target("article", article)),
			Event::ArticleMentionedYou { recipient, actor, article } =>
				NoticeParams::new(NoticeType::ArticleMentionedYou, recipient)
					.actor(actor)
					.entity(EntitySpec::target("article", article)),
			// every comment stays individually visible, bundling is off
			Event::ArticleNewComment { recipient, actor, article, comment } =>
				NoticeParams::new(NoticeType::ArticleNewComment, recipient)
					.actor(actor)
					.entity(EntitySpec::target("article", article))
					.entity(EntitySpec { role: EntityRole::Comment, table: "comment", id: comment })
					.no_bundle(),
			Event::CommentNewReply { recipient, actor, comment, reply } =>
				NoticeParams::new(NoticeType::CommentNewReply, recipient)
					.actor(actor)
					.entity(EntitySpec::target("comment", comment))
					.entity(EntitySpec { role: EntityRole::Reply, table: "comment", id: reply }),
			Event::CommentMentionedYou { recipient, actor, comment } =>
				NoticeParams::new(NoticeType::CommentMentionedYou, recipient)
					.actor(actor)
					.entity(EntitySpec::target("comment", comment)),
			Event::CommentLiked { recipient, actor, comment } =>
				NoticeParams::new(NoticeType::CommentLiked, recipient)
					.actor(actor)
					.entity(EntitySpec::target("comment", comment))
					.no_bundle(),

			Event::PaymentReceivedDonation { recipient, actor, transaction, amount, ref currency } => {
				let Some(recipient) = recipient else {
					tracing::warn!("donation {transaction} has no resolvable recipient, skipping");
					return Ok(None);
				};
				NoticeParams::new(NoticeType::PaymentReceivedDonation, recipient)
					.actor(actor)
					.entity(EntitySpec::target("transaction", transaction))
					.data(json!({ "amount": amount, "currency": currency }))
			},

			Event::CircleNewFollower { recipient, actor, circle } =>
				NoticeParams::new(NoticeType::CircleNewFollower, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle)),
			Event::CircleNewSubscriber { recipient, actor, circle } =>
				NoticeParams::new(NoticeType::CircleNewSubscriber, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle)),
			Event::CircleNewUnsubscriber { recipient, actor, circle } =>
				NoticeParams::new(NoticeType::CircleNewUnsubscriber, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle)),
			Event::CircleInvitation { recipient, actor, circle } =>
				NoticeParams::new(NoticeType::CircleInvitation, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle))
					.resend(),

			// the discussion family collapses into two stored types whose
			// data always reflects the latest contributing sub-event
			Event::CircleMemberNewBroadcastReply { recipient, actor, circle, reply }
			| Event::InCircleNewBroadcastReply { recipient, actor, circle, reply } =>
				NoticeParams::new(NoticeType::CircleNewBroadcastComments, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle))
					.data(json!({ "replies": [{ "id": reply }] }))
					.merged(),
			Event::CircleMemberNewDiscussion { recipient, actor, circle, comment }
			| Event::InCircleNewDiscussion { recipient, actor, circle, comment } =>
				NoticeParams::new(NoticeType::CircleNewDiscussionComments, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle))
					.data(json!({ "comments": [{ "id": comment }] }))
					.merged(),
			Event::CircleMemberNewDiscussionReply { recipient, actor, circle, reply }
			| Event::InCircleNewDiscussionReply { recipient, actor, circle, reply } =>
				NoticeParams::new(NoticeType::CircleNewDiscussionComments, recipient)
					.actor(actor)
					.entity(EntitySpec::target("circle", circle))
					.data(json!({ "replies": [{ "id": reply }] }))
					.merged(),

			Event::OfficialAnnouncement { recipient, ref message, ref link } => {
				let mut params = NoticeParams::new(NoticeType::OfficialAnnouncement, recipient)
					.message(message.clone())
					.no_bundle();
				if let Some(link) = link {
					params = params.data(json!({ "link": link }));
				}
				params
			},
			Event::UserBanned { recipient, locale } =>
				NoticeParams::new(NoticeType::UserBanned, recipient)
					.message(self.official_text(locale, "user_banned", &[]))
					.no_bundle(),
			Event::UserFrozen { recipient, locale } =>
				NoticeParams::new(NoticeType::UserFrozen, recipient)
					.message(self.official_text(locale, "user_frozen", &[]))
					.no_bundle(),
			Event::UserUnbanned { recipient, locale } =>
				NoticeParams::new(NoticeType::UserUnbanned, recipient)
					.message(self.official_text(locale, "user_unbanned", &[]))
					.no_bundle(),
			Event::ArticleBanned { recipient, article, locale } => {
				let Some(loaded) = self.loader().load("article", article).await? else {
					tracing::warn!("article {article} is gone, dropping ban notice");
					return Ok(None);
				};
				NoticeParams::new(NoticeType::ArticleBanned, recipient)
					.message(self.official_text(locale, "article_banned", &[("title", &loaded.title)]))
					.entity(EntitySpec::target("article", article))
					.no_bundle()
			},
			Event::ArticleReported { recipient, article, locale } => {
				let Some(loaded) = self.loader().load("article", article).await? else {
					tracing::warn!("article {article} is gone, dropping report notice");
					return Ok(None);
				};
				NoticeParams::new(NoticeType::ArticleReported, recipient)
					.message(self.official_text(locale, "article_reported", &[("title", &loaded.title)]))
					.entity(EntitySpec::target("article", article))
					.no_bundle()
			},
			Event::CommentBanned { recipient, comment, locale } =>
				NoticeParams::new(NoticeType::CommentBanned, recipient)
					.message(self.official_text(locale, "comment_banned", &[]))
					.entity(EntitySpec::target("comment", comment))
					.no_bundle(),
			Event::CommentReported { recipient, comment, locale } =>
				NoticeParams::new(NoticeType::CommentReported, recipient)
					.message(self.official_text(locale, "comment_reported", &[]))
					.entity(EntitySpec::target("comment", comment))
					.no_bundle(),
			Event::WriteChallengeApplied { recipient, campaign, locale } => {
				let Some(loaded) = self.loader().load("campaign", campaign).await? else {
					tracing::warn!("campaign {campaign} is gone, dropping application notice");
					return Ok(None);
				};
				NoticeParams::new(NoticeType::WriteChallengeApplied, recipient)
					.message(self.official_text(locale, "write_challenge_applied", &[("title", &loaded.title)]))
					.entity(EntitySpec::target("campaign", campaign))
					.no_bundle()
			},
		};

		Ok(Some(params))
	}
}

impl crate::Context {
	fn official_text(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> String {
		match self.locale().text(locale, key, params) {
			Some(text) => text,
			None => {
				// a missing template is a maintenance bug, deliver the key
				// rather than dropping an official notice
				tracing::error!("missing localized template '{key}' for {locale:?}");
				key.to_string()
			},
		}
	}
}

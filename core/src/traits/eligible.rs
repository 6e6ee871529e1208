use sea_orm::DatabaseTransaction;

use crate::model::{self, NoticeType};

#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
	#[error("database error while checking eligibility: {0:?}")]
	Database(#[from] sea_orm::DbErr),

	#[error("block lookup failed: {0:?}")]
	Blocks(#[from] crate::blocklist::BlockError),
}

/// preference category a stored notice type falls under. official and
/// system notices bypass the preference lookup entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCategory {
	Follow,
	Appreciation,
	ArticleSubscription,
	Mention,
	ArticleComment,
	CommentReply,
	CommentLiked,
	Donation,
	CircleFollow,
	CircleSubscription,
	CircleDiscussion,
	CircleBroadcast,
	System,
	Official,
}

impl NoticeCategory {
	pub fn of(notice_type: NoticeType) -> Self {
		match notice_type {
			NoticeType::UserNewFollower => NoticeCategory::Follow,

			NoticeType::ArticlePublished
			| NoticeType::RevisedArticlePublished
			| NoticeType::RevisedArticleNotPublished
			| NoticeType::CircleNewArticle => NoticeCategory::System,

			NoticeType::ArticleNewAppreciation => NoticeCategory::Appreciation,
			NoticeType::ArticleNewSubscriber => NoticeCategory::ArticleSubscription,
			NoticeType::ArticleMentionedYou
			| NoticeType::CommentMentionedYou => NoticeCategory::Mention,
			NoticeType::ArticleNewComment => NoticeCategory::ArticleComment,
			NoticeType::CommentNewReply => NoticeCategory::CommentReply,
			NoticeType::CommentLiked => NoticeCategory::CommentLiked,
			NoticeType::PaymentReceivedDonation => NoticeCategory::Donation,

			NoticeType::CircleNewFollower => NoticeCategory::CircleFollow,
			NoticeType::CircleNewSubscriber
			| NoticeType::CircleNewUnsubscriber
			| NoticeType::CircleInvitation => NoticeCategory::CircleSubscription,
			NoticeType::CircleNewDiscussionComments => NoticeCategory::CircleDiscussion,
			NoticeType::CircleNewBroadcastComments => NoticeCategory::CircleBroadcast,

			NoticeType::OfficialAnnouncement
			| NoticeType::UserBanned
			| NoticeType::UserFrozen
			| NoticeType::UserUnbanned
			| NoticeType::ArticleBanned
			| NoticeType::ArticleReported
			| NoticeType::CommentBanned
			| NoticeType::CommentReported
			| NoticeType::WriteChallengeApplied => NoticeCategory::Official,
		}
	}

	pub fn always_delivered(self) -> bool {
		matches!(self, NoticeCategory::System | NoticeCategory::Official)
	}

	/// whether this user's stored preferences admit the category. the
	/// master switch gates everything below it.
	pub fn allowed(self, setting: &model::user_notify_setting::Model) -> bool {
		if self.always_delivered() {
			return true;
		}
		if !setting.enabled {
			return false;
		}
		match self {
			NoticeCategory::Follow => setting.new_follower,
			NoticeCategory::Appreciation => setting.article_new_appreciation,
			NoticeCategory::ArticleSubscription => setting.article_new_subscription,
			NoticeCategory::Mention => setting.mention,
			NoticeCategory::ArticleComment => setting.article_new_comment,
			NoticeCategory::CommentReply => setting.comment_new_reply,
			NoticeCategory::CommentLiked => setting.comment_liked,
			NoticeCategory::Donation => setting.new_donation,
			NoticeCategory::CircleFollow => setting.circle_new_follower,
			NoticeCategory::CircleSubscription => setting.circle_new_subscriber,
			NoticeCategory::CircleDiscussion => setting.circle_new_discussion,
			NoticeCategory::CircleBroadcast => setting.circle_new_broadcast,
			NoticeCategory::System | NoticeCategory::Official => true,
		}
	}
}

/// per-recipient gate: self-notification, stored preference, block graph.
/// every rejection is silent success, not an error.
#[async_trait::async_trait]
pub trait Eligibility {
	async fn eligible(
		&self,
		recipient: i64,
		actor: Option<i64>,
		notice_type: NoticeType,
		tx: &DatabaseTransaction,
	) -> Result<bool, EligibilityError>;
}

#[async_trait::async_trait]
impl Eligibility for crate::Context {
	async fn eligible(
		&self,
		recipient: i64,
		actor: Option<i64>,
		notice_type: NoticeType,
		tx: &DatabaseTransaction,
	) -> Result<bool, EligibilityError> {
		if actor == Some(recipient) {
			return Ok(false);
		}

		let category = NoticeCategory::of(notice_type);
		if category.always_delivered() {
			return Ok(true);
		}

		// no settings row means the user never opted in: fail closed
		let Some(setting) = model::user_notify_setting::Entity::find_by_user(recipient)
			.one(tx)
			.await?
		else {
			return Ok(false);
		};

		if !category.allowed(&setting) {
			return Ok(false);
		}

		if let Some(actor) = actor {
			if self.blocks().blocked(recipient, actor).await? {
				return Ok(false);
			}
		}

		Ok(true)
	}
}

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// raw domain events emitted by the platform's request layer. these travel
/// through the job queue as the payload, so everything a consumer needs to
/// rebuild the notice must be carried here.
///
/// the set is closed on purpose: adding a kind means adding a resolver arm,
/// and the compiler will point at every place that needs updating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
	// recipient-only, no entities involved
	UserNewFollower { recipient: i64, actor: i64 },

	// the platform itself is the actor
	ArticlePublished { recipient: i64, article: i64 },
	RevisedArticlePublished { recipient: i64, article: i64 },
	RevisedArticleNotPublished { recipient: i64, article: i64 },
	CircleNewArticle { recipient: i64, circle: i64, article: i64 },

	// single actor interacting with one or more entities
	ArticleNewAppreciation { recipient: i64, actor: i64, article: i64 },
	ArticleNewSubscriber { recipient: i64, actor: i64, article: i64 },
	ArticleMentionedYou { recipient: i64, actor: i64, article: i64 },
	ArticleNewComment { recipient: i64, actor: i64, article: i64, comment: i64 },
	CommentNewReply { recipient: i64, actor: i64, comment: i64, reply: i64 },
	CommentMentionedYou { recipient: i64, actor: i64, comment: i64 },
	CommentLiked { recipient: i64, actor: i64, comment: i64 },
	// donations may target a recipient we cannot resolve (anonymous wallets)
	PaymentReceivedDonation { recipient: Option<i64>, actor: i64, transaction: i64, amount: i64, currency: String },

	CircleNewFollower { recipient: i64, actor: i64, circle: i64 },
	CircleNewSubscriber { recipient: i64, actor: i64, circle: i64 },
	CircleNewUnsubscriber { recipient: i64, actor: i64, circle: i64 },
	// re-inviting someone must always surface as a fresh notice
	CircleInvitation { recipient: i64, actor: i64, circle: i64 },

	// circle discussion sub-kinds, collapsed by the resolver into two
	// canonical stored types whose data merges in place
	CircleMemberNewBroadcastReply { recipient: i64, actor: i64, circle: i64, reply: i64 },
	InCircleNewBroadcastReply { recipient: i64, actor: i64, circle: i64, reply: i64 },
	CircleMemberNewDiscussion { recipient: i64, actor: i64, circle: i64, comment: i64 },
	CircleMemberNewDiscussionReply { recipient: i64, actor: i64, circle: i64, reply: i64 },
	InCircleNewDiscussion { recipient: i64, actor: i64, circle: i64, comment: i64 },
	InCircleNewDiscussionReply { recipient: i64, actor: i64, circle: i64, reply: i64 },

	// official notices: actorless, localized, delivered regardless of settings
	OfficialAnnouncement { recipient: i64, message: String, link: Option<String> },
	UserBanned { recipient: i64, locale: Locale },
	UserFrozen { recipient: i64, locale: Locale },
	UserUnbanned { recipient: i64, locale: Locale },
	ArticleBanned { recipient: i64, article: i64, locale: Locale },
	ArticleReported { recipient: i64, article: i64, locale: Locale },
	CommentBanned { recipient: i64, comment: i64, locale: Locale },
	CommentReported { recipient: i64, comment: i64, locale: Locale },
	WriteChallengeApplied { recipient: i64, campaign: i64, locale: Locale },
}

use sea_orm::entity::prelude::*;

/// canonical stored notice types. several raw event kinds collapse into one
/// of these, most visibly the circle discussion family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, serde::Serialize, serde::Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum NoticeType {
	#[sea_orm(string_value = "user_new_follower")]
	UserNewFollower,

	#[sea_orm(string_value = "article_published")]
	ArticlePublished,
	#[sea_orm(string_value = "revised_article_published")]
	RevisedArticlePublished,
	#[sea_orm(string_value = "revised_article_not_published")]
	RevisedArticleNotPublished,
	#[sea_orm(string_value = "circle_new_article")]
	CircleNewArticle,

	#[sea_orm(string_value = "article_new_appreciation")]
	ArticleNewAppreciation,
	#[sea_orm(string_value = "article_new_subscriber")]
	ArticleNewSubscriber,
	#[sea_orm(string_value = "article_mentioned_you")]
	ArticleMentionedYou,
	#[sea_orm(string_value = "article_new_comment")]
	ArticleNewComment,
	#[sea_orm(string_value = "comment_new_reply")]
	CommentNewReply,
	#[sea_orm(string_value = "comment_mentioned_you")]
	CommentMentionedYou,
	#[sea_orm(string_value = "comment_liked")]
	CommentLiked,
	#[sea_orm(string_value = "payment_received_donation")]
	PaymentReceivedDonation,

	#[sea_orm(string_value = "circle_new_follower")]
	CircleNewFollower,
	#[sea_orm(string_value = "circle_new_subscriber")]
	CircleNewSubscriber,
	#[sea_orm(string_value = "circle_new_unsubscriber")]
	CircleNewUnsubscriber,
	#[sea_orm(string_value = "circle_invitation")]
	CircleInvitation,

	#[sea_orm(string_value = "circle_new_broadcast_comments")]
	CircleNewBroadcastComments,
	#[sea_orm(string_value = "circle_new_discussion_comments")]
	CircleNewDiscussionComments,

	#[sea_orm(string_value = "official_announcement")]
	OfficialAnnouncement,
	#[sea_orm(string_value = "user_banned")]
	UserBanned,
	#[sea_orm(string_value = "user_frozen")]
	UserFrozen,
	#[sea_orm(string_value = "user_unbanned")]
	UserUnbanned,
	#[sea_orm(string_value = "article_banned")]
	ArticleBanned,
	#[sea_orm(string_value = "article_reported")]
	ArticleReported,
	#[sea_orm(string_value = "comment_banned")]
	CommentBanned,
	#[sea_orm(string_value = "comment_reported")]
	CommentReported,
	#[sea_orm(string_value = "write_challenge_applied")]
	WriteChallengeApplied,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notice_details")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub internal: i64,
	pub notice_type: NoticeType,
	/// immutable once created, exact (null-inclusive) part of the bundle key
	pub message: Option<String>,
	/// serialized json, the only detail field that may be merged in place
	pub data: Option<String>,
	pub created: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_one = "super::notice::Entity")]
	Notices,
}

impl Related<super::notice::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Notices.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn data_value(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
		match self.data {
			Some(ref raw) => Ok(Some(serde_json::from_str(raw)?)),
			None => Ok(None),
		}
	}
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
	#[default]
	En,
	ZhHans,
}

impl Locale {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"en" => Some(Locale::En),
			"zh-hans" | "zh" => Some(Locale::ZhHans),
			_ => None,
		}
	}
}

/// stateless template lookup for official notice messages. injected rather
/// than read from module globals so tests can substitute their own tables.
pub trait Localizer: Sync + Send {
	fn text(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> Option<String>;
}

/// built-in string table covering the official notice templates
pub struct BuiltinLocales;

impl Localizer for BuiltinLocales {
	fn text(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> Option<String> {
		let template = match (locale, key) {
			(Locale::En, "user_banned") => "Your account has been banned.",
			(Locale::En, "user_frozen") => "Your account has been frozen.",
			(Locale::En, "user_unbanned") => "Your account has been restored.",
			(Locale::En, "article_banned") => "Your article \"{title}\" has been archived for violating the community guidelines.",
			(Locale::En, "article_reported") => "Your article \"{title}\" has been reported by other users.",
			(Locale::En, "comment_banned") => "Your comment has been archived for violating the community guidelines.",
			(Locale::En, "comment_reported") => "Your comment has been reported by other users.",
			(Locale::En, "write_challenge_applied") => "You have joined the writing challenge \"{title}\".",

			(Locale::ZhHans, "user_banned") => "你的账户已被禁言。",
			(Locale::ZhHans, "user_frozen") => "你的账户已被冻结。",
			(Locale::ZhHans, "user_unbanned") => "你的账户已恢复正常。",
			(Locale::ZhHans, "article_banned") => "你的文章《{title}》因违反社区约章已被归档。",
			(Locale::ZhHans, "article_reported") => "你的文章《{title}》被其他用户举报。",
			(Locale::ZhHans, "comment_banned") => "你的评论因违反社区约章已被归档。",
			(Locale::ZhHans, "comment_reported") => "你的评论被其他用户举报。",
			(Locale::ZhHans, "write_challenge_applied") => "你已成功报名写作挑战《{title}》。",

			_ => return None,
		};

		let mut out = template.to_string();
		for (name, value) in params {
			out = out.replace(&format!("{{{name}}}"), value);
		}
		Some(out)
	}
}

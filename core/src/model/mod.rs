pub mod notice;
pub mod notice_detail;
pub mod notice_actor;
pub mod notice_entity;

pub mod entity_type;
pub mod user_notify_setting;
pub mod job;

pub use notice_detail::NoticeType;
pub use notice_entity::EntityRole;

pub mod member;
pub mod notification_event;

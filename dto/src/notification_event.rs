use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub enum NotificationEvent {
    /// The membership ends in `days_left` days. Negative when it has already ended.
    Expiry { days_left: i64, end_date: NaiveDate },
    Birthday,
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::Expiry { .. } => NotificationKind::Expiry,
            NotificationEvent::Birthday => NotificationKind::Birthday,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum NotificationKind {
    Expiry,
    Birthday,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Expiry => write!(f, "expiry"),
            NotificationKind::Birthday => write!(f, "birthday"),
        }
    }
}

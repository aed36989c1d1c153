use chrono::NaiveDate;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A gym member, as seen by the notification sweep.
/// Credentials and any other field the sweep doesn't need are left out.
#[derive(Debug, Serialize, Deserialize, Getters, PartialEq, Eq, Hash, Clone)]
pub struct Member {
    id: i32,
    name: String,
    mobile: String,
    birth_date: Option<NaiveDate>,
    membership_end_date: Option<NaiveDate>,
    cancelled: bool,
}

impl Member {
    pub fn new(
        id: i32,
        name: String,
        mobile: String,
        birth_date: Option<NaiveDate>,
        membership_end_date: Option<NaiveDate>,
        cancelled: bool,
    ) -> Self {
        Self {
            id,
            name,
            mobile,
            birth_date,
            membership_end_date,
            cancelled,
        }
    }

    /// Signed number of whole days between `today` and the end of the membership.
    /// Positive means days remaining, 0 means it ends today, negative means days since it ended.
    pub fn days_until_membership_end(&self, today: NaiveDate) -> Option<i64> {
        self.membership_end_date
            .map(|end_date| (end_date - today).num_days())
    }
}

#[cfg(any(test, feature = "test"))]
pub mod tests {
    use super::*;
    use chrono::Days;
    use parameterized::{ide, parameterized};

    ide!();

    pub const MEMBER_ID: i32 = 42;
    pub const MEMBER_NAME: &str = "Jon Doe";
    pub const MEMBER_MOBILE: &str = "9876543210";

    impl Member {
        pub fn new_test(
            birth_date: Option<NaiveDate>,
            membership_end_date: Option<NaiveDate>,
            cancelled: bool,
        ) -> Self {
            Member {
                id: MEMBER_ID,
                name: MEMBER_NAME.to_owned(),
                mobile: MEMBER_MOBILE.to_owned(),
                birth_date,
                membership_end_date,
                cancelled,
            }
        }

        pub fn with_id(mut self, id: i32) -> Self {
            self.id = id;
            self
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[parameterized(
        end_date = {
            today().checked_add_days(Days::new(7)).unwrap(),
            today(),
            today().checked_sub_days(Days::new(3)).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
        },
        expected_days = { 7, 0, -3, 365 }
    )]
    fn should_compute_days_until_membership_end(end_date: NaiveDate, expected_days: i64) {
        let member = Member::new_test(None, Some(end_date), false);
        assert_eq!(
            Some(expected_days),
            member.days_until_membership_end(today())
        );
    }

    #[test]
    fn should_not_compute_days_until_membership_end_when_missing() {
        let member = Member::new_test(None, None, false);
        assert_eq!(None, member.days_until_membership_end(today()));
    }
}

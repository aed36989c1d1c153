use chrono::{Datelike, NaiveDate};
use derive_getters::Getters;
use dto::member::Member;
use dto::notification_event::NotificationEvent;

pub const DEFAULT_TRIGGER_DAYS: [i64; 6] = [7, 3, 1, 0, -1, -3];

/// Decide which members get notified, and when.
#[derive(Debug, Getters, Clone, PartialEq)]
pub struct ClassificationRules {
    /// Exact day offsets to the membership end date at which an expiry notification is sent.
    /// This is not a threshold: a member is notified on these milestones only.
    trigger_days: Vec<i64>,
    /// Skip birthday wishes once the membership has ended.
    suppress_birthday_after_expiry: bool,
}

impl ClassificationRules {
    pub fn new(trigger_days: Vec<i64>, suppress_birthday_after_expiry: bool) -> Self {
        Self {
            trigger_days,
            suppress_birthday_after_expiry,
        }
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_DAYS.to_vec(), true)
    }
}

/// An event to dispatch, bound to the member it concerns.
#[derive(Debug, PartialEq, Clone)]
pub struct ClassifiedEvent<'a> {
    pub member: &'a Member,
    pub event: NotificationEvent,
}

/// Lazily classify each member of the snapshot against `today`.
/// Events of a given member are yielded together, before the next member is looked at.
pub fn classify_members<'a, I>(
    today: NaiveDate,
    members: I,
    rules: &'a ClassificationRules,
) -> impl Iterator<Item = ClassifiedEvent<'a>> + 'a
where
    I: IntoIterator<Item = &'a Member>,
    I::IntoIter: 'a,
{
    members.into_iter().flat_map(move |member| {
        classify(today, member, rules)
            .into_iter()
            .map(move |event| ClassifiedEvent { member, event })
    })
}

/// Compute the events a member should be notified of today.
/// The result only depends on the parameters.
pub fn classify(
    today: NaiveDate,
    member: &Member,
    rules: &ClassificationRules,
) -> Vec<NotificationEvent> {
    if *member.cancelled() {
        return vec![];
    }

    let mut events = Vec::with_capacity(2);
    let days_left = member.days_until_membership_end(today);
    match (days_left, member.membership_end_date()) {
        (Some(days_left), Some(end_date)) => {
            if rules.trigger_days.contains(&days_left) {
                events.push(NotificationEvent::Expiry {
                    days_left,
                    end_date: *end_date,
                });
            }
        }
        _ => warn!(
            "Member has no membership end date, skipping expiry check. [id: {}]",
            member.id()
        ),
    }

    let plan_active = days_left.is_some_and(|days_left| days_left >= 0);
    if plan_active || !rules.suppress_birthday_after_expiry {
        if let Some(birth_date) = member.birth_date() {
            if is_birthday(*birth_date, today) {
                events.push(NotificationEvent::Birthday);
            }
        }
    }

    events
}

/// Year is ignored. People born on February 29th get their wishes on February 28th in common years.
fn is_birthday(birth_date: NaiveDate, today: NaiveDate) -> bool {
    if birth_date.month() == today.month() && birth_date.day() == today.day() {
        return true;
    }

    birth_date.month() == 2
        && birth_date.day() == 29
        && today.month() == 2
        && today.day() == 28
        && NaiveDate::from_ymd_opt(today.year(), 2, 29).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use parameterized::{ide, parameterized};

    ide!();

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn in_days(days: i64) -> NaiveDate {
        if days >= 0 {
            today().checked_add_days(Days::new(days as u64)).unwrap()
        } else {
            today().checked_sub_days(Days::new(days.unsigned_abs())).unwrap()
        }
    }

    fn birthday_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 6, 10).unwrap()
    }

    // region classify
    #[parameterized(days = {7, 3, 1, 0, -1, -3})]
    fn should_emit_expiry_event_on_trigger_day(days: i64) {
        let member = Member::new_test(None, Some(in_days(days)), false);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert_eq!(
            vec![NotificationEvent::Expiry {
                days_left: days,
                end_date: in_days(days)
            }],
            result
        );
    }

    #[parameterized(days = {8, 6, 5, 4, 2, -2, -4, -30, 30})]
    fn should_not_emit_expiry_event_outside_trigger_days(days: i64) {
        let member = Member::new_test(None, Some(in_days(days)), false);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert!(result.is_empty(), "No event expected [result: {result:?}]");
    }

    #[parameterized(days = {7, 0, -3, 10})]
    fn should_not_emit_anything_when_cancelled(days: i64) {
        let member = Member::new_test(Some(birthday_today()), Some(in_days(days)), true);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert!(result.is_empty(), "No event expected [result: {result:?}]");
    }

    #[test]
    fn should_emit_expiry_event_three_days_before_end() {
        let member = Member::new_test(
            None,
            Some(NaiveDate::from_ymd_opt(2025, 6, 13).unwrap()),
            false,
        );

        let result = classify(today(), &member, &ClassificationRules::default());

        assert_eq!(
            vec![NotificationEvent::Expiry {
                days_left: 3,
                end_date: NaiveDate::from_ymd_opt(2025, 6, 13).unwrap()
            }],
            result
        );
    }

    #[test]
    fn should_emit_birthday_event_only_when_end_not_in_trigger_days() {
        let member = Member::new_test(
            Some(birthday_today()),
            Some(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()),
            false,
        );

        let result = classify(today(), &member, &ClassificationRules::default());

        assert_eq!(vec![NotificationEvent::Birthday], result);
    }

    #[test]
    fn should_not_emit_anything_when_cancelled_on_birthday_and_end_date() {
        let member = Member::new_test(Some(birthday_today()), Some(today()), true);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert!(result.is_empty(), "No event expected [result: {result:?}]");
    }

    #[test]
    fn should_suppress_birthday_when_plan_has_lapsed() {
        let end_date = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let member = Member::new_test(Some(birthday_today()), Some(end_date), false);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert_eq!(
            vec![NotificationEvent::Expiry {
                days_left: -3,
                end_date
            }],
            result
        );
    }

    #[test]
    fn should_emit_birthday_after_expiry_when_suppression_disabled() {
        let end_date = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let member = Member::new_test(Some(birthday_today()), Some(end_date), false);
        let rules = ClassificationRules::new(DEFAULT_TRIGGER_DAYS.to_vec(), false);

        let result = classify(today(), &member, &rules);

        assert_eq!(
            vec![
                NotificationEvent::Expiry {
                    days_left: -3,
                    end_date
                },
                NotificationEvent::Birthday
            ],
            result
        );
    }

    #[test]
    fn should_emit_both_events_on_birthday_and_trigger_day() {
        let member = Member::new_test(Some(birthday_today()), Some(today()), false);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert_eq!(
            vec![
                NotificationEvent::Expiry {
                    days_left: 0,
                    end_date: today()
                },
                NotificationEvent::Birthday
            ],
            result
        );
    }

    #[test]
    fn should_skip_expiry_when_end_date_is_missing() {
        let member = Member::new_test(Some(birthday_today()), None, false);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert!(result.is_empty(), "No event expected [result: {result:?}]");
    }

    #[test]
    fn should_emit_birthday_when_end_date_is_missing_and_suppression_disabled() {
        let member = Member::new_test(Some(birthday_today()), None, false);
        let rules = ClassificationRules::new(DEFAULT_TRIGGER_DAYS.to_vec(), false);

        let result = classify(today(), &member, &rules);

        assert_eq!(vec![NotificationEvent::Birthday], result);
    }

    #[test]
    fn should_not_emit_birthday_on_another_day() {
        let birth_date = NaiveDate::from_ymd_opt(1990, 6, 11).unwrap();
        let member = Member::new_test(Some(birth_date), Some(in_days(10)), false);

        let result = classify(today(), &member, &ClassificationRules::default());

        assert!(result.is_empty(), "No event expected [result: {result:?}]");
    }

    #[test]
    fn should_use_custom_trigger_days() {
        let rules = ClassificationRules::new(vec![15, 2], true);
        let notified = Member::new_test(None, Some(in_days(2)), false);
        let not_notified = Member::new_test(None, Some(in_days(3)), false);

        assert_eq!(1, classify(today(), &notified, &rules).len());
        assert!(classify(today(), &not_notified, &rules).is_empty());
    }

    #[test]
    fn should_classify_identically_when_called_twice() {
        let member = Member::new_test(Some(birthday_today()), Some(in_days(1)), false);
        let rules = ClassificationRules::default();

        assert_eq!(
            classify(today(), &member, &rules),
            classify(today(), &member, &rules)
        );
    }
    // endregion

    // region is_birthday
    #[parameterized(
        birth_date = {
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2001, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(1985, 12, 31).unwrap(),
        },
        today = {
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        },
        expected_result = {true, false, true, true, true}
    )]
    fn should_tell_whether_today_is_birthday(
        birth_date: NaiveDate,
        today: NaiveDate,
        expected_result: bool,
    ) {
        assert_eq!(expected_result, is_birthday(birth_date, today));
    }
    // endregion

    // region classify_members
    #[test]
    fn should_classify_each_member_of_the_snapshot() {
        let expiring = Member::new_test(None, Some(in_days(7)), false).with_id(1);
        let unconcerned = Member::new_test(None, Some(in_days(100)), false).with_id(2);
        let celebrating = Member::new_test(Some(birthday_today()), Some(in_days(1)), false)
            .with_id(3);
        let cancelled = Member::new_test(Some(birthday_today()), Some(today()), true).with_id(4);
        let members = vec![expiring, unconcerned, celebrating, cancelled];
        let rules = ClassificationRules::default();

        let result = classify_members(today(), &members, &rules)
            .map(|classified| (*classified.member.id(), classified.event))
            .collect::<Vec<_>>();

        assert_eq!(
            vec![
                (
                    1,
                    NotificationEvent::Expiry {
                        days_left: 7,
                        end_date: in_days(7)
                    }
                ),
                (
                    3,
                    NotificationEvent::Expiry {
                        days_left: 1,
                        end_date: in_days(1)
                    }
                ),
                (3, NotificationEvent::Birthday),
            ],
            result
        );
    }
    // endregion
}

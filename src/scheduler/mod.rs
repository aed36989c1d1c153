use crate::notification::error::SweepError;
use crate::notification::notifier::Notifier;
use crate::notification::summary::RunSummary;
use crate::notification::sweep::{MemberStore, Sweep};
use chrono::{
    DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_RUN_AT: NaiveTime = NaiveTime::MIN;
const RETRY_SCHEDULING_DELAY: Duration = Duration::from_secs(60 * 60);

/// Prevent two sweeps from running at the same time, which would notify members twice.
#[derive(Default)]
pub struct RunGuard {
    running: AtomicBool,
}

impl RunGuard {
    pub fn try_acquire(&self) -> Option<RunPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit { guard: self })
    }
}

/// Release the guard when dropped.
pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

/// Run the sweep every day at the same local time.
pub struct DailyScheduler<S, N> {
    sweep: Sweep<S, N>,
    run_at: NaiveTime,
    guard: RunGuard,
}

impl<S: MemberStore, N: Notifier> DailyScheduler<S, N> {
    pub fn new(sweep: Sweep<S, N>, run_at: NaiveTime) -> Self {
        Self {
            sweep,
            run_at,
            guard: RunGuard::default(),
        }
    }

    /// Run one sweep for the current local date, unless another one is in progress.
    pub async fn run_once(&self) -> Result<RunSummary, SweepError> {
        self.run_for(Local::now().date_naive()).await
    }

    async fn run_for(&self, today: NaiveDate) -> Result<RunSummary, SweepError> {
        let Some(_permit) = self.guard.try_acquire() else {
            warn!("A notification sweep is already running, skipping this one.");
            return Err(SweepError::AlreadyRunning);
        };

        let run_id = Uuid::new_v4();
        info!("Starting notification sweep [run: {run_id}, date: {today}]");
        match self.sweep.run(today).await {
            Ok(summary) => {
                summary.log();
                Ok(summary)
            }
            Err(error) => {
                error!("Notification sweep aborted, waiting for the next one [run: {run_id}]\n{error:#?}");
                Err(error)
            }
        }
    }

    /// Never returns: sleep until the next run time, run, repeat.
    /// A run sweeps the date it was scheduled for, whatever the wall clock says on wake up.
    pub async fn run_forever(&self) {
        let mut last_run: Option<DateTime<Local>> = None;
        loop {
            let now = Local::now();
            let Some(next_run) = next_scheduled_run(&now, last_run.as_ref(), self.run_at) else {
                error!("Can't compute next notification sweep time, trying again later.");
                tokio::time::sleep(RETRY_SCHEDULING_DELAY).await;
                continue;
            };

            info!("Next notification sweep at {next_run}");
            tokio::time::sleep((next_run - now).to_std().unwrap_or_default()).await;
            let _ = self.run_for(next_run.date_naive()).await;
            last_run = Some(next_run);
        }
    }
}

/// Next run after both `now` and the last scheduled run.
/// Waking up early, or the wall clock going backwards, never schedules the same run twice.
fn next_scheduled_run<Tz: TimeZone>(
    now: &DateTime<Tz>,
    last_run: Option<&DateTime<Tz>>,
    run_at: NaiveTime,
) -> Option<DateTime<Tz>> {
    match last_run {
        Some(last_run) if last_run > now => next_run_after(last_run, run_at),
        _ => next_run_after(now, run_at),
    }
}

/// First occurrence of `run_at` strictly after `now`, in `now`'s timezone.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, run_at: NaiveTime) -> Option<DateTime<Tz>> {
    let timezone = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..3 {
        if let Some(candidate) = resolve_local(&timezone, date.and_time(run_at)) {
            if candidate > *now {
                return Some(candidate);
            }
        }
        date = date.succ_opt()?;
    }

    None
}

/// A local time may happen twice (take the first one) or never (take it an hour later)
/// around daylight saving time changes.
fn resolve_local<Tz: TimeZone>(timezone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(date_time) => Some(date_time),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => timezone
            .from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::error::DatabaseError;
    use crate::notification::classification::ClassificationRules;
    use crate::notification::notifier::MessageTemplates;
    use crate::notification::notifier::tests::RecordingNotifier;
    use crate::notification::sweep::MemberRecord;
    use chrono::{FixedOffset, Utc};
    use dto::member::Member;
    use parameterized::{ide, parameterized};

    ide!();

    struct FakeStore {
        records: Vec<MemberRecord>,
    }

    impl MemberStore for FakeStore {
        async fn fetch_members(&self) -> Result<Vec<MemberRecord>, DatabaseError> {
            Ok(self.records.clone())
        }
    }

    fn scheduler(records: Vec<MemberRecord>) -> DailyScheduler<FakeStore, RecordingNotifier> {
        let sweep = Sweep::new(
            FakeStore { records },
            RecordingNotifier::default(),
            ClassificationRules::default(),
            MessageTemplates::default(),
            1,
        );
        DailyScheduler::new(sweep, DEFAULT_RUN_AT)
    }

    // region next_run_after
    #[parameterized(
        now = {
            (2025, 6, 10, 7, 0),
            (2025, 6, 10, 8, 0),
            (2025, 6, 10, 23, 59),
            (2025, 12, 31, 9, 0),
        },
        run_at = {(8, 0), (8, 0), (0, 0), (8, 30)},
        expected_next_run = {
            (2025, 6, 10, 8, 0),
            (2025, 6, 11, 8, 0),
            (2025, 6, 11, 0, 0),
            (2026, 1, 1, 8, 30),
        }
    )]
    fn should_compute_next_run(
        now: (i32, u32, u32, u32, u32),
        run_at: (u32, u32),
        expected_next_run: (i32, u32, u32, u32, u32),
    ) {
        let (y, m, d, h, min) = now;
        let now = Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap();
        let run_at = NaiveTime::from_hms_opt(run_at.0, run_at.1, 0).unwrap();
        let (y, m, d, h, min) = expected_next_run;
        let expected_next_run = Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap();

        assert_eq!(Some(expected_next_run), next_run_after(&now, run_at));
    }

    #[test]
    fn should_compute_next_run_in_local_timezone() {
        let timezone = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = timezone.with_ymd_and_hms(2025, 6, 10, 23, 0, 0).unwrap();

        let result = next_run_after(&now, DEFAULT_RUN_AT).unwrap();

        assert_eq!(
            timezone.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap(),
            result
        );
    }

    #[test]
    fn should_not_schedule_same_run_twice_when_waking_up_early() {
        let last_run = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();
        let early_wake_up = last_run - TimeDelta::milliseconds(1);

        let result = next_scheduled_run(&early_wake_up, Some(&last_run), DEFAULT_RUN_AT);

        assert_eq!(
            Some(Utc.with_ymd_and_hms(2025, 6, 12, 0, 0, 0).unwrap()),
            result
        );
    }

    #[test]
    fn should_schedule_from_now_once_last_run_is_past() {
        let last_run = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 1).unwrap();

        let result = next_scheduled_run(&now, Some(&last_run), DEFAULT_RUN_AT);

        assert_eq!(
            Some(Utc.with_ymd_and_hms(2025, 6, 12, 0, 0, 0).unwrap()),
            result
        );
        assert_eq!(
            Some(Utc.with_ymd_and_hms(2025, 6, 12, 0, 0, 0).unwrap()),
            next_scheduled_run(&now, None, DEFAULT_RUN_AT)
        );
    }
    // endregion

    // region RunGuard
    #[test]
    fn should_not_acquire_guard_twice() {
        let guard = RunGuard::default();

        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(guard.try_acquire().is_some());
    }
    // endregion

    // region run_once
    #[tokio::test]
    async fn should_run_once() {
        let member = Member::new(
            1,
            "Jon Doe".to_owned(),
            "9876543210".to_owned(),
            None,
            Some(Local::now().date_naive()),
            false,
        );
        let scheduler = scheduler(vec![Ok(member)]);

        let summary = scheduler.run_once().await.unwrap();

        assert_eq!(1, *summary.expiry_events());
        assert_eq!(1, *summary.sent());
    }

    #[tokio::test]
    async fn should_sweep_scheduled_date() {
        let scheduled_date = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let member = Member::new(
            1,
            "Jon Doe".to_owned(),
            "9876543210".to_owned(),
            None,
            Some(scheduled_date),
            false,
        );
        let scheduler = scheduler(vec![Ok(member)]);

        let summary = scheduler.run_for(scheduled_date).await.unwrap();

        assert_eq!(1, *summary.expiry_events());
        let sent = scheduler.sweep.notifier().sent();
        assert_eq!(1, sent.len());
        assert_eq!("0", sent[0].1.parameters()[1]);
    }

    #[tokio::test]
    async fn should_refuse_to_run_while_another_run_is_in_progress() {
        let scheduler = scheduler(vec![]);
        let _permit = scheduler.guard.try_acquire().unwrap();

        let result = scheduler.run_once().await.unwrap_err();

        assert_eq!(SweepError::AlreadyRunning, result);
    }
    // endregion
}

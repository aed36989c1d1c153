use crate::database::error::MemberError;
use crate::notification::notifier::DispatchOutcome;
use derive_getters::Getters;
use dto::notification_event::NotificationKind;

/// What happened to a single notification event.
#[derive(Debug, Getters, PartialEq, Clone)]
pub struct DispatchReport {
    member_id: i32,
    kind: NotificationKind,
    outcome: DispatchOutcome,
}

impl DispatchReport {
    pub fn new(member_id: i32, kind: NotificationKind, outcome: DispatchOutcome) -> Self {
        Self {
            member_id,
            kind,
            outcome,
        }
    }
}

#[derive(Debug, Getters, PartialEq, Clone)]
pub struct DispatchFailure {
    member_id: i32,
    kind: NotificationKind,
    reason: String,
}

/// Counters of one sweep. Only logged, never persisted.
#[derive(Debug, Default, Getters, PartialEq)]
pub struct RunSummary {
    members_evaluated: usize,
    member_errors: Vec<MemberError>,
    expiry_events: usize,
    birthday_events: usize,
    sent: usize,
    skipped: usize,
    failures: Vec<DispatchFailure>,
}

impl RunSummary {
    pub(crate) fn record_member_evaluated(&mut self) {
        self.members_evaluated += 1;
    }

    pub(crate) fn record_member_error(&mut self, error: MemberError) {
        self.member_errors.push(error);
    }

    pub(crate) fn record_dispatch(&mut self, report: DispatchReport) {
        match report.kind {
            NotificationKind::Expiry => self.expiry_events += 1,
            NotificationKind::Birthday => self.birthday_events += 1,
        }
        match report.outcome {
            DispatchOutcome::Sent => self.sent += 1,
            DispatchOutcome::Skipped(_) => self.skipped += 1,
            DispatchOutcome::Failed(reason) => self.failures.push(DispatchFailure {
                member_id: report.member_id,
                kind: report.kind,
                reason,
            }),
        }
    }

    #[cfg(test)]
    pub fn events(&self) -> usize {
        self.expiry_events + self.birthday_events
    }

    pub fn log(&self) {
        info!(
            "Notification sweep done. [members evaluated: {}, members in error: {}, expiry events: {}, birthday events: {}, sent: {}, skipped: {}, failed: {}]",
            self.members_evaluated,
            self.member_errors.len(),
            self.expiry_events,
            self.birthday_events,
            self.sent,
            self.skipped,
            self.failures.len()
        );
        for failure in &self.failures {
            debug!(
                "Failed {} notification [member: {}, reason: {}]",
                failure.kind, failure.member_id, failure.reason
            );
        }
    }
}

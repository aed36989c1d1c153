use crate::database::error::{DatabaseError, MemberError};
use crate::notification::classification::{ClassificationRules, ClassifiedEvent, classify_members};
use crate::notification::error::SweepError;
use crate::notification::notifier::{DispatchOutcome, MessageTemplates, Notifier, TemplateMessage};
use crate::notification::summary::{DispatchReport, RunSummary};
use chrono::NaiveDate;
use dto::member::Member;
use futures::StreamExt;
use futures::stream;
use std::future::Future;

pub const MAX_CONCURRENT_SENDS: usize = 10;

/// A member as read from the store, or the reason why it can't be used.
pub type MemberRecord = Result<Member, MemberError>;

pub trait MemberStore {
    /// Read a full snapshot of the members.
    fn fetch_members(
        &self,
    ) -> impl Future<Output = Result<Vec<MemberRecord>, DatabaseError>> + Send;
}

/// The daily sweep: read all members, find who should be notified and notify them.
pub struct Sweep<S, N> {
    store: S,
    notifier: N,
    rules: ClassificationRules,
    templates: MessageTemplates,
    max_concurrent_sends: usize,
}

impl<S: MemberStore, N: Notifier> Sweep<S, N> {
    pub fn new(
        store: S,
        notifier: N,
        rules: ClassificationRules,
        templates: MessageTemplates,
        max_concurrent_sends: usize,
    ) -> Self {
        Self {
            store,
            notifier,
            rules,
            templates,
            max_concurrent_sends: max_concurrent_sends.clamp(1, MAX_CONCURRENT_SENDS),
        }
    }

    #[cfg(test)]
    pub(crate) fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run the sweep for `today`.
    /// Only an unreadable snapshot makes it fail: errors related to a member or a message are
    /// logged, then collected in the summary.
    pub async fn run(&self, today: NaiveDate) -> Result<RunSummary, SweepError> {
        let records = self
            .store
            .fetch_members()
            .await
            .map_err(SweepError::StoreUnavailable)?;

        let mut summary = RunSummary::default();
        let mut members = Vec::with_capacity(records.len());
        for record in records {
            match record {
                Ok(member) => {
                    summary.record_member_evaluated();
                    members.push(member);
                }
                Err(error) => {
                    warn!("Skipping member: {error}");
                    summary.record_member_error(error);
                }
            }
        }

        let reports = stream::iter(classify_members(today, &members, &self.rules))
            .map(|classified| self.dispatch(classified))
            .buffer_unordered(self.max_concurrent_sends)
            .collect::<Vec<_>>()
            .await;
        for report in reports {
            summary.record_dispatch(report);
        }

        Ok(summary)
    }

    async fn dispatch(&self, classified: ClassifiedEvent<'_>) -> DispatchReport {
        let ClassifiedEvent { member, event } = classified;
        let kind = event.kind();
        let message = TemplateMessage::for_event(&self.templates, member, &event);
        let outcome = self.notifier.send(member.mobile(), &message).await;
        match &outcome {
            DispatchOutcome::Sent => {}
            DispatchOutcome::Skipped(reason) => {
                debug!(
                    "Skipped {kind} notification [member: {}, reason: {reason}]",
                    member.id()
                )
            }
            DispatchOutcome::Failed(reason) => {
                error!(
                    "Couldn't send {kind} notification [member: {}, name: {}, reason: {reason}]",
                    member.id(),
                    member.name()
                )
            }
        }

        DispatchReport::new(*member.id(), kind, outcome)
    }
}

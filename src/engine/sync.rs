use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::diff::{GroupUpdate, ReplacementPlan};
use crate::model::GroupSummary;
use crate::remote::{MembershipRemote, UpdateError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub group_id: String,
    pub error: String,
}

/// Aggregate result of a member-centric batch. Partial failure is reported
/// through the counts, never as an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failure_count == 0
    }

    pub fn attempted(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// Applies plans against the authority. Never retries and never refreshes;
/// refreshing is the caller's job.
pub struct SyncOrchestrator<'a, R: ?Sized> {
    remote: &'a R,
}

impl<'a, R> SyncOrchestrator<'a, R>
where
    R: MembershipRemote + ?Sized,
{
    pub fn new(remote: &'a R) -> Self {
        Self { remote }
    }

    /// Exactly one full-replace call.
    pub async fn apply_group_plan(&self, plan: &ReplacementPlan) -> Result<(), UpdateError> {
        let res = self
            .remote
            .set_group_members(&plan.group_id, &plan.target_members)
            .await;
        match &res {
            Ok(()) => info!(
                group_id = %plan.group_id,
                members = plan.target_members.len(),
                "group membership replaced"
            ),
            Err(err) => warn!(group_id = %plan.group_id, error = %err, "group sync rejected"),
        }
        res
    }

    /// Issues every update at once and waits for all of them to settle. A
    /// failed update never cancels its siblings.
    pub async fn apply_member_plan(&self, updates: &[GroupUpdate]) -> BatchOutcome {
        if updates.is_empty() {
            debug!("member plan is empty; nothing to send");
            return BatchOutcome::default();
        }

        let calls = updates.iter().map(|u| async move {
            let res = self
                .remote
                .set_group_members(&u.group_id, &u.new_member_set)
                .await;
            (u, res)
        });

        let mut outcome = BatchOutcome::default();
        for (update, res) in join_all(calls).await {
            match res {
                Ok(()) => outcome.success_count += 1,
                Err(err) => {
                    warn!(
                        group_id = %update.group_id,
                        change = ?update.change,
                        error = %err,
                        "group update failed"
                    );
                    outcome.failure_count += 1;
                    outcome.failures.push(BatchFailure {
                        group_id: update.group_id.clone(),
                        error: err.message(),
                    });
                }
            }
        }
        info!(
            succeeded = outcome.success_count,
            failed = outcome.failure_count,
            "member batch settled"
        );
        outcome
    }

    pub async fn create_group(
        &self,
        name: &str,
        is_private: bool,
    ) -> Result<GroupSummary, UpdateError> {
        let res = self.remote.create_group(name, is_private).await;
        match &res {
            Ok(g) => info!(group_id = %g.id, name = %g.name, "group created"),
            Err(err) => warn!(name, error = %err, "group creation rejected"),
        }
        res
    }

    pub async fn archive_group(&self, group_id: &str) -> Result<(), UpdateError> {
        let res = self.remote.archive_group(group_id).await;
        match &res {
            Ok(()) => info!(group_id, "group archived"),
            Err(err) => warn!(group_id, error = %err, "group archive rejected"),
        }
        res
    }
}

#[cfg(test)]
#[path = "../tests/engine/sync_tests.rs"]
mod tests;

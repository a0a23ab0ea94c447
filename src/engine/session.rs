use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::diff::{GroupUpdate, ReplacementPlan, diff_for_group, diff_for_member};
use super::entity_store::EntityStore;
use super::selection::{ReconcileReport, SelectionTracker};
use super::sync::{BatchOutcome, SyncOrchestrator};
use crate::model::{Group, GroupSummary, Member, Snapshot};
use crate::remote::{FetchError, MembershipRemote, UpdateError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Refresh,
    SyncGroup,
    SyncMember,
    CreateGroup,
    ArchiveGroup,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Refresh => "refresh",
            Action::SyncGroup => "group sync",
            Action::SyncMember => "member sync",
            Action::CreateGroup => "group creation",
            Action::ArchiveGroup => "group archive",
        }
    }
}

/// One guard per action kind. Different kinds may run side by side; the same
/// kind may not start again until it settles.
#[derive(Debug, Default)]
pub struct InFlight {
    active: HashSet<Action>,
}

impl InFlight {
    pub fn try_begin(&mut self, action: Action) -> bool {
        self.active.insert(action)
    }

    pub fn finish(&mut self, action: Action) {
        self.active.remove(&action);
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.active.contains(&action)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn success(text: String) -> Self {
        Self {
            kind: StatusKind::Success,
            text,
        }
    }

    fn warning(text: String) -> Self {
        Self {
            kind: StatusKind::Warning,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            kind: StatusKind::Error,
            text,
        }
    }
}

/// The operator's in-progress "new group" input. Survives failed attempts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateGroupForm {
    pub name: String,
    pub is_private: bool,
}

/// The operator's answer to "archive this group?", obtained by the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Granted,
    Declined,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{} already in progress", .0.label())]
    Busy(Action),

    #[error("no group selected")]
    NoGroupFocused,

    #[error("no member selected")]
    NoMemberFocused,

    #[error("group name is required")]
    EmptyGroupName,

    #[error("archive was not confirmed")]
    NotConfirmed,
}

enum PendingKind {
    SyncGroup {
        group_name: String,
        plan: ReplacementPlan,
    },
    SyncMember {
        member_name: String,
        updates: Vec<GroupUpdate>,
    },
    CreateGroup {
        form: CreateGroupForm,
    },
    ArchiveGroup {
        group_id: String,
        group_name: String,
    },
}

/// A planned, guarded action that can run without borrowing the session.
///
/// Hand the resulting [`ActionReport`] back to [`Session::complete`].
pub struct PendingAction<R: ?Sized> {
    remote: Arc<R>,
    kind: PendingKind,
}

impl<R> PendingAction<R>
where
    R: MembershipRemote + ?Sized,
{
    pub fn action(&self) -> Action {
        match &self.kind {
            PendingKind::SyncGroup { .. } => Action::SyncGroup,
            PendingKind::SyncMember { .. } => Action::SyncMember,
            PendingKind::CreateGroup { .. } => Action::CreateGroup,
            PendingKind::ArchiveGroup { .. } => Action::ArchiveGroup,
        }
    }

    pub fn replacement_plan(&self) -> Option<&ReplacementPlan> {
        match &self.kind {
            PendingKind::SyncGroup { plan, .. } => Some(plan),
            _ => None,
        }
    }

    pub fn member_updates(&self) -> Option<&[GroupUpdate]> {
        match &self.kind {
            PendingKind::SyncMember { updates, .. } => Some(updates),
            _ => None,
        }
    }

    pub async fn run(self) -> ActionReport {
        let orchestrator = SyncOrchestrator::new(&*self.remote);
        match self.kind {
            PendingKind::SyncGroup { group_name, plan } => {
                let result = orchestrator.apply_group_plan(&plan).await;
                ActionReport::GroupSynced {
                    group_id: plan.group_id,
                    group_name,
                    result,
                }
            }
            PendingKind::SyncMember {
                member_name,
                updates,
            } => {
                let outcome = orchestrator.apply_member_plan(&updates).await;
                ActionReport::MemberSynced {
                    member_name,
                    outcome,
                }
            }
            PendingKind::CreateGroup { form } => {
                let result = orchestrator
                    .create_group(form.name.trim(), form.is_private)
                    .await;
                ActionReport::GroupCreated { form, result }
            }
            PendingKind::ArchiveGroup {
                group_id,
                group_name,
            } => {
                let result = orchestrator.archive_group(&group_id).await;
                ActionReport::GroupArchived {
                    group_id,
                    group_name,
                    result,
                }
            }
        }
    }
}

/// How a finished action turned out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionReport {
    GroupSynced {
        group_id: String,
        group_name: String,
        result: Result<(), UpdateError>,
    },
    MemberSynced {
        member_name: String,
        outcome: BatchOutcome,
    },
    GroupCreated {
        form: CreateGroupForm,
        result: Result<GroupSummary, UpdateError>,
    },
    GroupArchived {
        group_id: String,
        group_name: String,
        result: Result<(), UpdateError>,
    },
}

impl ActionReport {
    pub fn action(&self) -> Action {
        match self {
            ActionReport::GroupSynced { .. } => Action::SyncGroup,
            ActionReport::MemberSynced { .. } => Action::SyncMember,
            ActionReport::GroupCreated { .. } => Action::CreateGroup,
            ActionReport::GroupArchived { .. } => Action::ArchiveGroup,
        }
    }

    /// A failed create leaves nothing to re-read. Everything else is followed
    /// by a full reload, successful or not.
    pub fn needs_refresh(&self) -> bool {
        !matches!(
            self,
            ActionReport::GroupCreated { result: Err(_), .. }
        )
    }

    pub fn is_success(&self) -> bool {
        self.status().kind == StatusKind::Success
    }

    pub fn status(&self) -> StatusMessage {
        match self {
            ActionReport::GroupSynced {
                group_name,
                result: Ok(()),
                ..
            } => StatusMessage::success(format!("members of #{} synced", group_name)),
            ActionReport::GroupSynced {
                group_name,
                result: Err(err),
                ..
            } => StatusMessage::error(format!("sync of #{} failed: {}", group_name, err)),

            ActionReport::MemberSynced {
                member_name,
                outcome,
            } => {
                if outcome.attempted() == 0 {
                    StatusMessage::success(format!("{}: no membership changes", member_name))
                } else if outcome.is_clean() {
                    StatusMessage::success(format!(
                        "{}: {} group(s) updated",
                        member_name, outcome.success_count
                    ))
                } else {
                    StatusMessage::warning(format!(
                        "{}: {} group(s) updated, {} failed",
                        member_name, outcome.success_count, outcome.failure_count
                    ))
                }
            }

            ActionReport::GroupCreated { result: Ok(g), .. } => {
                StatusMessage::success(format!("group #{} created", g.name))
            }
            ActionReport::GroupCreated {
                result: Err(err), ..
            } => StatusMessage::error(format!("could not create group: {}", err)),

            ActionReport::GroupArchived {
                group_name,
                result: Ok(()),
                ..
            } => StatusMessage::success(format!("group #{} archived", group_name)),
            ActionReport::GroupArchived {
                group_name,
                result: Err(err),
                ..
            } => StatusMessage::error(format!("could not archive #{}: {}", group_name, err)),
        }
    }
}

/// Result of feeding a fetch back into the session.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub result: Result<ReconcileReport, FetchError>,

    /// Another refresh was requested while this one ran; the caller should
    /// fetch again (the guard is already held).
    pub again: bool,
}

/// The operator's working state: snapshot, focus, in-flight guards, status
/// line and the new-group form.
pub struct Session<R: ?Sized> {
    remote: Arc<R>,
    store: EntityStore,
    selection: SelectionTracker,
    in_flight: InFlight,
    refresh_queued: bool,
    status: Option<StatusMessage>,
    create_form: CreateGroupForm,
}

impl<R> Session<R>
where
    R: MembershipRemote + ?Sized,
{
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            store: EntityStore::new(),
            selection: SelectionTracker::new(),
            in_flight: InFlight::default(),
            refresh_queued: false,
            status: None,
            create_form: CreateGroupForm::default(),
        }
    }

    pub fn remote(&self) -> Arc<R> {
        Arc::clone(&self.remote)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn create_form(&self) -> &CreateGroupForm {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut CreateGroupForm {
        &mut self.create_form
    }

    pub fn select_group(&mut self, id: &str) {
        self.selection.select_group(id);
    }

    pub fn select_member(&mut self, id: &str) {
        self.selection.select_member(id);
    }

    pub fn focused_group(&self) -> Option<&Group> {
        self.selection.focused_group(self.store.current())
    }

    pub fn focused_member(&self) -> Option<&Member> {
        self.selection.focused_member(self.store.current())
    }

    /// Takes the refresh guard. Returns false when a refresh is already
    /// running; that one will be repeated once it lands.
    pub fn request_refresh(&mut self) -> bool {
        if self.in_flight.try_begin(Action::Refresh) {
            true
        } else {
            debug!("refresh already in flight; queueing another");
            self.refresh_queued = true;
            false
        }
    }

    /// Installs a fetch started after [`Session::request_refresh`].
    pub fn finish_refresh(&mut self, fetched: Result<Snapshot, FetchError>) -> RefreshOutcome {
        let loaded = self.store.install(fetched).map(|_| ());
        self.after_load(loaded)
    }

    /// Fetches now and installs the result.
    pub async fn refresh(&mut self) -> Result<ReconcileReport, FetchError> {
        self.in_flight.try_begin(Action::Refresh);
        loop {
            let loaded = self.store.load(&*self.remote).await.map(|_| ());
            let outcome = self.after_load(loaded);
            if !outcome.again {
                return outcome.result;
            }
        }
    }

    fn after_load(&mut self, loaded: Result<(), FetchError>) -> RefreshOutcome {
        let result = match loaded {
            Ok(()) => {
                let report = self.selection.reconcile(self.store.current());
                if report.any_cleared() {
                    info!(
                        group_cleared = report.group_cleared,
                        member_cleared = report.member_cleared,
                        "focus dropped after refresh"
                    );
                }
                Ok(report)
            }
            Err(err) => {
                self.status = Some(StatusMessage::error(format!(
                    "could not load directory data: {}",
                    err
                )));
                Err(err)
            }
        };

        self.in_flight.finish(Action::Refresh);
        let again = std::mem::take(&mut self.refresh_queued);
        if again {
            self.in_flight.try_begin(Action::Refresh);
        }
        RefreshOutcome { result, again }
    }

    pub fn prepare_group_sync(
        &mut self,
        checked_member_ids: BTreeSet<String>,
    ) -> Result<PendingAction<R>, SessionError> {
        let group = self
            .selection
            .focused_group(self.store.current())
            .ok_or(SessionError::NoGroupFocused)?;
        let plan = diff_for_group(group, &checked_member_ids);
        let group_name = group.name.clone();
        self.begin(Action::SyncGroup)?;
        Ok(self.pending(PendingKind::SyncGroup { group_name, plan }))
    }

    pub fn prepare_member_sync(
        &mut self,
        checked_group_ids: BTreeSet<String>,
    ) -> Result<PendingAction<R>, SessionError> {
        let snapshot = self.store.current();
        let member = self
            .selection
            .focused_member(snapshot)
            .ok_or(SessionError::NoMemberFocused)?;
        let updates = diff_for_member(&member.id, &checked_group_ids, &snapshot.groups);
        let member_name = member.name.clone();
        self.begin(Action::SyncMember)?;
        Ok(self.pending(PendingKind::SyncMember {
            member_name,
            updates,
        }))
    }

    /// Plans creation from the current form. The form itself is only cleared
    /// once the authority accepts it.
    pub fn prepare_create_group(&mut self) -> Result<PendingAction<R>, SessionError> {
        if self.create_form.name.trim().is_empty() {
            return Err(SessionError::EmptyGroupName);
        }
        self.begin(Action::CreateGroup)?;
        let form = self.create_form.clone();
        Ok(self.pending(PendingKind::CreateGroup { form }))
    }

    /// The group an archive would hit, for the confirmation prompt.
    pub fn archive_target(&self) -> Option<&Group> {
        self.focused_group()
    }

    pub fn prepare_archive(
        &mut self,
        confirmation: Confirmation,
    ) -> Result<PendingAction<R>, SessionError> {
        let group = self
            .selection
            .focused_group(self.store.current())
            .ok_or(SessionError::NoGroupFocused)?;
        if confirmation != Confirmation::Granted {
            return Err(SessionError::NotConfirmed);
        }
        let group_id = group.id.clone();
        let group_name = group.name.clone();
        self.begin(Action::ArchiveGroup)?;
        Ok(self.pending(PendingKind::ArchiveGroup {
            group_id,
            group_name,
        }))
    }

    /// Records a finished action: releases its guard, updates focus and form,
    /// sets the status line. Returns whether a refresh must follow.
    pub fn complete(&mut self, report: &ActionReport) -> bool {
        self.in_flight.finish(report.action());

        match report {
            ActionReport::GroupArchived {
                group_id,
                result: Ok(()),
                ..
            } => {
                // The group is about to vanish; drop focus before the reload.
                if self.selection.focus().group_id.as_deref() == Some(group_id.as_str()) {
                    self.selection.clear_group();
                }
            }
            ActionReport::GroupCreated { result: Ok(_), .. } => {
                self.create_form = CreateGroupForm::default();
            }
            _ => {}
        }

        self.status = Some(report.status());
        report.needs_refresh()
    }

    /// [`Session::complete`] followed by the refresh it calls for.
    pub async fn settle(&mut self, report: ActionReport) -> ActionReport {
        if self.complete(&report) {
            // A failed reload reports itself through the status line.
            let _ = self.refresh().await;
        }
        report
    }

    pub async fn sync_group(
        &mut self,
        checked_member_ids: BTreeSet<String>,
    ) -> Result<ActionReport, SessionError> {
        let pending = self.prepare_group_sync(checked_member_ids)?;
        let report = pending.run().await;
        Ok(self.settle(report).await)
    }

    pub async fn sync_member(
        &mut self,
        checked_group_ids: BTreeSet<String>,
    ) -> Result<ActionReport, SessionError> {
        let pending = self.prepare_member_sync(checked_group_ids)?;
        let report = pending.run().await;
        Ok(self.settle(report).await)
    }

    pub async fn create_group(
        &mut self,
        form: CreateGroupForm,
    ) -> Result<ActionReport, SessionError> {
        self.create_form = form;
        let pending = self.prepare_create_group()?;
        let report = pending.run().await;
        Ok(self.settle(report).await)
    }

    pub async fn archive_focused_group(
        &mut self,
        confirmation: Confirmation,
    ) -> Result<ActionReport, SessionError> {
        let pending = self.prepare_archive(confirmation)?;
        let report = pending.run().await;
        Ok(self.settle(report).await)
    }

    fn begin(&mut self, action: Action) -> Result<(), SessionError> {
        if self.in_flight.try_begin(action) {
            Ok(())
        } else {
            Err(SessionError::Busy(action))
        }
    }

    fn pending(&self, kind: PendingKind) -> PendingAction<R> {
        PendingAction {
            remote: Arc::clone(&self.remote),
            kind,
        }
    }
}

#[cfg(test)]
#[path = "../tests/engine/session_tests.rs"]
mod tests;

use tracing::debug;

use crate::model::{Group, Member, Snapshot};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Focus {
    pub group_id: Option<String>,
    pub member_id: Option<String>,
}

/// What [`SelectionTracker::reconcile`] had to drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub group_cleared: bool,
    pub member_cleared: bool,
}

impl ReconcileReport {
    pub fn any_cleared(&self) -> bool {
        self.group_cleared || self.member_cleared
    }
}

/// Tracks the focused group and the focused member.
///
/// The two focuses never influence each other, and neither outlives the
/// entity it points at.
#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    focus: Focus,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn select_group(&mut self, id: &str) {
        self.focus.group_id = Some(id.to_string());
    }

    pub fn select_member(&mut self, id: &str) {
        self.focus.member_id = Some(id.to_string());
    }

    pub fn clear_group(&mut self) {
        self.focus.group_id = None;
    }

    pub fn clear_member(&mut self) {
        self.focus.member_id = None;
    }

    /// Drops any focus whose referent is missing from `snapshot`.
    pub fn reconcile(&mut self, snapshot: &Snapshot) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if let Some(id) = &self.focus.group_id
            && !snapshot.contains_group(id)
        {
            debug!(group_id = %id, "group focus cleared");
            self.focus.group_id = None;
            report.group_cleared = true;
        }

        if let Some(id) = &self.focus.member_id
            && !snapshot.contains_member(id)
        {
            debug!(member_id = %id, "member focus cleared");
            self.focus.member_id = None;
            report.member_cleared = true;
        }

        report
    }

    /// The focused group, resolved against `snapshot`. A dangling focus
    /// resolves to nothing even before `reconcile` runs.
    pub fn focused_group<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Group> {
        self.focus
            .group_id
            .as_deref()
            .and_then(|id| snapshot.group(id))
    }

    pub fn focused_member<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Member> {
        self.focus
            .member_id
            .as_deref()
            .and_then(|id| snapshot.member(id))
    }
}

#[cfg(test)]
#[path = "../tests/engine/selection_tests.rs"]
mod tests;

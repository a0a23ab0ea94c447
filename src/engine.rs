//! The membership reconciliation engine.
//!
//! A refresh replaces the [`EntityStore`] snapshot and runs
//! [`SelectionTracker::reconcile`]; the operator's check set for the focused
//! entity goes through [`diff`] into a plan; [`SyncOrchestrator`] applies it;
//! the caller refreshes again. [`Session`] strings these steps together and
//! owns the per-action in-flight guards and status line.

mod derived;
mod diff;
mod entity_store;
mod selection;
mod session;
mod sync;

pub use self::derived::{CheckSet, apply_select_all, compute_select_all};
pub use self::diff::{
    GroupUpdate, MembershipChange, ReplacementPlan, diff_for_group, diff_for_member,
};
pub use self::entity_store::EntityStore;
pub use self::selection::{Focus, ReconcileReport, SelectionTracker};
pub use self::session::{
    Action, ActionReport, Confirmation, CreateGroupForm, InFlight, PendingAction, RefreshOutcome,
    Session, SessionError, StatusKind, StatusMessage,
};
pub use self::sync::{BatchFailure, BatchOutcome, SyncOrchestrator};

pub use crate::remote::{FetchError, UpdateError};

//! Membership reconciliation between groups and members mirrored from a
//! remote directory.
//!
//! The [`engine`] owns the snapshot, focus and sync logic; [`remote`] talks
//! to the directory authority; [`store`] persists connection settings.

pub mod engine;
pub mod model;
pub mod remote;
pub mod store;
pub mod tui;

mod tui_shell;

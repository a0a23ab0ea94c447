use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tokio::sync::mpsc;

use crate::engine::{
    Action, ActionReport, CheckSet, Confirmation, PendingAction, Session, SessionError,
    StatusKind,
};
use crate::model::Snapshot;
use crate::remote::{FetchError, MembershipRemote};

mod app;
use app::{App, Pane, ViewKind};

mod input;
use input::Input;

mod modal;
use modal::Modal;

pub(crate) fn run(opts: crate::tui::TuiRunOptions) -> Result<()> {
    app::runtime::run(opts)
}

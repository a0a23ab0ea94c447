use super::*;

mod event_loop;
pub(super) use event_loop::handle_key;
mod render;
pub(super) mod runtime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum ViewKind {
    ByGroup,
    ByMember,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum Pane {
    List,
    Editor,
}

/// Work finished on the runtime, handed back to the UI thread.
pub(in crate::tui_shell) enum TaskResult {
    Fetched(Result<Snapshot, FetchError>),
    Finished(ActionReport),
}

pub(in crate::tui_shell) struct App {
    pub(in crate::tui_shell) session: Session<dyn MembershipRemote>,
    tasks: tokio::runtime::Handle,
    tx: mpsc::UnboundedSender<TaskResult>,
    rx: mpsc::UnboundedReceiver<TaskResult>,

    pub(in crate::tui_shell) remote_label: String,
    pub(in crate::tui_shell) view: ViewKind,
    pub(in crate::tui_shell) pane: Pane,
    pub(in crate::tui_shell) list_cursor: usize,

    // Row 0 is the select-all box; entries start at 1.
    pub(in crate::tui_shell) editor_cursor: usize,

    /// Checkboxes for the focused entity of the current view.
    pub(in crate::tui_shell) checks: Option<CheckSet>,

    // Entity id and membership `checks` was last rendered from.
    checks_basis: Option<(String, BTreeSet<String>)>,

    pub(in crate::tui_shell) modal: Option<Modal>,

    /// Local feedback that is not an action outcome (e.g. "busy").
    pub(in crate::tui_shell) notice: Option<String>,

    pub(in crate::tui_shell) quit: bool,
}

impl App {
    pub(in crate::tui_shell) fn new(
        remote: Arc<dyn MembershipRemote>,
        remote_label: String,
        tasks: tokio::runtime::Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(remote),
            tasks,
            tx,
            rx,
            remote_label,
            view: ViewKind::ByGroup,
            pane: Pane::List,
            list_cursor: 0,
            editor_cursor: 0,
            checks: None,
            checks_basis: None,
            modal: None,
            notice: None,
            quit: false,
        }
    }

    pub(in crate::tui_shell) fn start_refresh(&mut self) {
        if self.session.request_refresh() {
            self.spawn_fetch();
        }
    }

    fn spawn_fetch(&self) {
        let remote = self.session.remote();
        let tx = self.tx.clone();
        self.tasks.spawn(async move {
            let fetched = remote.fetch_all().await;
            let _ = tx.send(TaskResult::Fetched(fetched));
        });
    }

    fn spawn_action(&self, pending: PendingAction<dyn MembershipRemote>) {
        let tx = self.tx.clone();
        self.tasks.spawn(async move {
            let report = pending.run().await;
            let _ = tx.send(TaskResult::Finished(report));
        });
    }

    /// Applies every result that has arrived, without blocking.
    pub(in crate::tui_shell) fn drain_tasks(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.on_task_result(result);
        }
    }

    /// Waits for the next background result and applies it.
    #[cfg(test)]
    pub(in crate::tui_shell) async fn settle_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(result) => {
                self.on_task_result(result);
                true
            }
            None => false,
        }
    }

    pub(in crate::tui_shell) fn on_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Fetched(fetched) => {
                let outcome = self.session.finish_refresh(fetched);
                if outcome.again {
                    self.spawn_fetch();
                }
                self.rerender_checks();
            }
            TaskResult::Finished(report) => {
                self.notice = None;
                match &report {
                    ActionReport::GroupCreated { result: Ok(_), .. } => {
                        if matches!(self.modal, Some(Modal::CreateGroup { .. })) {
                            self.modal = None;
                        }
                    }
                    ActionReport::GroupCreated { result: Err(_), .. } => {
                        if let Some(Modal::CreateGroup {
                            error, submitting, ..
                        }) = self.modal.as_mut()
                        {
                            *error = Some(report.status().text);
                            *submitting = false;
                        }
                    }
                    _ => {}
                }
                if self.session.complete(&report) {
                    self.start_refresh();
                }
                self.rerender_checks();
            }
        }
        self.clamp_cursors();
    }

    /// Ids shown in the list pane for the current view, in display order.
    pub(in crate::tui_shell) fn list_ids(&self) -> Vec<String> {
        let snap = self.session.snapshot();
        match self.view {
            ViewKind::ByGroup => snap.groups.iter().map(|g| g.id.clone()).collect(),
            ViewKind::ByMember => snap.members.iter().map(|m| m.id.clone()).collect(),
        }
    }

    pub(in crate::tui_shell) fn focused_id(&self) -> Option<&str> {
        let focus = self.session.selection().focus();
        match self.view {
            ViewKind::ByGroup => focus.group_id.as_deref(),
            ViewKind::ByMember => focus.member_id.as_deref(),
        }
    }

    /// Editor entries below the select-all row: the universe, then checked
    /// ids the directory no longer lists.
    pub(in crate::tui_shell) fn editor_ids(&self) -> Vec<String> {
        let Some(checks) = &self.checks else {
            return Vec::new();
        };
        checks
            .universe()
            .iter()
            .chain(checks.checked().difference(checks.universe()))
            .cloned()
            .collect()
    }

    /// Re-renders the checkboxes from the focused entity's current membership.
    pub(in crate::tui_shell) fn rebuild_checks(&mut self) {
        let rendered = self.render_checks();
        self.install_checks(rendered);
    }

    /// Runs after the snapshot or focus changed. Unsynced edits survive when
    /// the focused entity and its membership are what they were rendered
    /// from; only the universe is refreshed.
    fn rerender_checks(&mut self) {
        let rendered = self.render_checks();
        let unchanged = match (&rendered, &self.checks_basis) {
            (Some((id, fresh)), Some((basis_id, basis))) => {
                id == basis_id && fresh.checked() == basis
            }
            _ => false,
        };
        match (rendered, self.checks.take()) {
            (Some((_, fresh)), Some(edits)) if unchanged => {
                self.checks = Some(CheckSet::new(
                    fresh.universe().clone(),
                    edits.into_checked(),
                ));
            }
            (rendered, _) => self.install_checks(rendered),
        }
    }

    fn render_checks(&self) -> Option<(String, CheckSet)> {
        let snap = self.session.snapshot();
        match self.view {
            ViewKind::ByGroup => self.session.focused_group().map(|g| {
                (
                    g.id.clone(),
                    CheckSet::new(snap.member_ids(), g.members.clone()),
                )
            }),
            ViewKind::ByMember => self.session.focused_member().map(|m| {
                (
                    m.id.clone(),
                    CheckSet::new(snap.group_ids(), snap.groups_of(&m.id)),
                )
            }),
        }
    }

    fn install_checks(&mut self, rendered: Option<(String, CheckSet)>) {
        self.checks_basis = rendered
            .as_ref()
            .map(|(id, checks)| (id.clone(), checks.checked().clone()));
        self.checks = rendered.map(|(_, checks)| checks);
    }

    fn clamp_cursors(&mut self) {
        let list_len = self.list_ids().len();
        self.list_cursor = self.list_cursor.min(list_len.saturating_sub(1));
        let rows = self.editor_ids().len() + 1;
        self.editor_cursor = self.editor_cursor.min(rows - 1);
        if self.checks.is_none() {
            self.pane = Pane::List;
        }
    }

    pub(in crate::tui_shell) fn switch_view(&mut self) {
        self.view = match self.view {
            ViewKind::ByGroup => ViewKind::ByMember,
            ViewKind::ByMember => ViewKind::ByGroup,
        };
        self.pane = Pane::List;
        let ids = self.list_ids();
        self.list_cursor = self
            .focused_id()
            .and_then(|id| ids.iter().position(|x| x == id))
            .unwrap_or(0);
        self.editor_cursor = 0;
        self.rebuild_checks();
    }

    pub(in crate::tui_shell) fn move_cursor(&mut self, delta: isize) {
        let len = match self.pane {
            Pane::List => self.list_ids().len(),
            Pane::Editor => self.editor_ids().len() + 1,
        };
        let cursor = match self.pane {
            Pane::List => &mut self.list_cursor,
            Pane::Editor => &mut self.editor_cursor,
        };
        if len == 0 {
            return;
        }
        let next = (*cursor as isize + delta).clamp(0, len as isize - 1);
        *cursor = next as usize;
    }

    pub(in crate::tui_shell) fn focus_under_cursor(&mut self) {
        let Some(id) = self.list_ids().get(self.list_cursor).cloned() else {
            return;
        };
        match self.view {
            ViewKind::ByGroup => self.session.select_group(&id),
            ViewKind::ByMember => self.session.select_member(&id),
        }
        self.rebuild_checks();
        self.editor_cursor = 0;
        self.pane = Pane::Editor;
    }

    pub(in crate::tui_shell) fn toggle_under_cursor(&mut self) {
        if self.editor_cursor == 0 {
            self.toggle_select_all();
            return;
        }
        let Some(id) = self.editor_ids().get(self.editor_cursor - 1).cloned() else {
            return;
        };
        if let Some(checks) = self.checks.as_mut() {
            checks.toggle(&id);
        }
    }

    pub(in crate::tui_shell) fn toggle_select_all(&mut self) {
        if let Some(checks) = self.checks.as_mut() {
            let all = checks.all_checked();
            checks.set_all(!all);
        }
    }

    pub(in crate::tui_shell) fn sync_focused(&mut self) {
        let Some(checks) = &self.checks else {
            self.notice = Some(match self.view {
                ViewKind::ByGroup => SessionError::NoGroupFocused.to_string(),
                ViewKind::ByMember => SessionError::NoMemberFocused.to_string(),
            });
            return;
        };
        let checked = checks.checked().clone();
        let prepared = match self.view {
            ViewKind::ByGroup => self.session.prepare_group_sync(checked),
            ViewKind::ByMember => self.session.prepare_member_sync(checked),
        };
        self.dispatch(prepared);
    }

    pub(in crate::tui_shell) fn open_create(&mut self) {
        self.modal = Some(Modal::CreateGroup {
            input: Input::with_text(&self.session.create_form().name),
            error: None,
            submitting: false,
        });
    }

    pub(in crate::tui_shell) fn submit_create(&mut self) {
        match self.session.prepare_create_group() {
            Ok(pending) => {
                self.spawn_action(pending);
                if let Some(Modal::CreateGroup {
                    error, submitting, ..
                }) = self.modal.as_mut()
                {
                    *error = None;
                    *submitting = true;
                }
            }
            Err(err) => {
                if let Some(Modal::CreateGroup { error, .. }) = self.modal.as_mut() {
                    *error = Some(err.to_string());
                } else {
                    self.notice = Some(err.to_string());
                }
            }
        }
    }

    pub(in crate::tui_shell) fn request_archive(&mut self) {
        if self.view != ViewKind::ByGroup {
            self.notice = Some("switch to the groups view to archive".to_string());
            return;
        }
        match self.session.archive_target() {
            Some(group) => {
                self.modal = Some(Modal::ConfirmArchive {
                    label: group.label(),
                });
            }
            None => {
                self.notice = Some(SessionError::NoGroupFocused.to_string());
            }
        }
    }

    pub(in crate::tui_shell) fn confirm_archive(&mut self, confirmation: Confirmation) {
        self.modal = None;
        let prepared = self.session.prepare_archive(confirmation);
        self.dispatch(prepared);
    }

    fn dispatch(&mut self, prepared: Result<PendingAction<dyn MembershipRemote>, SessionError>) {
        match prepared {
            Ok(pending) => {
                self.notice = None;
                self.spawn_action(pending);
            }
            Err(SessionError::NotConfirmed) => {
                self.notice = Some("archive cancelled".to_string());
            }
            Err(err) => {
                self.notice = Some(err.to_string());
            }
        }
    }

    /// Labels of the actions currently running, for the header.
    pub(in crate::tui_shell) fn busy_labels(&self) -> Vec<&'static str> {
        [
            Action::Refresh,
            Action::SyncGroup,
            Action::SyncMember,
            Action::CreateGroup,
            Action::ArchiveGroup,
        ]
        .into_iter()
        .filter(|a| self.session.in_flight().is_active(*a))
        .map(|a| a.label())
        .collect()
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;

use super::*;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    draw_list(frame, app, panes[0]);
    draw_editor(frame, app, panes[1]);

    draw_status(frame, app, chunks[2]);

    let hints = match app.view {
        ViewKind::ByGroup => {
            "Tab view  Enter focus  Space toggle  a all  s sync  n new  x archive  r refresh  q quit"
        }
        ViewKind::ByMember => "Tab view  Enter focus  Space toggle  a all  s sync  n new  r refresh  q quit",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::Gray))),
        chunks[3],
    );

    if let Some(modal) = &app.modal {
        modal::draw_modal(frame, app, modal);
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let view = match app.view {
        ViewKind::ByGroup => "by group",
        ViewKind::ByMember => "by member",
    };
    let mut spans = vec![
        Span::styled("Roster", Style::default().fg(Color::Black).bg(Color::White)),
        Span::raw("  "),
        Span::styled(view, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::raw(app.remote_label.as_str()),
    ];
    let busy = app.busy_labels();
    if !busy.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{}...]", busy.join(", ")),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn pane_block(title: String, active: bool) -> Block<'static> {
    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_list(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let snap = app.session.snapshot();
    let focused = app.focused_id();
    let (title, rows): (&str, Vec<(String, String)>) = match app.view {
        ViewKind::ByGroup => (
            "Groups",
            snap.groups
                .iter()
                .map(|g| (g.id.clone(), format!("{} ({})", g.label(), g.members.len())))
                .collect(),
        ),
        ViewKind::ByMember => (
            "Members",
            snap.members
                .iter()
                .map(|m| (m.id.clone(), m.name.clone()))
                .collect(),
        ),
    };

    let items: Vec<ListItem> = rows
        .into_iter()
        .map(|(id, text)| {
            if Some(id.as_str()) == focused {
                ListItem::new(Line::from(vec![
                    Span::styled("> ", Style::default().fg(Color::Green)),
                    Span::styled(text, Style::default().add_modifier(Modifier::BOLD)),
                ]))
            } else {
                ListItem::new(Line::from(format!("  {}", text)))
            }
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(pane_block(title.to_string(), app.pane == Pane::List))
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default().with_selected((!empty).then_some(app.list_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_editor(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let snap = app.session.snapshot();
    let active = app.pane == Pane::Editor;

    let (title, checks) = match (&app.checks, app.view) {
        (Some(checks), ViewKind::ByGroup) => (
            app.session
                .focused_group()
                .map(|g| format!("Members of {}", g.label()))
                .unwrap_or_default(),
            checks,
        ),
        (Some(checks), ViewKind::ByMember) => (
            app.session
                .focused_member()
                .map(|m| format!("Groups of {}", m.name))
                .unwrap_or_default(),
            checks,
        ),
        (None, _) => {
            let hint = if app.session.store().is_loaded() {
                "Select an entry and press Enter"
            } else {
                "Loading..."
            };
            frame.render_widget(
                Paragraph::new(hint).block(pane_block("Editor".to_string(), false)),
                area,
            );
            return;
        }
    };

    let mark = |on: bool| if on { "[x]" } else { "[ ]" };
    let mut items = vec![ListItem::new(Line::from(Span::styled(
        format!("{} select all", mark(checks.all_checked())),
        Style::default().add_modifier(Modifier::ITALIC),
    )))];
    for id in app.editor_ids() {
        let label = match app.view {
            ViewKind::ByGroup => snap.member_name(&id).to_string(),
            ViewKind::ByMember => snap
                .group(&id)
                .map(|g| g.label())
                .unwrap_or_else(|| id.clone()),
        };
        let dangling = !checks.universe().contains(&id);
        let line = if dangling {
            Line::from(Span::styled(
                format!("{} {} (not in directory)", mark(checks.is_checked(&id)), label),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(format!("{} {}", mark(checks.is_checked(&id)), label))
        };
        items.push(ListItem::new(line));
    }

    let list = List::new(items)
        .block(pane_block(title, active))
        .highlight_style(if active {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        });
    let mut state = ListState::default().with_selected(Some(app.editor_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let mut lines = Vec::new();
    if let Some(status) = app.session.status() {
        let color = match status.kind {
            StatusKind::Success => Color::Green,
            StatusKind::Warning => Color::Yellow,
            StatusKind::Error => Color::Red,
        };
        lines.push(Line::from(Span::styled(
            status.text.as_str(),
            Style::default().fg(color),
        )));
    }
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP).title("Status")),
        area,
    );
}

use super::*;

pub(in crate::tui_shell) fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.drain_tasks();

        terminal
            .draw(|f| super::render::draw(f, app))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => handle_key(app, k),
                _ => {}
            }
        }
    }
}

pub(in crate::tui_shell) fn handle_key(app: &mut App, key: KeyEvent) {
    if app.modal.is_some() {
        modal::handle_modal_key(app, key);
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.quit = true;
        }
        KeyCode::Esc => {
            if app.pane == Pane::Editor {
                app.pane = Pane::List;
            } else {
                app.quit = true;
            }
        }

        KeyCode::Tab => app.switch_view(),
        KeyCode::Left | KeyCode::Char('h') => {
            app.pane = Pane::List;
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.checks.is_some() {
                app.pane = Pane::Editor;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::PageDown => app.move_cursor(10),

        KeyCode::Enter => {
            if app.pane == Pane::List {
                app.focus_under_cursor();
            } else {
                app.toggle_under_cursor();
            }
        }
        KeyCode::Char(' ') => {
            if app.pane == Pane::Editor {
                app.toggle_under_cursor();
            } else {
                app.focus_under_cursor();
            }
        }
        KeyCode::Char('a') => app.toggle_select_all(),

        KeyCode::Char('s') => app.sync_focused(),
        KeyCode::Char('n') => app.open_create(),
        KeyCode::Char('x') => app.request_archive(),
        KeyCode::Char('r') => app.start_refresh(),
        _ => {}
    }
}

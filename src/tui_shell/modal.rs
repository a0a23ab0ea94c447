use super::*;

pub(super) enum Modal {
    /// Name and visibility for a new group. The text mirrors the session's
    /// create form, so closing and reopening keeps what was typed.
    CreateGroup {
        input: Input,
        error: Option<String>,
        submitting: bool,
    },

    ConfirmArchive {
        label: String,
    },
}

pub(super) fn handle_modal_key(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.modal.as_mut() else {
        return;
    };

    match modal {
        Modal::CreateGroup {
            input, submitting, ..
        } => {
            if *submitting {
                if key.code == KeyCode::Esc {
                    // The request keeps running; its result lands in the status line.
                    app.modal = None;
                }
                return;
            }
            match key.code {
                KeyCode::Esc => {
                    app.modal = None;
                }
                KeyCode::Enter => {
                    app.submit_create();
                }
                KeyCode::Tab => {
                    let form = app.session.create_form_mut();
                    form.is_private = !form.is_private;
                }
                KeyCode::Backspace => {
                    input.backspace();
                    app.session.create_form_mut().name = input.buf.clone();
                }
                KeyCode::Delete => {
                    input.delete();
                    app.session.create_form_mut().name = input.buf.clone();
                }
                KeyCode::Left => input.move_left(),
                KeyCode::Right => input.move_right(),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    input.insert_char(c);
                    app.session.create_form_mut().name = input.buf.clone();
                }
                _ => {}
            }
        }

        Modal::ConfirmArchive { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_archive(Confirmation::Granted),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.confirm_archive(Confirmation::Declined)
            }
            _ => {}
        },
    }
}

pub(super) fn draw_modal(frame: &mut ratatui::Frame, app: &App, modal: &Modal) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 60);
    let h = 8.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let box_area = ratatui::layout::Rect {
        x,
        y,
        width: w,
        height: h,
    };

    frame.render_widget(ratatui::widgets::Clear, box_area);

    let title = match modal {
        Modal::CreateGroup { .. } => "New group",
        Modal::ConfirmArchive { .. } => "Archive group",
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(block.clone(), box_area);
    let inner = block.inner(box_area);

    match modal {
        Modal::CreateGroup {
            input,
            error,
            submitting,
        } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ])
                .split(inner);

            frame.render_widget(
                Paragraph::new(input.buf.as_str())
                    .block(Block::default().borders(Borders::ALL).title("Name")),
                parts[0],
            );
            if !*submitting {
                frame.set_cursor_position((parts[0].x + 1 + input.cursor as u16, parts[0].y + 1));
            }

            let private = if app.session.create_form().is_private {
                "[x]"
            } else {
                "[ ]"
            };
            frame.render_widget(
                Paragraph::new(format!("{} private   (Tab toggles, Enter creates, Esc closes)", private)),
                parts[1],
            );

            let line = if *submitting {
                Line::from(Span::styled("creating...", Style::default().fg(Color::Yellow)))
            } else if let Some(err) = error {
                Line::from(Span::styled(err.as_str(), Style::default().fg(Color::Red)))
            } else {
                Line::from("")
            };
            frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), parts[2]);
        }

        Modal::ConfirmArchive { label } => {
            let lines = vec![
                Line::from(format!("Archive {}?", label)),
                Line::from(""),
                Line::from(Span::styled(
                    "y: archive   n/Esc: cancel",
                    Style::default().fg(Color::Gray),
                )),
            ];
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
    }
}

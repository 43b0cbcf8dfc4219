use crate::api::models::RecordStatus;
use crate::tui::app::{App, AppMode, PendingAction};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Queue rows
            Constraint::Length(3), // Action bar / footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);
    draw_rows(frame, chunks[1], app);
    draw_footer(frame, chunks[2], app);

    if app.mode == AppMode::Confirming {
        draw_confirm_dialog(frame, app);
    }
    if app.mode == AppMode::Notes {
        draw_notes_prompt(frame, app);
    }
    if app.help_visible {
        draw_help_window(frame);
    }
}

fn draw_header(frame: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let mut header_text = format!(
        "{} - page {}/{} ({} total)",
        app.queue.title(),
        app.page,
        app.total_pages,
        app.total
    );
    if let Some(summary) = &app.summary {
        header_text.push_str(&format!(
            " | pending {} | approved {} | rejected {}",
            summary.pending, summary.approved, summary.rejected
        ));
    }

    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).title("revq"))
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(header, area);
}

fn draw_rows(frame: &mut Frame, area: ratatui::layout::Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let is_bulk_selected = app.selection.is_selected(row.id);
            let selection_indicator = if is_bulk_selected { "●" } else { " " };
            let status_glyph = match row.status {
                Some(RecordStatus::Pending) => "○",
                Some(RecordStatus::Approved) => "✓",
                Some(RecordStatus::Rejected) => "✗",
                _ => "·",
            };
            // Membership rows carry a district, beneficiary rows a program.
            let detail = row
                .district
                .as_deref()
                .or(row.program.as_deref())
                .unwrap_or("-");
            let email = row.email.as_deref().unwrap_or("");
            let date = row
                .submitted_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();

            let display_content = format!(
                "{selection_indicator} {status_glyph} {:<28} {:<14} {:<26} {date}",
                row.full_name, detail, email
            );

            let style = if is_bulk_selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                match row.status {
                    Some(RecordStatus::Approved) => Style::default().fg(Color::DarkGray),
                    Some(RecordStatus::Rejected) => Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                    _ => Style::default().fg(Color::White),
                }
            };

            ListItem::new(Line::from(Span::styled(display_content, style)))
        })
        .collect();

    let title = if app.selection.is_active() {
        " Rows (selection mode) "
    } else {
        " Rows "
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    if !app.rows.is_empty() {
        list_state.select(Some(app.cursor));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_footer(frame: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let (footer_text, style) = if app.executor.is_loading() {
        (
            "Applying batch action... (controls disabled)".to_string(),
            Style::default().fg(Color::Magenta),
        )
    } else if let Some(error) = app.display_error() {
        (format!("Error: {error}"), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status {
        (status.clone(), Style::default().fg(Color::Green))
    } else if app.selection.is_active() {
        let bar = if app.selection.count() == 0 {
            "selection mode | Space: toggle | Ctrl+A: select all | Esc: done".to_string()
        } else if app.selection.is_all_selected(app.rows.len()) {
            format!(
                "all {} selected | a: approve | r: reject | d: delete | Ctrl+A: toggle all | Esc: done",
                app.rows.len()
            )
        } else {
            format!(
                "{} of {} selected | a: approve | r: reject | d: delete | Ctrl+A: toggle all | Esc: done",
                app.selection.count(),
                app.rows.len()
            )
        };
        (bar, Style::default().fg(Color::Cyan))
    } else {
        (
            "↑↓/j/k: move | v/Space: select | a/r: approve/reject | d: delete | n/p: page | Tab: queue | ?: help | q: quit"
                .to_string(),
            Style::default().fg(Color::Yellow),
        )
    };

    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);

    frame.render_widget(footer, area);
}

fn draw_confirm_dialog(frame: &mut Frame, app: &App) {
    let Some(pending) = &app.pending else {
        return;
    };

    let mut lines: Vec<String> = vec![String::new()];
    match pending {
        PendingAction::Batch {
            action,
            ids,
            sample,
        } => {
            lines.push(format!("{} {} record(s)?", action.label(), ids.len()));
            lines.push(String::new());
            for name in sample {
                lines.push(format!("  - {name}"));
            }
            if ids.len() > sample.len() {
                lines.push(format!("  ... and {} more", ids.len() - sample.len()));
            }
        }
        PendingAction::DeleteOne { name, .. } => {
            lines.push(format!("Delete {name}?"));
        }
    }
    lines.push(String::new());
    lines.push("[y] confirm    [n] cancel".to_string());

    let dialog = Paragraph::new(lines.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White));

    let area = centered_rect(50, 40, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn draw_notes_prompt(frame: &mut Frame, app: &App) {
    let Some(prompt) = &app.notes else {
        return;
    };

    // Show the buffer with a block cursor, same as an inline edit field.
    let (before_cursor, after_cursor) = prompt.buffer.split_at(prompt.cursor);
    let text = format!(
        "Rejecting: {}\n\nNotes (optional):\n{before_cursor}█{after_cursor}\n\nEnter: submit | Esc: cancel",
        prompt.name
    );

    let dialog = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Rejection notes ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(ratatui::widgets::Wrap { trim: false });

    let area = centered_rect(60, 35, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn draw_help_window(frame: &mut Frame) {
    let help_text = vec![
        "revq - Keyboard Commands",
        "",
        "NAVIGATION:",
        "  ↑↓ / j/k          Move cursor up/down",
        "  n / p             Next/previous page",
        "  Tab               Switch queue",
        "  g                 Reload current page",
        "",
        "SELECTION:",
        "  v                 Enter selection mode",
        "  Space             Toggle row (enters selection mode if needed)",
        "  Ctrl+A            Select/deselect all visible rows",
        "  Esc               Leave selection mode (clears selection)",
        "",
        "ACTIONS (always confirmed before any request):",
        "  a                 Approve (selection, or cursor row outside selection mode)",
        "  r                 Reject (cursor row prompts for notes)",
        "  d                 Delete (beneficiaries only)",
        "",
        "OTHER:",
        "  ?                 Show this help (press ? or Esc to close)",
        "  q / Ctrl+C        Quit",
        "",
        "Press ? or Esc to close this help window",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - Keyboard Commands ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(ratatui::widgets::Wrap { trim: true });

    let area = centered_rect(80, 70, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: ratatui::layout::Rect) -> ratatui::layout::Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

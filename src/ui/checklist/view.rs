use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::gate::{Gate, Route};
use crate::task::Task;

use super::app::{AppState, Focus, StatusKind};

const GATE_WIDTH: u16 = 32;
const GATE_HEIGHT: u16 = 7;
const ADD_WIDTH: u16 = 5;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DONE: Color = Color::Rgb(96, 150, 110);

pub fn render(frame: &mut Frame, app: &AppState) {
    match app.route {
        Route::Gate => render_gate(frame, app),
        Route::Checklist => render_checklist(frame, app),
    }
}

fn render_gate(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let modal = centered_rect(GATE_WIDTH, GATE_HEIGHT, chunks[0]);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("[ {} ]", Gate::ACTION_LABEL),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "press enter",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST))
            .title(Span::styled(
                format!(" {} ", app.display.title),
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(widget, modal);

    render_footer(frame, app, chunks[1]);
}

fn render_checklist(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        app.display.title.clone(),
        Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    render_input(frame, app, chunks[1]);

    let view = app.manager.render();
    let selected = if app.focus == Focus::List {
        app.selected_position()
    } else {
        None
    };
    let pending_selected = selected.filter(|pos| *pos < view.pending.len());
    let completed_selected = selected
        .and_then(|pos| pos.checked_sub(view.pending.len()))
        .filter(|pos| *pos < view.completed.len());

    let body = chunks[2];
    if view.shows_completed() {
        let height = completed_height(view.completed.len(), body.height);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(height)].as_ref())
            .split(body);
        render_pending(frame, app, &view.pending, pending_selected, parts[0]);
        render_completed(frame, app, &view.completed, completed_selected, parts[1]);
    } else {
        render_pending(frame, app, &view.pending, pending_selected, body);
    }

    render_footer(frame, app, chunks[3]);
}

fn render_input(frame: &mut Frame, app: &AppState, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(ADD_WIDTH)].as_ref())
        .split(area);

    let focused = app.focus == Focus::Input;
    let draft = app.manager.draft();
    let content_width = parts[0].width.saturating_sub(2) as usize;
    let line = if draft.is_empty() {
        Line::from(Span::styled(
            app.display.placeholder.clone(),
            Style::default().fg(COLOR_MUTED_DARK),
        ))
    } else {
        Line::from(Span::styled(
            tail_text(draft, content_width.saturating_sub(1)),
            Style::default().fg(COLOR_TEXT),
        ))
    };
    let border = if focused { COLOR_ACCENT } else { COLOR_BG_MUTED };
    let input = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, parts[0]);

    let can_add = app.manager.render().can_add();
    let add_style = if can_add {
        Style::default().fg(COLOR_SUCCESS).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    };
    let add = Paragraph::new(Line::from(Span::styled("+", add_style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_BG_MUTED)),
        );
    frame.render_widget(add, parts[1]);

    if focused {
        let typed = draft.chars().count().min(content_width.saturating_sub(1)) as u16;
        frame.set_cursor(parts[0].x + 1 + typed, parts[0].y + 1);
    }
}

fn render_pending(
    frame: &mut Frame,
    app: &AppState,
    tasks: &[&Task],
    selected: Option<usize>,
    area: Rect,
) {
    let content_width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let mut lines = Vec::new();

    if tasks.is_empty() {
        let empty = if app.manager.is_loaded() {
            "No tasks"
        } else {
            ""
        };
        lines.push(Line::from(Span::styled(
            empty,
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let (start, end) = list_window(tasks.len(), selected, height);
        for (pos, task) in tasks.iter().enumerate().take(end).skip(start) {
            lines.push(render_task_row(task, selected == Some(pos), content_width));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST))
            .title(Span::styled(
                format!(" Pending ({}) ", tasks.len()),
                Style::default().fg(COLOR_INFO),
            )),
    );
    frame.render_widget(widget, area);
}

fn render_completed(
    frame: &mut Frame,
    app: &AppState,
    tasks: &[&Task],
    selected: Option<usize>,
    area: Rect,
) {
    let content_width = area.width.saturating_sub(2) as usize;
    // one line stays reserved for the clear control
    let height = area.height.saturating_sub(3) as usize;
    let mut lines = Vec::new();

    let (start, end) = list_window(tasks.len(), selected, height);
    for (pos, task) in tasks.iter().enumerate().take(end).skip(start) {
        lines.push(render_task_row(task, selected == Some(pos), content_width));
    }
    lines.push(Line::from(vec![
        Span::styled(
            format!("[ {} ]", app.display.clear_label),
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  c", Style::default().fg(COLOR_MUTED_DARK)),
    ]));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_DONE))
            .title(Span::styled(
                format!(" {} ({}) ", app.display.completed_title, tasks.len()),
                Style::default().fg(COLOR_SUCCESS),
            )),
    );
    frame.render_widget(widget, area);
}

fn render_task_row(task: &Task, selected: bool, width: usize) -> Line<'static> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let stamp = format!("  {}", task.created_at);
    let stamp_width = stamp.chars().count();
    let text_width = width
        .saturating_sub(checkbox.len())
        .saturating_sub(stamp_width);

    let mut text_style = Style::default().fg(COLOR_TEXT);
    let mut box_style = Style::default().fg(COLOR_MUTED);
    if task.completed {
        text_style = Style::default()
            .fg(COLOR_SUCCESS)
            .add_modifier(Modifier::CROSSED_OUT);
        box_style = Style::default().fg(COLOR_SUCCESS);
    }
    let mut stamp_style = Style::default().fg(COLOR_MUTED_DARK);
    if selected {
        text_style = text_style.bg(COLOR_BG_MUTED).add_modifier(Modifier::BOLD);
        box_style = box_style.bg(COLOR_BG_MUTED);
        stamp_style = stamp_style.bg(COLOR_BG_MUTED);
    }

    let mut spans = vec![
        Span::styled(checkbox, box_style),
        Span::styled(truncate_text(&task.text, text_width), text_style),
    ];
    if width >= checkbox.len() + stamp_width + 4 {
        spans.push(Span::styled(stamp, stamp_style));
    }
    Line::from(spans)
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let mut lines = vec![line];
    if app.route == Route::Checklist {
        lines.push(Line::from(Span::styled(
            app.task_count_summary(),
            Style::default().fg(COLOR_ACCENT),
        )));
    }
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

/// Rows for the completed block: its tasks, two borders and the clear control
fn completed_height(count: usize, body_height: u16) -> u16 {
    let wanted = u16::try_from(count).unwrap_or(u16::MAX).saturating_add(3);
    wanted.min((body_height / 2).max(4))
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

/// Last `max` chars of the draft, so the cursor end stays visible
fn tail_text(value: &str, max: usize) -> String {
    let count = value.chars().count();
    if count <= max {
        return value.to_string();
    }
    value.chars().skip(count - max).collect()
}

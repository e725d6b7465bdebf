use std::borrow::Cow;

use super::state::AppState;
use super::surface::ListSurface;
use crate::roster::{ListDataSource, Position, RosterError};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const HEADER_HEIGHT: u16 = 3;
pub const LOG_HEIGHT: u16 = 7;
pub const FOOTER_HEIGHT: u16 = 1;

/// Rows left for list content (inside borders) on a terminal `height` tall.
pub fn list_viewport(height: u16) -> usize {
    height
        .saturating_sub(HEADER_HEIGHT + LOG_HEIGHT + FOOTER_HEIGHT)
        .saturating_sub(2) as usize
}

/// Draw one frame. Lookups go through the model, so an invariant violation
/// surfaces here as an error instead of a missing row.
pub fn draw(f: &mut Frame, state: &AppState) -> Result<(), RosterError> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(LOG_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0])?;
    draw_list(f, state, chunks[1])?;
    draw_logs(f, state, chunks[2]);
    draw_footer(f, chunks[3]);
    Ok(())
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) -> Result<(), RosterError> {
    let mut spans = vec![Span::styled(
        " Roster ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (name, count, picked, multi) in state.section_summary()? {
        let style = if picked > 0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mode = if multi { "multi" } else { "single" };
        spans.push(Span::raw(" \u{2502} "));
        spans.push(Span::styled(format!("{} {}/{} ({})", name, picked, count, mode), style));
    }

    spans.push(Span::raw(" \u{2502} "));
    match state.reorder_due {
        Some(due) => {
            let left = due.saturating_duration_since(std::time::Instant::now());
            spans.push(Span::styled(
                format!("reorder in {:.1}s", left.as_secs_f32()),
                Style::default().fg(Color::Yellow),
            ));
        }
        None => spans.push(Span::styled(
            format!("up {}", state.uptime()),
            Style::default().fg(Color::DarkGray),
        )),
    }

    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    Ok(())
}

fn draw_list(f: &mut Frame, state: &AppState, area: Rect) -> Result<(), RosterError> {
    let model = &state.model;
    let surface = &state.surface;
    let max_width = area.width.saturating_sub(2) as usize;
    let visible_lines = area.height.saturating_sub(2) as usize;

    // Flatten sections into header + row lines, then window by scroll offset.
    let mut lines: Vec<Line> = Vec::new();
    for section in 0..model.section_count() {
        let title = model.section_title(section)?;
        let count = model.count(section)?;
        lines.push(Line::from(Span::styled(
            format!(" {} ({})", title.to_uppercase(), count),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for row in 0..count {
            let position = Position::new(section, row);
            let cell = model.render(position)?;
            lines.push(row_line(surface, position, &cell.label, cell.checked, max_width));
        }
    }

    let total = lines.len();
    let offset = surface.scroll_offset.min(total.saturating_sub(visible_lines));
    let lines: Vec<Line> = lines.into_iter().skip(offset).take(visible_lines).collect();

    let title = format!(
        " Members [{} selected \u{00b7} {}/{}] ",
        model.selected_count(),
        (offset + visible_lines).min(total),
        total
    );
    let block = Block::default().title(title).borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
    Ok(())
}

fn row_line(surface: &ListSurface, position: Position, label: &str, checked: bool, width: usize) -> Line<'static> {
    let on_cursor = surface.cursor() == Some(position);
    let mut style = if surface.is_flashing(position) {
        Style::default().fg(Color::Cyan)
    } else if surface.is_highlighted(position) {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    if on_cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let accessory = if checked { "\u{2713}" } else { " " };
    let label_width = width.saturating_sub(6);
    let label = truncate_with_ellipsis(label, label_width);
    let pad = label_width.saturating_sub(label.chars().count());
    Line::from(vec![
        Span::styled(format!("   {}{}", label, " ".repeat(pad)), style),
        Span::styled(
            format!(" {} ", accessory),
            style.fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize;
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "SELECT" => Color::Green,
                "DESELECT" => Color::Red,
                "REORDER" => Color::Cyan,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Events ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let line = Line::from(vec![
        Span::styled("  [q]", key),
        Span::raw("uit  "),
        Span::styled("[j/k]", key),
        Span::raw(" move  "),
        Span::styled("[g/G]", key),
        Span::raw(" top/bottom  "),
        Span::styled("[Tab]", key),
        Span::raw(" next section  "),
        Span::styled("[Space]", key),
        Span::raw(" toggle  "),
        Span::styled("[r]", key),
        Span::raw("eorder  "),
        Span::styled("[s]", key),
        Span::raw("huffle  "),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 1 {
        Cow::Borrowed("")
    } else {
        let truncated: String = s.chars().take(max_width - 1).collect();
        Cow::Owned(format!("{}\u{2026}", truncated))
    }
}

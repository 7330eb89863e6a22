//! Field rendering utilities for forms

use crate::schema::ErrorCode;
use crate::state::{FieldName, FormController};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one field: bordered input plus an error line
pub const FIELD_HEIGHT: u16 = 4;

/// Draw one bound field with its label, value and gated error
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    controller: &dyn FormController,
    field: FieldName,
    is_active: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let error = controller.visible_error(field);
    // Faults are not the user's doing
    let error_color = match controller.errors().code(field) {
        Some(ErrorCode::EngineFault) => Color::Yellow,
        _ => Color::Red,
    };

    let border_style = match (error.is_some(), is_active) {
        (true, _) => Style::default().fg(error_color),
        (false, true) => Style::default().fg(Color::Cyan),
        (false, false) => Style::default().fg(Color::DarkGray),
    };

    let value = controller.values().display_value(field);
    let value_span = if value.is_empty() {
        Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray))
    } else if is_active {
        Span::styled(value, Style::default().fg(Color::Cyan))
    } else {
        Span::raw(value)
    };

    let mut spans = vec![value_span];
    if is_active {
        // Cursor sits after the text, before the placeholder when empty
        let cursor = Span::styled("▌", Style::default().fg(Color::Cyan));
        if controller.values().get(field).is_empty() {
            spans.insert(0, cursor);
        } else {
            spans.push(cursor);
        }
    }

    let marker = if controller.dirty().contains(field) { "•" } else { "" };
    let block = Block::default()
        .title(format!(" {}{marker} ", field.label()))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[0]);

    if let Some(message) = error {
        let line = Paragraph::new(Span::styled(
            format!(" {message}"),
            Style::default().fg(error_color),
        ));
        frame.render_widget(line, chunks[1]);
    }
}

/// Draw a single line of help text
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

//! Confirmation toast overlay

use crate::state::{Notifier, Toast, ToastPosition};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::Instant;

/// Rows of one toast (three lines plus borders)
const TOAST_HEIGHT: u16 = 5;
const MARGIN: u16 = 1;

/// Render every live toast, stacked from the configured corner
pub fn render_toasts(frame: &mut Frame, area: Rect, notifier: &Notifier, now: Instant) {
    let position = notifier.config().position;
    let mut offset = 0u16;

    for toast in notifier.stacked() {
        let lines = toast_lines(toast);
        let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
        let visible = (f32::from(width) * toast.visibility(now)).round() as u16;

        let Some(rect) = toast_rect(area, position, offset, visible) else {
            break;
        };
        offset += TOAST_HEIGHT;
        if visible < 3 {
            continue;
        }

        let border = if toast.is_open() {
            Color::Green
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", toast.created_at.format("%H:%M:%S")));

        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }
}

fn toast_lines(toast: &Toast) -> Vec<Line<'static>> {
    let c = &toast.confirmation;
    let strong = Style::default().add_modifier(Modifier::BOLD);
    vec![
        Line::from(vec![Span::styled("Name: ", strong), Span::raw(c.name.clone())]),
        Line::from(vec![Span::styled("Email: ", strong), Span::raw(c.email.clone())]),
        Line::from(vec![
            Span::styled("Password: ", Style::default().fg(Color::Gray)),
            Span::styled(c.password.clone(), Style::default().fg(Color::Gray)),
        ]),
    ]
}

/// Slot for a toast `offset` rows away from the anchor corner, or `None`
/// once the stack runs out of room
fn toast_rect(area: Rect, position: ToastPosition, offset: u16, width: u16) -> Option<Rect> {
    let needed = offset + TOAST_HEIGHT + MARGIN;
    if needed > area.height {
        return None;
    }
    let width = width.min(area.width.saturating_sub(2 * MARGIN));

    let x = if position.is_left() {
        area.x + MARGIN
    } else {
        area.right().saturating_sub(MARGIN + width)
    };
    let y = if position.is_top() {
        area.y + MARGIN + offset
    } else {
        area.bottom().saturating_sub(needed)
    };

    Some(Rect {
        x,
        y,
        width,
        height: TOAST_HEIGHT,
    })
}

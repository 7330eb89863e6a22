//! Create-user form page

use super::field_renderer::{draw_field, draw_help_text, FIELD_HEIGHT};
use crate::platform::{RESET_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::{FieldName, FormController, PageState};
use crate::ui::components::{render_button, ButtonState, BUTTON_HEIGHT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const FORM_WIDTH: u16 = 48;

/// Draw the form of one page, centred in `area`
pub fn draw_user_form(frame: &mut Frame, area: Rect, page: &PageState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let form_area = centered_column(inner, FORM_WIDTH);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                // Top padding
            Constraint::Length(2),             // Title
            Constraint::Length(FIELD_HEIGHT),  // Name
            Constraint::Length(FIELD_HEIGHT),  // Email
            Constraint::Length(FIELD_HEIGHT),  // Password
            Constraint::Length(BUTTON_HEIGHT), // Submit
            Constraint::Length(1),             // Help
            Constraint::Length(1),             // Session state
            Constraint::Min(0),                // Bottom padding
        ])
        .split(form_area);

    let title = Paragraph::new(page.page.title())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[1]);

    let controller = page.controller.as_ref();
    for (idx, field) in FieldName::ALL.iter().enumerate() {
        draw_field(
            frame,
            chunks[idx + 2],
            controller,
            *field,
            page.active_field == *field,
        );
    }

    let submitting = controller.is_submitting();
    let (label, state) = if submitting {
        ("Salvando...", ButtonState::Disabled)
    } else {
        ("Salvar", ButtonState::Selected)
    };
    render_button(frame, chunks[5], label, state);

    draw_help_text(
        frame,
        chunks[6],
        &format!("Tab:next  Enter/{SUBMIT_SHORTCUT}:save  {RESET_SHORTCUT}:reset"),
    );
    draw_help_text(frame, chunks[7], &session_summary(controller));
}

/// One-line view of the controller's bookkeeping
fn session_summary(controller: &dyn FormController) -> String {
    let touched = if controller.touched().is_empty() {
        "untouched".to_string()
    } else {
        format!("touched {}/{}", controller.touched().len(), FieldName::ALL.len())
    };
    let dirty = if controller.dirty().is_empty() { "pristine" } else { "dirty" };
    let mut summary = format!("{} · {touched} · {dirty}", controller.schema().name());
    if controller.submit_attempted() {
        summary.push_str(&format!(" · {} error(s)", controller.errors().len()));
    }
    summary
}

fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

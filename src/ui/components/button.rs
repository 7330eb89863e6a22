//! Button component for TUI

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Normal,
    Selected,
    Disabled,
}

impl ButtonState {
    fn border_style(&self) -> Style {
        match self {
            Self::Selected => Style::default().fg(Color::Cyan),
            Self::Normal | Self::Disabled => Style::default().fg(Color::DarkGray),
        }
    }

    fn text_style(&self) -> Style {
        match self {
            Self::Selected => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Self::Normal => Style::default(),
            Self::Disabled => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        }
    }
}

/// Render a bordered button with centred content
pub fn render_button(frame: &mut Frame, area: Rect, content: &str, state: ButtonState) {
    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .style(state.text_style());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(state.border_style());

    frame.render_widget(paragraph.block(block), area);
}

/// Render a left-aligned sidebar button with key and label
pub fn render_sidebar_button(frame: &mut Frame, area: Rect, key: &str, label: &str, selected: bool) {
    let state = if selected {
        ButtonState::Selected
    } else {
        ButtonState::Normal
    };
    let paragraph = Paragraph::new(format!(" {key} {label} ")).style(state.text_style());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(state.border_style());

    frame.render_widget(paragraph.block(block), area);
}

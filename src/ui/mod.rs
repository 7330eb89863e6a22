//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;

use crate::app::App;
use ratatui::Frame;
use std::time::Instant;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (sidebar_area, main_area) = layout::create_layout(frame.area());

    layout::draw_sidebar(frame, sidebar_area, app);
    forms::draw_user_form(frame, main_area, app.state.current());

    // Toasts float above the form
    components::render_toasts(frame, main_area, &app.notifier, Instant::now());

    layout::draw_status_bar(frame, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::FieldName;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_password_is_masked() {
        let mut app = App::new(&AppConfig::default()).unwrap();
        let controller = &mut app.state.current_mut().controller;
        controller.set_field(FieldName::Password, "segredo".to_string());
        let _ = controller.take_live_request();

        let screen = render(&app);
        assert!(screen.contains("*******"));
        assert!(!screen.contains("segredo"));
    }

    #[test]
    fn test_page_title_and_labels() {
        let app = App::new(&AppConfig::default()).unwrap();
        let screen = render(&app);
        assert!(screen.contains("Touched + Chain"));
        for field in FieldName::ALL {
            assert!(screen.contains(field.label()));
        }
        assert!(screen.contains("Salvar"));
    }

    #[tokio::test]
    async fn test_errors_render_only_when_shown() {
        let mut app = App::new(&AppConfig::default()).unwrap();
        let controller = &mut app.state.current_mut().controller;
        controller.core_mut().request_live();
        let ticket = controller.take_live_request().unwrap();
        let outcome = controller.schema().validate(&ticket.values).await;
        controller.apply_live(ticket.stamp, outcome);
        assert!(!render(&app).contains("O nome é obrigatório"));

        app.state.current_mut().controller.touch(FieldName::Name);
        assert!(render(&app).contains("O nome é obrigatório"));
    }
}

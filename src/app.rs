//! Application state and core logic

use crate::config::AppConfig;
use crate::platform;
use crate::schema::ValidationOutcome;
use crate::state::{
    AppState, Notifier, NotifyOnSubmit, Page, Stamp, SubmitStatus, TicketKind, ValidationTicket,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tokio::sync::mpsc;

/// Outcome of a spawned validation, routed back to its page
#[derive(Debug)]
struct ValidationResult {
    page: Page,
    stamp: Stamp,
    outcome: ValidationOutcome,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Toast service, mounted for the lifetime of the app
    pub notifier: Notifier,
    results_tx: mpsc::UnboundedSender<ValidationResult>,
    results_rx: mpsc::UnboundedReceiver<ValidationResult>,
    /// Validations spawned but not yet drained
    in_flight: usize,
    /// Whether the app should quit
    quit: bool,
    /// Feedback shown in the status bar
    pub status_message: Option<String>,
}

impl App {
    /// Create a new App instance
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut status_message = None;
        let descriptor = match config.dynamic_schema() {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "using built-in dynamic schema");
                status_message = Some("Dynamic schema not loaded, using built-in".to_string());
                None
            }
        };

        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Ok(Self {
            state: AppState::new(config.start_page(), config.live_validation(), descriptor),
            notifier: Notifier::mount(config.toast_config()),
            results_tx,
            results_rx,
            in_flight: 0,
            quit: false,
            status_message,
        })
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Whether the screen needs fast redraws
    pub fn is_animating(&self) -> bool {
        !self.notifier.is_empty() || self.in_flight > 0
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let shortcut = platform::is_shortcut(key.modifiers);

        match key.code {
            KeyCode::Char('s') if shortcut => self.submit_current(),
            KeyCode::Char('r') if shortcut => self.reset_current(),
            KeyCode::Char('q') if shortcut => self.quit(),
            KeyCode::Enter => self.submit_current(),
            KeyCode::Esc => self.notifier.dismiss_all(Instant::now()),
            KeyCode::Delete => {
                if let Some(id) = self.notifier.newest_open() {
                    self.notifier.dismiss(id, Instant::now());
                }
            }
            KeyCode::Tab => self.state.current_mut().next_field(),
            KeyCode::BackTab => self.state.current_mut().prev_field(),
            KeyCode::Left => self.state.prev_page(),
            KeyCode::Right => self.state.next_page(),
            KeyCode::F(n) => {
                if let Some(page) = Page::from_number(n) {
                    self.state.select_page(page);
                }
            }
            KeyCode::Backspace => self.state.current_mut().backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.status_message = None;
                self.state.current_mut().input_char(c);
            }
            _ => {}
        }

        self.schedule_live(self.state.current_page);
    }

    fn submit_current(&mut self) {
        let page = self.state.current_page;
        match self.state.current_mut().controller.begin_submit() {
            Some(ticket) => {
                self.status_message = None;
                self.spawn_validation(page, ticket);
            }
            None => {
                self.status_message = Some("Already submitting".to_string());
            }
        }
    }

    fn reset_current(&mut self) {
        self.state.current_mut().reset();
        self.status_message = Some("Form reset".to_string());
    }

    fn schedule_live(&mut self, page: Page) {
        if let Some(ticket) = self.state.page_mut(page).controller.take_live_request() {
            self.spawn_validation(page, ticket);
        }
    }

    /// Run validation off the event loop; the result comes back through the
    /// results channel
    fn spawn_validation(&mut self, page: Page, ticket: ValidationTicket) {
        let controller = &self.state.page(page).controller;
        let schema = controller.schema();
        tracing::debug!(
            controller = controller.kind().label(),
            engine = schema.name(),
            kind = ?ticket.stamp.kind,
            "validating"
        );
        let tx = self.results_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let ValidationTicket { stamp, values } = ticket;
            let task = tokio::spawn(async move { schema.validate(&values).await });
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(%err, "validation task failed");
                    ValidationOutcome::fault()
                }
            };
            // Receiver is gone only once the app has shut down
            let _ = tx.send(ValidationResult {
                page,
                stamp,
                outcome,
            });
        });
    }

    /// Apply every validation result that has arrived
    pub fn drain_results(&mut self) {
        while let Ok(result) = self.results_rx.try_recv() {
            self.apply_result(result);
        }
    }

    fn apply_result(&mut self, result: ValidationResult) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let ValidationResult {
            page,
            stamp,
            outcome,
        } = result;
        let page_state = self.state.page_mut(page);

        match stamp.kind {
            TicketKind::Live => {
                page_state.controller.apply_live(stamp, outcome);
            }
            TicketKind::Submit => {
                let mut handler = NotifyOnSubmit::new(&mut self.notifier);
                let status = page_state
                    .controller
                    .complete_submit(stamp, outcome, &mut handler);
                match status {
                    SubmitStatus::Submitted => {
                        page_state.focus_first();
                        self.status_message = Some(format!("{} submitted", page.title()));
                    }
                    SubmitStatus::Rejected => {
                        self.status_message = Some("Fix the highlighted fields".to_string());
                    }
                    SubmitStatus::Ignored | SubmitStatus::Stale => {}
                }
            }
        }
    }

    /// Advance toast timers
    pub fn tick(&mut self, now: Instant) {
        self.notifier.tick(now);
    }

    pub fn shutdown(&mut self) {
        if self.notifier.is_mounted() {
            self.notifier.unmount();
        }
    }

    /// Wait until every spawned validation has been applied
    #[cfg(test)]
    async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.results_rx.recv().await {
                Some(result) => self.apply_result(result),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldName, FormValues};
    use pretty_assertions::assert_eq;

    fn app() -> App {
        App::new(&AppConfig::default()).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn fill_valid(app: &mut App) {
        type_text(app, "maria lima");
        press(app, KeyCode::Tab);
        type_text(app, "maria@ngi.com.br");
        press(app, KeyCode::Tab);
        type_text(app, "abcdef");
    }

    fn current_values(app: &App) -> &FormValues {
        app.state.current().controller.values()
    }

    mod submission {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_happy_path_on_every_page() {
            for page in Page::ALL {
                let mut app = app();
                app.state.select_page(page);
                fill_valid(&mut app);
                press(&mut app, KeyCode::Enter);
                app.settle().await;

                assert_eq!(app.notifier.len(), 1, "{page:?}");
                let toast = &app.notifier.stacked()[0];
                assert_eq!(toast.confirmation.name, "Maria Lima");
                assert_eq!(toast.confirmation.email, "maria@ngi.com.br");
                assert_eq!(toast.confirmation.password, "******");
                assert!(current_values(&app).is_empty(), "{page:?}");
                assert!(app.state.current().controller.touched().is_empty());
            }
        }

        #[tokio::test]
        async fn test_double_submit_notifies_once() {
            let mut app = app();
            fill_valid(&mut app);
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.status_message.as_deref(), Some("Already submitting"));
            app.settle().await;
            assert_eq!(app.notifier.len(), 1);
        }

        #[tokio::test]
        async fn test_reset_while_submitting_discards_result() {
            let mut app = app();
            fill_valid(&mut app);
            press(&mut app, KeyCode::Enter);
            ctrl(&mut app, 'r');
            app.settle().await;

            assert!(app.notifier.is_empty());
            let controller = &app.state.current().controller;
            assert!(controller.values().is_empty());
            assert!(controller.errors().is_empty());
            assert!(!controller.is_submitting());
        }

        #[tokio::test]
        async fn test_invalid_submit_shows_errors() {
            let mut app = app();
            type_text(&mut app, "ana");
            press(&mut app, KeyCode::Enter);
            app.settle().await;

            let controller = &app.state.current().controller;
            assert!(app.notifier.is_empty());
            assert_eq!(controller.values().name, "ana");
            assert!(controller.visible_error(FieldName::Name).is_none());
            assert!(controller.visible_error(FieldName::Email).is_some());
            assert!(controller.visible_error(FieldName::Password).is_some());
            assert_eq!(
                app.status_message.as_deref(),
                Some("Fix the highlighted fields")
            );
        }

        #[tokio::test]
        async fn test_focus_returns_to_first_field_after_submit() {
            let mut app = app();
            fill_valid(&mut app);
            assert_eq!(app.state.current().active_field, FieldName::Password);
            press(&mut app, KeyCode::Enter);
            app.settle().await;

            assert_eq!(app.notifier.len(), 1);
            assert_eq!(app.state.current().active_field, FieldName::Name);
            type_text(&mut app, "ana");
            assert_eq!(current_values(&app).name, "ana");
        }

        #[tokio::test]
        async fn test_rejected_submit_keeps_focus() {
            let mut app = app();
            press(&mut app, KeyCode::Tab);
            press(&mut app, KeyCode::Enter);
            app.settle().await;
            assert_eq!(app.state.current().active_field, FieldName::Email);
        }

        #[tokio::test]
        async fn test_unmounted_notifier_still_resets_form() {
            let mut app = app();
            app.shutdown();
            fill_valid(&mut app);
            press(&mut app, KeyCode::Enter);
            app.settle().await;
            assert!(current_values(&app).is_empty());
            assert!(app.notifier.is_empty());
        }
    }

    mod live_validation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_touched_page_validates_while_typing() {
            let mut app = app();
            press(&mut app, KeyCode::Tab);
            type_text(&mut app, "x");
            app.settle().await;
            let controller = &app.state.current().controller;
            assert!(controller.errors().contains(FieldName::Email));
            assert!(controller.visible_error(FieldName::Email).is_none());

            press(&mut app, KeyCode::Tab);
            app.settle().await;
            assert!(app
                .state
                .current()
                .controller
                .visible_error(FieldName::Email)
                .is_some());
        }

        #[tokio::test]
        async fn test_submit_first_page_stays_quiet() {
            let mut app = app();
            app.state.select_page(Page::SubmitFirstChain);
            type_text(&mut app, "x");
            press(&mut app, KeyCode::Tab);
            app.settle().await;
            assert!(app.state.current().controller.errors().is_empty());
        }

        #[tokio::test]
        async fn test_live_validation_disabled_by_config() {
            let config = AppConfig {
                live_validation: Some(false),
                ..Default::default()
            };
            let mut app = App::new(&config).unwrap();
            type_text(&mut app, "x");
            assert!(!app.is_animating());
        }
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_function_keys_select_pages() {
            let mut app = app();
            press(&mut app, KeyCode::F(5));
            assert_eq!(app.state.current_page, Page::SubmitFirstDeferred);
            press(&mut app, KeyCode::F(9));
            assert_eq!(app.state.current_page, Page::SubmitFirstDeferred);
        }

        #[test]
        fn test_arrows_cycle_pages() {
            let mut app = app();
            press(&mut app, KeyCode::Left);
            assert_eq!(app.state.current_page, Page::SubmitFirstDynamic);
            press(&mut app, KeyCode::Right);
            assert_eq!(app.state.current_page, Page::TouchedChain);
        }

        #[test]
        fn test_start_page_from_config() {
            let config = AppConfig {
                start_page: Some(Page::TouchedDynamic),
                ..Default::default()
            };
            let app = App::new(&config).unwrap();
            assert_eq!(app.state.current_page, Page::TouchedDynamic);
        }

        #[test]
        fn test_ctrl_chars_are_not_typed() {
            let mut app = app();
            app.state.select_page(Page::SubmitFirstChain);
            ctrl(&mut app, 'x');
            assert!(current_values(&app).is_empty());
        }

        #[tokio::test]
        async fn test_missing_dynamic_schema_uses_built_in_rules() {
            let missing = std::env::temp_dir()
                .join(format!("form-lab-missing-{}.json", uuid::Uuid::new_v4()));
            let config = AppConfig {
                dynamic_schema_path: Some(missing),
                start_page: Some(Page::TouchedDynamic),
                ..Default::default()
            };
            let mut app = App::new(&config).unwrap();
            assert_eq!(
                app.status_message.as_deref(),
                Some("Dynamic schema not loaded, using built-in")
            );

            fill_valid(&mut app);
            press(&mut app, KeyCode::Enter);
            app.settle().await;
            assert_eq!(app.notifier.len(), 1);
            assert_eq!(app.notifier.stacked()[0].confirmation.name, "Maria Lima");
        }

        #[test]
        fn test_quit_shortcut() {
            let mut app = app();
            ctrl(&mut app, 'q');
            assert!(app.should_quit());
        }
    }

    mod toasts {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::time::Duration;

        #[tokio::test]
        async fn test_delete_closes_newest_toast() {
            let mut app = app();
            for _ in 0..2 {
                fill_valid(&mut app);
                press(&mut app, KeyCode::Enter);
                app.settle().await;
            }
            assert_eq!(app.notifier.len(), 2);

            press(&mut app, KeyCode::Delete);
            // Default order puts the newest toast first
            let stacked = app.notifier.stacked();
            assert!(!stacked[0].is_open());
            assert!(stacked[1].is_open());
        }

        #[tokio::test]
        async fn test_escape_dismisses_and_tick_expires() {
            let mut app = app();
            fill_valid(&mut app);
            press(&mut app, KeyCode::Enter);
            app.settle().await;
            assert!(app.notifier.stacked()[0].is_open());

            press(&mut app, KeyCode::Esc);
            assert!(!app.notifier.stacked()[0].is_open());
            assert!(app.notifier.newest_open().is_none());

            app.tick(Instant::now() + Duration::from_secs(1));
            assert!(app.notifier.is_empty());
            assert!(!app.is_animating());
        }
    }
}

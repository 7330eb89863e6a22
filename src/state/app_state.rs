//! Application state definitions

use super::forms::{build_controller, ControllerKind, FieldName, FormController};
use crate::schema::{EngineKind, SchemaDescriptor};
use serde::{Deserialize, Serialize};

/// One page per (controller, engine) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    TouchedChain,
    TouchedDeferred,
    TouchedDynamic,
    SubmitFirstChain,
    SubmitFirstDeferred,
    SubmitFirstDynamic,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::TouchedChain,
        Page::TouchedDeferred,
        Page::TouchedDynamic,
        Page::SubmitFirstChain,
        Page::SubmitFirstDeferred,
        Page::SubmitFirstDynamic,
    ];

    pub fn controller_kind(&self) -> ControllerKind {
        match self {
            Self::TouchedChain | Self::TouchedDeferred | Self::TouchedDynamic => {
                ControllerKind::Touched
            }
            Self::SubmitFirstChain | Self::SubmitFirstDeferred | Self::SubmitFirstDynamic => {
                ControllerKind::SubmitFirst
            }
        }
    }

    pub fn engine_kind(&self) -> EngineKind {
        match self {
            Self::TouchedChain | Self::SubmitFirstChain => EngineKind::Chain,
            Self::TouchedDeferred | Self::SubmitFirstDeferred => EngineKind::Deferred,
            Self::TouchedDynamic | Self::SubmitFirstDynamic => EngineKind::Dynamic,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "{} + {}",
            self.controller_kind().label(),
            self.engine_kind().label()
        )
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    /// Page for a 1-based function key number
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A page with its own form session
pub struct PageState {
    pub page: Page,
    pub controller: Box<dyn FormController>,
    pub active_field: FieldName,
}

impl PageState {
    /// Leave the active field, touching it, and focus the next one
    pub fn next_field(&mut self) {
        self.controller.touch(self.active_field);
        self.active_field = self.active_field.next();
    }

    pub fn prev_field(&mut self) {
        self.controller.touch(self.active_field);
        self.active_field = self.active_field.prev();
    }

    pub fn input_char(&mut self, c: char) {
        self.controller.input_char(self.active_field, c);
    }

    pub fn backspace(&mut self) {
        self.controller.backspace(self.active_field);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.focus_first();
    }

    pub fn focus_first(&mut self) {
        self.active_field = FieldName::Name;
    }
}

/// Main application state
pub struct AppState {
    pages: Vec<PageState>,
    pub current_page: Page,
}

impl AppState {
    pub fn new(
        start_page: Page,
        live_validation: bool,
        descriptor: Option<SchemaDescriptor>,
    ) -> Self {
        let pages = Page::ALL
            .iter()
            .map(|&page| {
                let schema = page.engine_kind().build(descriptor.clone());
                PageState {
                    page,
                    controller: build_controller(page.controller_kind(), schema, live_validation),
                    active_field: FieldName::Name,
                }
            })
            .collect();
        Self {
            pages,
            current_page: start_page,
        }
    }

    pub fn page(&self, page: Page) -> &PageState {
        &self.pages[page.index()]
    }

    pub fn page_mut(&mut self, page: Page) -> &mut PageState {
        &mut self.pages[page.index()]
    }

    pub fn current(&self) -> &PageState {
        self.page(self.current_page)
    }

    pub fn current_mut(&mut self) -> &mut PageState {
        self.page_mut(self.current_page)
    }

    pub fn select_page(&mut self, page: Page) {
        self.current_page = page;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.prev();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Page::default(), true, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod page {
        use super::*;

        #[test]
        fn test_titles() {
            assert_eq!(Page::TouchedChain.title(), "Touched + Chain");
            assert_eq!(Page::SubmitFirstDynamic.title(), "SubmitFirst + Dynamic");
        }

        #[test]
        fn test_every_pair_has_a_page() {
            for controller in ControllerKind::ALL {
                for engine in EngineKind::ALL {
                    assert!(Page::ALL
                        .iter()
                        .any(|p| p.controller_kind() == controller && p.engine_kind() == engine));
                }
            }
        }

        #[test]
        fn test_next_prev_wrap() {
            assert_eq!(Page::SubmitFirstDynamic.next(), Page::TouchedChain);
            assert_eq!(Page::TouchedChain.prev(), Page::SubmitFirstDynamic);
            for page in Page::ALL {
                assert_eq!(page.next().prev(), page);
            }
        }

        #[test]
        fn test_from_number() {
            assert_eq!(Page::from_number(1), Some(Page::TouchedChain));
            assert_eq!(Page::from_number(6), Some(Page::SubmitFirstDynamic));
            assert_eq!(Page::from_number(0), None);
            assert_eq!(Page::from_number(7), None);
        }

        #[test]
        fn test_serde_names() {
            let json = serde_json::to_string(&Page::SubmitFirstDeferred).unwrap();
            assert_eq!(json, "\"submit-first-deferred\"");
        }
    }

    mod navigation {
        use super::*;

        #[test]
        fn test_tab_touches_field_left() {
            let mut state = AppState::default();
            let page = state.current_mut();
            page.next_field();
            assert_eq!(page.active_field, FieldName::Email);
            assert!(page.controller.touched().contains(FieldName::Name));

            page.prev_field();
            assert_eq!(page.active_field, FieldName::Name);
            assert!(page.controller.touched().contains(FieldName::Email));
        }

        #[test]
        fn test_pages_keep_their_input() {
            let mut state = AppState::default();
            state.current_mut().input_char('a');
            state.next_page();
            assert!(state.current().controller.values().is_empty());
            state.prev_page();
            assert_eq!(state.current().controller.values().name, "a");
        }

        #[test]
        fn test_controllers_match_pages() {
            let state = AppState::new(Page::SubmitFirstChain, true, None);
            assert_eq!(state.current().page, Page::SubmitFirstChain);
            for page in Page::ALL.iter().map(|p| state.page(*p)) {
                assert_eq!(page.controller.kind(), page.page.controller_kind());
                assert_eq!(page.controller.schema().name(), page.page.engine_kind().name());
            }
        }

        #[test]
        fn test_reset_returns_focus_to_first_field() {
            let mut state = AppState::default();
            let page = state.current_mut();
            page.input_char('x');
            page.next_field();
            page.reset();
            assert_eq!(page.active_field, FieldName::Name);
            assert!(page.controller.values().is_empty());
            assert!(page.controller.touched().is_empty());
        }
    }
}

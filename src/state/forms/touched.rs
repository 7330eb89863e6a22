//! Controller that keeps validation live and gates errors on touched fields

use super::controller::{ControllerKind, FormController, FormCore};
use crate::schema::Schema;
use std::sync::Arc;

pub struct TouchedForm {
    core: FormCore,
    schema: Arc<dyn Schema>,
    live_validation: bool,
}

impl TouchedForm {
    pub fn new(schema: Arc<dyn Schema>, live_validation: bool) -> Self {
        Self {
            core: FormCore::default(),
            schema,
            live_validation,
        }
    }
}

impl FormController for TouchedForm {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Touched
    }

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    fn schema(&self) -> Arc<dyn Schema> {
        Arc::clone(&self.schema)
    }

    fn validates_on_change(&self) -> bool {
        self.live_validation
    }

    fn on_submit_attempt(&mut self) {
        self.core.touch_all();
    }
}

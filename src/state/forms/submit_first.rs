//! Controller that stays quiet until the first submit attempt

use super::controller::{ControllerKind, FormController, FormCore};
use crate::schema::Schema;
use std::sync::Arc;

/// Errors appear only after a submission was attempted; from then on every
/// change revalidates
pub struct SubmitFirstForm {
    core: FormCore,
    schema: Arc<dyn Schema>,
}

impl SubmitFirstForm {
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        Self {
            core: FormCore::default(),
            schema,
        }
    }
}

impl FormController for SubmitFirstForm {
    fn kind(&self) -> ControllerKind {
        ControllerKind::SubmitFirst
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
        self.core.submit_attempted()
    }
}

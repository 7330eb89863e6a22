//! Form controller contract and shared state machine
//!
//! A controller owns the form values and their touched/dirty bookkeeping,
//! and drives validation through a [`Schema`]. Validation may suspend, so a
//! submission is split in two: [`FormController::begin_submit`] hands out a
//! [`ValidationTicket`] and [`FormController::complete_submit`] applies the
//! outcome. Tickets are stamped with the controller's generation (bumped by
//! every reset) and value revision, which lets late results be discarded.

use super::field::{DirtySet, FieldName, FormValues, TouchedSet};
use super::submission::SubmissionHandler;
use crate::schema::{FieldErrors, Schema, ValidationOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    Submit,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub generation: u64,
    pub revision: u64,
    pub kind: TicketKind,
}

/// Snapshot of the values to validate, plus the state it was taken in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTicket {
    pub stamp: Stamp,
    pub values: FormValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Values were valid and handed to the submission handler
    Submitted,
    /// Values were invalid; errors are stored
    Rejected,
    /// A submission was already in flight
    Ignored,
    /// The form was reset while validating
    Stale,
}

/// Which controller backs a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerKind {
    /// Controlled state, errors gated on touched fields
    Touched,
    /// Validation starts with the first submit attempt
    SubmitFirst,
}

impl ControllerKind {
    #[cfg(test)]
    pub const ALL: [ControllerKind; 2] = [ControllerKind::Touched, ControllerKind::SubmitFirst];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Touched => "Touched",
            Self::SubmitFirst => "SubmitFirst",
        }
    }
}

/// State shared by every controller implementation
#[derive(Debug, Default)]
pub struct FormCore {
    values: FormValues,
    touched: TouchedSet,
    dirty: DirtySet,
    errors: FieldErrors,
    submitting: bool,
    submit_attempted: bool,
    generation: u64,
    revision: u64,
    live_pending: bool,
}

impl FormCore {
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn touched(&self) -> &TouchedSet {
        &self.touched
    }

    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    fn stamp(&self, kind: TicketKind) -> Stamp {
        Stamp {
            generation: self.generation,
            revision: self.revision,
            kind,
        }
    }

    #[cfg(test)]
    pub fn set_field(&mut self, field: FieldName, value: String) {
        self.values.set(field, value);
        self.mark_changed(field);
    }

    pub fn push_char(&mut self, field: FieldName, c: char) {
        self.values.push_char(field, c);
        self.mark_changed(field);
    }

    /// Returns false when the field was already empty
    pub fn pop_char(&mut self, field: FieldName) -> bool {
        let popped = self.values.pop_char(field).is_some();
        if popped {
            self.mark_changed(field);
        }
        popped
    }

    fn mark_changed(&mut self, field: FieldName) {
        self.dirty.update(field, self.values.get(field));
        self.revision += 1;
    }

    pub fn touch(&mut self, field: FieldName) {
        self.touched.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.touched.touch_all();
    }

    pub fn reset(&mut self) {
        self.clear_session();
        self.errors.clear();
        self.submitting = false;
        self.generation += 1;
    }

    fn clear_session(&mut self) {
        self.values = FormValues::default();
        self.touched.clear();
        self.dirty.clear();
        self.submit_attempted = false;
        self.live_pending = false;
        self.revision += 1;
    }

    /// Error display policy: an error shows once its field was touched or a
    /// submission was attempted
    pub fn should_show_error(&self, field: FieldName) -> bool {
        self.errors.contains(field) && (self.touched.contains(field) || self.submit_attempted)
    }

    pub fn begin_submit(&mut self) -> Option<ValidationTicket> {
        if self.submitting {
            tracing::debug!("submission already in flight, ignoring");
            return None;
        }
        self.submitting = true;
        self.submit_attempted = true;
        Some(ValidationTicket {
            stamp: self.stamp(TicketKind::Submit),
            values: self.values.clone(),
        })
    }

    pub fn complete_submit(
        &mut self,
        stamp: Stamp,
        outcome: ValidationOutcome,
        handler: &mut dyn SubmissionHandler,
    ) -> SubmitStatus {
        if stamp.kind != TicketKind::Submit || stamp.generation != self.generation {
            tracing::debug!(?stamp, generation = self.generation, "discarding stale submission");
            return SubmitStatus::Stale;
        }
        self.submitting = false;

        match outcome {
            ValidationOutcome::Valid(values) => {
                tracing::info!("submission accepted");
                self.errors.clear();
                handler.on_valid(values);
                self.clear_session();
                SubmitStatus::Submitted
            }
            ValidationOutcome::Invalid(errors) => {
                let codes: Vec<_> = errors.iter().map(|(field, e)| (field, e.code)).collect();
                tracing::info!(?codes, "submission rejected");
                self.errors = errors;
                SubmitStatus::Rejected
            }
        }
    }

    pub fn request_live(&mut self) {
        self.live_pending = true;
    }

    pub fn take_live(&mut self) -> Option<ValidationTicket> {
        if !std::mem::take(&mut self.live_pending) {
            return None;
        }
        Some(ValidationTicket {
            stamp: self.stamp(TicketKind::Live),
            values: self.values.clone(),
        })
    }

    /// Store errors from a live pass; returns false when the result is stale
    pub fn apply_live(&mut self, stamp: Stamp, outcome: ValidationOutcome) -> bool {
        if stamp.kind != TicketKind::Live
            || stamp.generation != self.generation
            || stamp.revision != self.revision
        {
            tracing::trace!(?stamp, "discarding stale live validation");
            return false;
        }
        self.errors = outcome.errors().cloned().unwrap_or_default();
        true
    }
}

/// Owner of one form session, with a pluggable validation policy
#[async_trait]
pub trait FormController: Send {
    fn kind(&self) -> ControllerKind;

    fn core(&self) -> &FormCore;

    fn core_mut(&mut self) -> &mut FormCore;

    fn schema(&self) -> Arc<dyn Schema>;

    /// Whether a value change should schedule validation right now
    fn validates_on_change(&self) -> bool;

    /// Runs when a submission starts
    fn on_submit_attempt(&mut self) {}

    fn values(&self) -> &FormValues {
        self.core().values()
    }

    fn errors(&self) -> &FieldErrors {
        self.core().errors()
    }

    fn touched(&self) -> &TouchedSet {
        self.core().touched()
    }

    fn dirty(&self) -> &DirtySet {
        self.core().dirty()
    }

    fn is_submitting(&self) -> bool {
        self.core().is_submitting()
    }

    fn submit_attempted(&self) -> bool {
        self.core().submit_attempted()
    }

    #[cfg(test)]
    fn set_field(&mut self, field: FieldName, value: String) {
        self.core_mut().set_field(field, value);
        self.after_change();
    }

    fn input_char(&mut self, field: FieldName, c: char) {
        self.core_mut().push_char(field, c);
        self.after_change();
    }

    fn backspace(&mut self, field: FieldName) {
        if self.core_mut().pop_char(field) {
            self.after_change();
        }
    }

    /// Schedule a live pass if the policy wants one
    fn after_change(&mut self) {
        if self.validates_on_change() {
            self.core_mut().request_live();
        }
    }

    fn touch(&mut self, field: FieldName) {
        self.core_mut().touch(field);
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }

    fn should_show_error(&self, field: FieldName) -> bool {
        self.core().should_show_error(field)
    }

    /// Message to render under a field, if the display policy allows one
    fn visible_error(&self, field: FieldName) -> Option<&str> {
        if self.should_show_error(field) {
            self.errors().message(field)
        } else {
            None
        }
    }

    fn begin_submit(&mut self) -> Option<ValidationTicket> {
        let ticket = self.core_mut().begin_submit()?;
        self.on_submit_attempt();
        Some(ticket)
    }

    fn complete_submit(
        &mut self,
        stamp: Stamp,
        outcome: ValidationOutcome,
        handler: &mut dyn SubmissionHandler,
    ) -> SubmitStatus {
        self.core_mut().complete_submit(stamp, outcome, handler)
    }

    fn take_live_request(&mut self) -> Option<ValidationTicket> {
        self.core_mut().take_live()
    }

    fn apply_live(&mut self, stamp: Stamp, outcome: ValidationOutcome) -> bool {
        self.core_mut().apply_live(stamp, outcome)
    }

    /// Validate and complete in one step
    #[cfg(test)]
    async fn submit(&mut self, handler: &mut dyn SubmissionHandler) -> SubmitStatus {
        let Some(ticket) = self.begin_submit() else {
            return SubmitStatus::Ignored;
        };
        let outcome = self.schema().validate(&ticket.values).await;
        self.complete_submit(ticket.stamp, outcome, handler)
    }
}

/// Build a controller of the given kind around a schema
pub fn build_controller(
    kind: ControllerKind,
    schema: Arc<dyn Schema>,
    live_validation: bool,
) -> Box<dyn FormController> {
    match kind {
        ControllerKind::Touched => Box::new(super::TouchedForm::new(schema, live_validation)),
        ControllerKind::SubmitFirst => Box::new(super::SubmitFirstForm::new(schema)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Records every accepted submission
    #[derive(Default)]
    pub struct RecordingHandler {
        pub received: Vec<FormValues>,
    }

    impl SubmissionHandler for RecordingHandler {
        fn on_valid(&mut self, values: FormValues) {
            self.received.push(values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingHandler;
    use super::*;
    use crate::schema::{ErrorCode, FieldError};

    fn invalid(field: FieldName) -> ValidationOutcome {
        let mut errors = FieldErrors::default();
        errors.insert_first(field, FieldError::new(ErrorCode::Required, "required"));
        ValidationOutcome::Invalid(errors)
    }

    mod submission {
        use super::*;

        #[test]
        fn test_second_begin_is_ignored_while_submitting() {
            let mut core = FormCore::default();
            assert!(core.begin_submit().is_some());
            assert!(core.is_submitting());
            assert!(core.begin_submit().is_none());
        }

        #[test]
        fn test_valid_outcome_hands_off_and_resets() {
            let mut core = FormCore::default();
            core.set_field(FieldName::Name, "maria".to_string());
            core.touch(FieldName::Name);
            let ticket = core.begin_submit().unwrap();

            let mut handler = RecordingHandler::default();
            let transformed = FormValues::new("Maria", "", "");
            let status = core.complete_submit(
                ticket.stamp,
                ValidationOutcome::Valid(transformed.clone()),
                &mut handler,
            );

            assert_eq!(status, SubmitStatus::Submitted);
            assert_eq!(handler.received, vec![transformed]);
            assert!(core.values().is_empty());
            assert!(core.touched().is_empty());
            assert!(core.dirty().is_empty());
            assert!(!core.is_submitting());
            assert!(!core.submit_attempted());
        }

        #[test]
        fn test_invalid_outcome_keeps_values() {
            let mut core = FormCore::default();
            core.set_field(FieldName::Email, "x".to_string());
            let ticket = core.begin_submit().unwrap();

            let mut handler = RecordingHandler::default();
            let status = core.complete_submit(ticket.stamp, invalid(FieldName::Name), &mut handler);

            assert_eq!(status, SubmitStatus::Rejected);
            assert!(handler.received.is_empty());
            assert_eq!(core.values().email, "x");
            assert!(core.errors().contains(FieldName::Name));
            assert!(!core.is_submitting());
        }

        #[test]
        fn test_result_after_reset_is_discarded() {
            let mut core = FormCore::default();
            core.set_field(FieldName::Name, "maria".to_string());
            let ticket = core.begin_submit().unwrap();
            core.reset();

            let mut handler = RecordingHandler::default();
            let status = core.complete_submit(
                ticket.stamp,
                ValidationOutcome::Valid(ticket.values.clone()),
                &mut handler,
            );

            assert_eq!(status, SubmitStatus::Stale);
            assert!(handler.received.is_empty());
            assert!(core.values().is_empty());
        }

        #[test]
        fn test_reset_allows_new_submission() {
            let mut core = FormCore::default();
            core.begin_submit().unwrap();
            core.reset();
            assert!(!core.is_submitting());
            assert!(core.begin_submit().is_some());
        }
    }

    mod live {
        use super::*;

        #[test]
        fn test_take_live_only_once() {
            let mut core = FormCore::default();
            core.request_live();
            assert!(core.take_live().is_some());
            assert!(core.take_live().is_none());
        }

        #[test]
        fn test_live_result_for_old_revision_is_discarded() {
            let mut core = FormCore::default();
            core.request_live();
            let ticket = core.take_live().unwrap();
            core.set_field(FieldName::Name, "a".to_string());
            assert!(!core.apply_live(ticket.stamp, invalid(FieldName::Password)));
            assert!(core.errors().is_empty());
        }

        #[test]
        fn test_live_result_applies_errors() {
            let mut core = FormCore::default();
            core.request_live();
            let ticket = core.take_live().unwrap();
            assert!(core.apply_live(ticket.stamp, invalid(FieldName::Password)));
            assert!(core.errors().contains(FieldName::Password));

            core.request_live();
            let ticket = core.take_live().unwrap();
            assert!(core.apply_live(ticket.stamp, ValidationOutcome::Valid(FormValues::default())));
            assert!(core.errors().is_empty());
        }

        #[test]
        fn test_live_stamp_cannot_complete_submission() {
            let mut core = FormCore::default();
            core.request_live();
            let ticket = core.take_live().unwrap();
            let mut handler = RecordingHandler::default();
            assert_eq!(
                core.complete_submit(ticket.stamp, ValidationOutcome::fault(), &mut handler),
                SubmitStatus::Stale
            );
        }
    }

    mod display {
        use super::*;

        #[test]
        fn test_error_hidden_until_touched_or_submitted() {
            let mut core = FormCore::default();
            core.request_live();
            let ticket = core.take_live().unwrap();
            core.apply_live(ticket.stamp, invalid(FieldName::Name));
            assert!(!core.should_show_error(FieldName::Name));

            core.touch(FieldName::Name);
            assert!(core.should_show_error(FieldName::Name));
        }

        #[test]
        fn test_submit_attempt_reveals_errors() {
            let mut core = FormCore::default();
            let ticket = core.begin_submit().unwrap();
            let mut handler = RecordingHandler::default();
            core.complete_submit(ticket.stamp, invalid(FieldName::Email), &mut handler);
            assert!(core.should_show_error(FieldName::Email));
            assert!(!core.should_show_error(FieldName::Name));
        }

        #[test]
        fn test_reset_hides_everything() {
            let mut core = FormCore::default();
            let ticket = core.begin_submit().unwrap();
            let mut handler = RecordingHandler::default();
            core.complete_submit(ticket.stamp, invalid(FieldName::Email), &mut handler);
            core.touch(FieldName::Email);
            core.reset();

            core.set_field(FieldName::Email, "a".to_string());
            core.set_field(FieldName::Email, String::new());
            assert!(core.errors().is_empty());
            assert!(core.touched().is_empty());
            assert!(!core.should_show_error(FieldName::Email));
        }
    }
}

//! Submission handling for validated forms

use super::field::{mask, FormValues};
use crate::state::notifications::{Confirmation, Notify};

/// Receives values that already passed validation
pub trait SubmissionHandler: Send {
    fn on_valid(&mut self, values: FormValues);
}

impl Confirmation {
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            name: values.name.clone(),
            email: values.email.clone(),
            password: mask(&values.password),
        }
    }
}

/// Shows a confirmation toast for every accepted submission.
///
/// Delivery is best-effort: a failing notifier is logged and ignored.
pub struct NotifyOnSubmit<'a, N: Notify + ?Sized> {
    notifier: &'a mut N,
}

impl<'a, N: Notify + ?Sized> NotifyOnSubmit<'a, N> {
    pub fn new(notifier: &'a mut N) -> Self {
        Self { notifier }
    }
}

impl<N: Notify + ?Sized> SubmissionHandler for NotifyOnSubmit<'_, N> {
    fn on_valid(&mut self, values: FormValues) {
        let confirmation = Confirmation::from_values(&values);
        if let Err(err) = self.notifier.notify(confirmation) {
            tracing::warn!(%err, "confirmation dropped");
        }
    }
}

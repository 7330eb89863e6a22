//! Form domain layer
//!
//! Field values, the controller contract and its two validation policies.

mod controller;
mod field;
mod submission;
mod submit_first;
mod touched;

pub use controller::{
    build_controller, ControllerKind, FormController, Stamp, SubmitStatus, TicketKind,
    ValidationTicket,
};
pub use field::{FieldName, FormValues};
pub use submission::NotifyOnSubmit;
pub use submit_first::SubmitFirstForm;
pub use touched::TouchedForm;

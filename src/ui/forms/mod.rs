//! Form rendering module
//!
//! - `field_renderer`: one bound field with its error line
//! - `user_form`: the create-user form shared by every page

mod field_renderer;
mod user_form;

pub use user_form::draw_user_form;

//! Reusable UI components

mod button;
mod toast;

pub use button::{render_button, render_sidebar_button, ButtonState, BUTTON_HEIGHT};
pub use toast::render_toasts;

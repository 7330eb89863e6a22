//! Transient confirmation toasts
//!
//! The [`Notifier`] is the single shared toast service. It is mounted when
//! the application starts and unmounted on exit; pushing to an unmounted
//! notifier fails.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Payload of a submission confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub name: String,
    pub email: String,
    /// Already masked, one `*` per character
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("notification service is not mounted")]
    Unmounted,
}

/// Anything that can present a confirmation to the user
#[cfg_attr(test, mockall::automock)]
pub trait Notify: Send {
    fn notify(&mut self, confirmation: Confirmation) -> Result<(), NotifyError>;
}

/// Screen corner toasts stack from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl ToastPosition {
    pub fn is_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }
}

/// Order of stacked toasts, from the anchor edge outwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastConfig {
    pub duration: Duration,
    pub position: ToastPosition,
    pub order: StackOrder,
}

impl ToastConfig {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration: Self::DEFAULT_DURATION,
            position: ToastPosition::default(),
            order: StackOrder::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub created_at: DateTime<Local>,
    pub confirmation: Confirmation,
    opened_at: Instant,
    closed_at: Option<Instant>,
}

impl Toast {
    /// Enter animation length
    pub const ENTER_DURATION: Duration = Duration::from_millis(150);
    /// Leave animation length; the toast is dropped afterwards
    pub const LEAVE_DURATION: Duration = Duration::from_millis(150);

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Eased visibility from 0.0 (hidden) to 1.0 (fully shown)
    pub fn visibility(&self, now: Instant) -> f32 {
        match self.closed_at {
            None => {
                let t = fraction(now.saturating_duration_since(self.opened_at), Self::ENTER_DURATION);
                simple_easing::cubic_out(t)
            }
            Some(closed) => {
                let t = fraction(now.saturating_duration_since(closed), Self::LEAVE_DURATION);
                1.0 - simple_easing::cubic_in(t)
            }
        }
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

/// Shared toast service
#[derive(Debug)]
pub struct Notifier {
    config: ToastConfig,
    toasts: Vec<Toast>,
    mounted: bool,
}

impl Notifier {
    pub fn mount(config: ToastConfig) -> Self {
        tracing::debug!(?config, "notifier mounted");
        Self {
            config,
            toasts: Vec::new(),
            mounted: true,
        }
    }

    /// Drop every toast and refuse further pushes
    pub fn unmount(&mut self) {
        self.toasts.clear();
        self.mounted = false;
        tracing::debug!("notifier unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &ToastConfig {
        &self.config
    }

    pub fn push_at(&mut self, confirmation: Confirmation, now: Instant) -> Result<Uuid, NotifyError> {
        if !self.mounted {
            return Err(NotifyError::Unmounted);
        }
        let id = Uuid::new_v4();
        self.toasts.push(Toast {
            id,
            created_at: Local::now(),
            confirmation,
            opened_at: now,
            closed_at: None,
        });
        Ok(id)
    }

    /// Close expired toasts and drop those whose leave animation finished
    pub fn tick(&mut self, now: Instant) {
        let duration = self.config.duration;
        for toast in &mut self.toasts {
            if toast.closed_at.is_none() && now.saturating_duration_since(toast.opened_at) >= duration {
                toast.closed_at = Some(now);
            }
        }
        self.toasts.retain(|toast| match toast.closed_at {
            Some(closed) => now.saturating_duration_since(closed) < Toast::LEAVE_DURATION,
            None => true,
        });
    }

    pub fn dismiss(&mut self, id: Uuid, now: Instant) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id && t.is_open()) {
            toast.closed_at = Some(now);
        }
    }

    /// Most recently pushed toast that is still open
    pub fn newest_open(&self) -> Option<Uuid> {
        self.toasts.iter().rev().find(|t| t.is_open()).map(|t| t.id)
    }

    pub fn dismiss_all(&mut self, now: Instant) {
        for toast in self.toasts.iter_mut().filter(|t| t.is_open()) {
            toast.closed_at = Some(now);
        }
    }

    /// Toasts in stacking order, the one nearest the anchor edge first
    pub fn stacked(&self) -> Vec<&Toast> {
        match self.config.order {
            StackOrder::NewestFirst => self.toasts.iter().rev().collect(),
            StackOrder::OldestFirst => self.toasts.iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

impl Notify for Notifier {
    fn notify(&mut self, confirmation: Confirmation) -> Result<(), NotifyError> {
        self.push_at(confirmation, Instant::now()).map(|_| ())
    }
}

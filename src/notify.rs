//! Transient toast notifications.
//!
//! Fire-and-forget: every push creates its own toast with its own clock.
//! Nothing is queued or coalesced, so overlapping pushes are all visible at
//! once. A toast stays visible for [`DISPLAY_WINDOW`], then lingers detached
//! from view for [`DISMISS_GRACE`] (the exit-animation slot) before
//! [`NotifyCenter::sweep`] drops it.

use std::time::{Duration, Instant};

pub const DISPLAY_WINDOW: Duration = Duration::from_millis(3000);
pub const DISMISS_GRACE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: Kind,
    shown_at: Instant,
}

impl Toast {
    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < DISPLAY_WINDOW
    }

    fn is_attached(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < DISPLAY_WINDOW + DISMISS_GRACE
    }
}

#[derive(Debug, Default)]
pub struct NotifyCenter {
    toasts: Vec<Toast>,
}

impl NotifyCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push_at(message, Kind::Success, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push_at(message, Kind::Error, Instant::now());
    }

    pub fn push_at(&mut self, message: impl Into<String>, kind: Kind, now: Instant) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    pub fn visible_at(&self, now: Instant) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |t| t.is_visible(now))
    }

    /// Detach every toast whose grace period has elapsed.
    pub fn sweep(&mut self, now: Instant) {
        self.toasts.retain(|t| t.is_attached(now));
    }

    pub fn attached(&self) -> usize {
        self.toasts.len()
    }
}

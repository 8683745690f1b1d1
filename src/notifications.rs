//! Transient status messages.
//!
//! At most one toast is visible. A new message replaces the current one and
//! re-arms the dismiss deadline, which cancels the previous one. Time is
//! passed in explicitly so the UI loop (or a test) drives dismissal.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Older history entries are dropped past this count.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Ok,
    Err,
    Info,
}

/// The toast currently on screen.
#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub kind: NotificationKind,
    dismiss_at: Instant,
}

impl Toast {
    /// Time left before dismissal, zero once expired.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.dismiss_at.saturating_duration_since(now)
    }
}

/// A past notification with message and timestamp
#[derive(Clone, Debug)]
pub struct NotificationEntry {
    pub message: String,
    pub kind: NotificationKind,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        time_ago_since(self.timestamp, chrono::Local::now())
    }
}

fn time_ago_since(
    then: chrono::DateTime<chrono::Local>,
    now: chrono::DateTime<chrono::Local>,
) -> String {
    let duration = now.signed_duration_since(then);
    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        then.format("%m/%d %H:%M").to_string()
    }
}

#[derive(Debug)]
pub struct NotificationQueue {
    current: Option<Toast>,
    dismiss_after: Duration,
    history: VecDeque<NotificationEntry>,
}

impl NotificationQueue {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            current: None,
            dismiss_after,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.show_at(message, kind, Instant::now());
    }

    /// Replace the visible toast and schedule its dismissal relative to `now`.
    pub fn show_at(&mut self, message: impl Into<String>, kind: NotificationKind, now: Instant) {
        let message = message.into();
        match kind {
            NotificationKind::Err => tracing::warn!("Notify: {}", message),
            _ => tracing::info!("Notify: {}", message),
        }

        self.history.push_back(NotificationEntry::new(message.clone(), kind));
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }

        self.current = Some(Toast {
            message,
            kind,
            dismiss_at: now + self.dismiss_after,
        });
    }

    /// Fire the pending dismissal if its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().map(|t| t.remaining(now).is_zero()).unwrap_or(false) {
            self.current = None;
        }
    }

    /// Visible toast as of `now`, ignoring one whose deadline already passed.
    pub fn visible(&self, now: Instant) -> Option<&Toast> {
        self.current.as_ref().filter(|t| !t.remaining(now).is_zero())
    }

    /// Toast that has not been dismissed by `tick` yet.
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Newest last.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &NotificationEntry> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

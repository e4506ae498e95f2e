//! Toast Notifications
//!
//! User-facing success and failure messages. Views push notifications here;
//! the front end drains and renders them.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Default number of notifications retained before the oldest is dropped
pub const DEFAULT_CAPACITY: usize = 32;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

impl Level {
    /// Glyph shown next to the message
    pub fn icon(&self) -> &'static str {
        match self {
            Level::Success => "✓",
            Level::Error => "✕",
            Level::Warning => "⚠",
            Level::Info => "ℹ",
        }
    }
}

/// A single toast
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.icon(), self.message)
    }
}

/// Bounded queue of pending notifications
#[derive(Debug)]
pub struct Notifier {
    pending: VecDeque<Notification>,
    capacity: usize,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::new(Level::Success, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::new(Level::Error, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::new(Level::Warning, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::new(Level::Info, message));
    }

    /// Queue a notification, evicting the oldest when full
    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            Level::Error => tracing::warn!(message = %notification.message, "Error notification"),
            Level::Warning => tracing::warn!(message = %notification.message, "Warning notification"),
            _ => tracing::debug!(message = %notification.message, "Notification"),
        }

        if self.pending.len() == self.capacity {
            self.pending.pop_front();
        }
        self.pending.push_back(notification);
    }

    /// Most recent notification, if any
    pub fn latest(&self) -> Option<&Notification> {
        self.pending.back()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take all pending notifications, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }
}

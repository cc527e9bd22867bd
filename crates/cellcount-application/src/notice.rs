//! Transient error banner.

use chrono::{DateTime, Duration, Utc};

/// What kind of problem a notice reports. Rendered differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The technician can fix the input.
    Validation,
    /// Storage rejected an operation.
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Holds at most one notice; a newer one replaces the older one.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    lifetime: Duration,
}

impl NoticeBoard {
    pub fn new(lifetime: std::time::Duration) -> Self {
        Self {
            current: None,
            lifetime: Duration::from_std(lifetime).unwrap_or_else(|_| Duration::weeks(52)),
        }
    }

    pub fn raise(&mut self, kind: NoticeKind, message: impl Into<String>, now: DateTime<Utc>) {
        self.current = Some(Notice {
            kind,
            message: message.into(),
            raised_at: now,
        });
    }

    /// The notice still visible at `now`.
    pub fn active(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| now.signed_duration_since(notice.raised_at) < self.lifetime)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

//! Non-fatal notices for the host editor
//!
//! Library code never talks to the UI. Failures that the user should hear
//! about are handed to a [`Notifier`], and the host decides how to show
//! them. [`NoticeBroadcaster`] fans notices out over a broadcast channel.

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives notices raised while serving requests
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Drops every notice; for hosts that only want the logs
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Broadcasts notices to any number of subscribers
#[derive(Clone)]
pub struct NoticeBroadcaster {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBroadcaster {
    /// Create a new broadcaster with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Notifier for NoticeBroadcaster {
    fn notify(&self, notice: Notice) {
        match self.sender.send(notice) {
            Ok(count) => tracing::debug!("notice delivered to {count} subscribers"),
            // No receivers, this is fine
            Err(broadcast::error::SendError(notice)) => {
                tracing::debug!("no subscribers for notice: {}", notice.message);
            }
        }
    }
}

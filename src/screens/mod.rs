//! Per-screen controllers.
//!
//! Each controller owns its view state behind a lock and exposes `&self`
//! operations, so an embedding UI (or the CLI) can drive several calls at
//! once. View state is never persisted; reads return snapshots.

pub mod admin;
pub mod chat;
pub mod push;
pub mod reminders;
pub mod settings;

pub use admin::{AdminController, AdminView};
pub use chat::{describe_action, ChatController, ChatRole, ChatView, TranscriptEntry};
pub use push::{
    PermissionStatus, PushError, PushMount, PushPlatform, PushRegistrar, RegistrationOutcome,
    SkipReason, StaticPushPlatform,
};
pub use reminders::{RemindersController, RemindersView};
pub use settings::SettingsController;

use tracing::warn;

/// A blocking, user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Where controllers send alerts the user must acknowledge.
pub trait AlertSink: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Alerts written to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&self, title: &str, message: &str) {
        warn!(title, "{}", message);
    }
}

/// Alerts printed to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn alert(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}

/// Alerts kept in memory, for embedding UIs that render them later.
#[derive(Debug, Default)]
pub struct RecordedAlerts {
    alerts: parking_lot::Mutex<Vec<Alert>>,
}

impl RecordedAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the alerts raised so far.
    pub fn take(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock())
    }
}

impl AlertSink for RecordedAlerts {
    fn alert(&self, title: &str, message: &str) {
        self.alerts.lock().push(Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

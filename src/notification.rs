//! User-facing notifications for save results.
//!
//! Saves carry a pair of message keys (success and error). The store reports
//! the outcome through a [`Notifier`]; the keys never influence control flow.

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Message keys shown after a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveMessages {
    pub success_message_key: String,
    pub error_message_key: String,
}

impl SaveMessages {
    pub fn new(success: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success_message_key: success.into(),
            error_message_key: error.into(),
        }
    }

    /// Keys used when a group is deleted.
    pub fn group_deleted() -> Self {
        Self::new("deleteSuccess", "deleteAttributeGroupError")
    }

    /// Keys used when a group is created.
    pub fn group_created() -> Self {
        Self::new("createGroupSuccess", "createGroupError")
    }

    /// Keys used when a group is edited.
    pub fn group_updated() -> Self {
        Self::new("updateGroupSuccess", "updateGroupError")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message_key: String,
    /// Error detail, only for failures
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message_key: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message_key: message_key.into(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn error(message_key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message_key: message_key.into(),
            detail: Some(detail.into()),
            created_at: Utc::now(),
        }
    }
}

/// Receives user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!("{}", notification.message_key),
            NotificationKind::Error => error!(
                "{}: {}",
                notification.message_key,
                notification.detail.as_deref().unwrap_or("")
            ),
        }
    }
}

/// Keeps every notification for later inspection.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Message keys received so far, oldest first.
    pub fn message_keys(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|notification| notification.message_key)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_state() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();

        notifier.notify(Notification::success("deleteSuccess"));
        notifier.notify(Notification::error("deleteAttributeGroupError", "rejected"));

        assert_eq!(
            handle.message_keys(),
            vec!["deleteSuccess", "deleteAttributeGroupError"]
        );
        let last = &handle.notifications()[1];
        assert_eq!(last.kind, NotificationKind::Error);
        assert_eq!(last.detail.as_deref(), Some("rejected"));
    }

    #[test]
    fn test_deletion_message_keys() {
        let messages = SaveMessages::group_deleted();
        assert_eq!(messages.success_message_key, "deleteSuccess");
        assert_eq!(messages.error_message_key, "deleteAttributeGroupError");
    }

    #[test]
    fn test_notification_json() {
        let json = serde_json::to_value(Notification::error("createGroupError", "conflict")).unwrap();

        assert_eq!(json["kind"], "error");
        assert_eq!(json["messageKey"], "createGroupError");
        assert!(json["createdAt"].is_string());
    }
}

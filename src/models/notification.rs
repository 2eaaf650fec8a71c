use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An in-app notification shown in the notification center.
///
/// `kind` is kept as the raw string so unknown types coming from the
/// store survive a round trip; see [`NotificationIcon::for_kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub created_at: String,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewNotificationRequest {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub title: String,
    pub message: String,
}

fn default_kind() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationIcon {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationIcon {
    /// Unrecognised types fall back to `Info`.
    pub fn for_kind(kind: &str) -> Self {
        match kind {
            "success" => NotificationIcon::Success,
            "warning" => NotificationIcon::Warning,
            "error" => NotificationIcon::Error,
            _ => NotificationIcon::Info,
        }
    }
}

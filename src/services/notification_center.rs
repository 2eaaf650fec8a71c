use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Notification, NotificationIcon};
use crate::store::StoreError;

const BADGE_CAP: usize = 99;

/// Source of one user's notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Notifications in display order (newest first).
    async fn list(&self) -> Result<Vec<Notification>, StoreError>;
    async fn unread_count(&self) -> Result<usize, StoreError>;
    /// Marking an already-read notification is a no-op; an id the user does
    /// not own fails with [`StoreError::NoRows`].
    async fn mark_as_read(&self, id: &str) -> Result<(), StoreError>;
    async fn mark_all_as_read(&self) -> Result<(), StoreError>;
}

/// One row of the notification panel.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationItem {
    pub id: String,
    pub icon: NotificationIcon,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub received: String,
}

/// Text on the bell badge; `None` hides the badge.
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > BADGE_CAP => Some(format!("{}+", BADGE_CAP)),
        n => Some(n.to_string()),
    }
}

/// Bell button plus drop-down panel.
pub struct NotificationCenter {
    store: Arc<dyn NotificationStore>,
    open: bool,
}

impl NotificationCenter {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store, open: false }
    }

    pub async fn unread_count(&self) -> Result<usize, StoreError> {
        self.store.unread_count().await
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Panel rows in the order the store supplies them.
    pub async fn items(&self, now: DateTime<Utc>) -> Result<Vec<NotificationItem>, StoreError> {
        let notifications = self.store.list().await?;
        Ok(notifications
            .into_iter()
            .map(|n| NotificationItem {
                icon: NotificationIcon::for_kind(&n.kind),
                received: format_relative(&n.created_at, now),
                id: n.id,
                title: n.title,
                message: n.message,
                read: n.read,
            })
            .collect())
    }

    pub async fn select(&self, id: &str) -> Result<(), StoreError> {
        self.store.mark_as_read(id).await
    }

    pub async fn mark_all_as_read(&self) -> Result<(), StoreError> {
        self.store.mark_all_as_read().await
    }
}

/// "just now", "5m ago", "3h ago", "2d ago". Unparseable timestamps are
/// returned unchanged.
pub fn format_relative(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let elapsed = now.signed_duration_since(then.with_timezone(&Utc));

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

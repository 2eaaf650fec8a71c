use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);
pub const DEFAULT_TOAST_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: String,
    pub level: ToastLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Transient, fire-and-forget outcome messages.
pub trait Toaster: Send + Sync {
    fn push(&self, level: ToastLevel, message: String);

    fn success(&self, message: &str) {
        self.push(ToastLevel::Success, message.to_string());
    }

    fn error(&self, message: &str) {
        self.push(ToastLevel::Error, message.to_string());
    }
}

/// A bounded stack of toasts that expire after a fixed TTL.
#[derive(Debug)]
pub struct ToastQueue {
    ttl: Duration,
    capacity: usize,
    toasts: Mutex<VecDeque<Toast>>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL, DEFAULT_TOAST_CAPACITY)
    }
}

impl ToastQueue {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            toasts: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.toasts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Unexpired toasts, newest first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Toast> {
        self.lock()
            .iter()
            .rev()
            .filter(|toast| toast.expires_at > now)
            .cloned()
            .collect()
    }

    pub fn dismiss(&self, id: &str) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.expires_at > now);
        before - toasts.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Toaster for ToastQueue {
    fn push(&self, level: ToastLevel, message: String) {
        match level {
            ToastLevel::Error => warn!("toast [error]: {}", message),
            _ => info!("toast [{:?}]: {}", level, message),
        }

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::seconds(4));
        let toast = Toast {
            id: Uuid::new_v4().to_string(),
            level,
            message,
            created_at: now,
            expires_at: now + ttl,
        };

        let mut toasts = self.lock();
        toasts.push_back(toast);
        while toasts.len() > self.capacity {
            toasts.pop_front();
        }
    }
}

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sqlx::SqlitePool;

use crate::services::ScheduleCache;
use crate::store::ScheduleStore;
use crate::toast::ToastQueue;

/// Per-session values, created on first use.
pub struct SessionRegistry<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> SessionRegistry<T> {
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    pub fn for_session(&self, key: &str) -> Arc<T> {
        if let Some(existing) = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
        {
            return existing.clone();
        }

        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new((self.factory)()))
            .clone()
    }

    pub fn all(&self) -> Vec<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Drops sessions for which `keep` returns false, unless a caller still
    /// holds that session's value. Returns how many were dropped.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        entries.retain(|_, value| Arc::strong_count(value) > 1 || keep(value));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl<T: Default + 'static> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<dyn ScheduleStore>,
    pub cache: Arc<ScheduleCache>,
    pub toasts: Arc<SessionRegistry<ToastQueue>>,
}

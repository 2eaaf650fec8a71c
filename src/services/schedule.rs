use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::models::{NewScheduledLecture, ScheduledLecture, ScheduledLectureWithLecture};
use crate::store::ScheduleStore;
use crate::toast::Toaster;

pub const SCHEDULED_LECTURES: &str = "scheduled_lectures";

pub type ScheduleCache = QueryCache<Vec<ScheduledLectureWithLecture>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("You must be signed in to manage your schedule")]
    Unauthenticated,

    #[error("{0}")]
    RemoteRejected(String),

    #[error("Scheduled lecture not found: {0}")]
    NotFound(String),

    #[error("Invalid schedule: {0}")]
    Invalid(String),
}

/// Scheduled-lecture operations for one signed-in user.
///
/// Reads go through the shared [`ScheduleCache`]; every successful mutation
/// invalidates it so the next [`LectureScheduler::scheduled_lectures`] call
/// goes back to the store. Every failure is also reported to the toaster.
#[derive(Clone)]
pub struct LectureScheduler {
    store: Arc<dyn ScheduleStore>,
    cache: Arc<ScheduleCache>,
    toaster: Arc<dyn Toaster>,
    user_id: Option<String>,
}

impl LectureScheduler {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        cache: Arc<ScheduleCache>,
        toaster: Arc<dyn Toaster>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            store,
            cache,
            toaster,
            user_id,
        }
    }

    fn cache_key(user_id: &str) -> QueryKey {
        QueryKey::new(SCHEDULED_LECTURES, user_id)
    }

    fn require_user(&self) -> Result<&str, ScheduleError> {
        match self.user_id.as_deref() {
            Some(user_id) => Ok(user_id),
            None => {
                let err = ScheduleError::Unauthenticated;
                self.toaster.error(&err.to_string());
                Err(err)
            }
        }
    }

    /// The user's scheduled lectures. Never fails: a signed-out caller or a
    /// failed read yields an empty list.
    pub async fn scheduled_lectures(&self) -> Vec<ScheduledLectureWithLecture> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Vec::new();
        };
        let key = Self::cache_key(user_id);

        if let Some(cached) = self.cache.fresh(&key).await {
            return cached;
        }

        let ticket = self.cache.begin_fetch(&key).await;
        match self.store.list_scheduled_lectures(user_id).await {
            Ok(rows) => {
                self.cache.store(key, rows.clone(), ticket).await;
                rows
            }
            Err(e) => {
                warn!("failed to load scheduled lectures for {}: {}", user_id, e);
                self.toaster
                    .error(&format!("Failed to load scheduled lectures: {}", e));
                Vec::new()
            }
        }
    }

    pub async fn schedule(
        &self,
        request: NewScheduledLecture,
    ) -> Result<ScheduledLecture, ScheduleError> {
        let user_id = self.require_user()?;

        if let Err(msg) = request.validate() {
            let err = ScheduleError::Invalid(msg);
            self.toaster.error(&err.to_string());
            return Err(err);
        }

        let draft = request.for_user(user_id);
        match self.store.insert_scheduled_lecture(&draft).await {
            Ok(created) => {
                info!("scheduled lecture {} for {}", created.id, user_id);
                self.toaster.success("Lecture scheduled successfully");
                self.cache.invalidate(SCHEDULED_LECTURES).await;
                Ok(created)
            }
            Err(e) => {
                self.toaster.error(&format!("Failed to schedule lecture: {}", e));
                Err(ScheduleError::RemoteRejected(e.to_string()))
            }
        }
    }

    /// Flips the completion flag of a lecture.
    ///
    /// The current value comes from [`LectureScheduler::scheduled_lectures`],
    /// so a list invalidated by an earlier mutation is refetched first.
    pub async fn toggle_completion(&self, id: &str) -> Result<ScheduledLecture, ScheduleError> {
        let user_id = self.require_user()?;
        let rows = self.scheduled_lectures().await;

        let Some(current) = rows.iter().find(|row| row.id() == id) else {
            let err = ScheduleError::NotFound(id.to_string());
            self.toaster.error(&err.to_string());
            return Err(err);
        };

        let completed = !current.schedule.completed;
        match self.store.set_completed(user_id, id, completed).await {
            Ok(updated) => {
                self.cache.invalidate(SCHEDULED_LECTURES).await;
                Ok(updated)
            }
            Err(e) => {
                self.toaster.error(&format!("Failed to update lecture: {}", e));
                Err(ScheduleError::RemoteRejected(e.to_string()))
            }
        }
    }

    pub async fn remove(&self, id: &str) -> Result<(), ScheduleError> {
        let user_id = self.require_user()?;

        match self.store.delete_scheduled_lecture(user_id, id).await {
            Ok(()) => {
                info!("removed scheduled lecture {} for {}", id, user_id);
                self.toaster.success("Scheduled lecture removed");
                self.cache.invalidate(SCHEDULED_LECTURES).await;
                Ok(())
            }
            Err(e) => {
                self.toaster
                    .error(&format!("Failed to remove scheduled lecture: {}", e));
                Err(ScheduleError::RemoteRejected(e.to_string()))
            }
        }
    }
}

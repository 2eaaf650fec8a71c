use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::models::{
    Notification, ScheduledLecture, ScheduledLectureDraft, ScheduledLectureWithLecture,
};
use crate::services::NotificationStore;
use crate::store::{ScheduleStore, StoreError};

/// Local SQLite-backed store. The lecture embedding is answered with a join.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleStore for SqliteStore {
    async fn list_scheduled_lectures(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScheduledLectureWithLecture>, StoreError> {
        Ok(repository::fetch_scheduled_lectures(&self.db, user_id).await?)
    }

    async fn insert_scheduled_lecture(
        &self,
        draft: &ScheduledLectureDraft,
    ) -> Result<ScheduledLecture, StoreError> {
        Ok(repository::insert_scheduled_lecture(&self.db, draft).await?)
    }

    async fn set_completed(
        &self,
        user_id: &str,
        id: &str,
        completed: bool,
    ) -> Result<ScheduledLecture, StoreError> {
        repository::set_scheduled_lecture_completed(&self.db, user_id, id, completed)
            .await?
            .ok_or(StoreError::NoRows)
    }

    async fn delete_scheduled_lecture(&self, user_id: &str, id: &str) -> Result<(), StoreError> {
        if repository::delete_scheduled_lecture(&self.db, user_id, id).await? {
            Ok(())
        } else {
            Err(StoreError::NoRows)
        }
    }
}

/// One user's inbox in the `notifications` table.
#[derive(Clone)]
pub struct SqliteNotificationStore {
    db: SqlitePool,
    user_id: String,
}

impl SqliteNotificationStore {
    pub fn new(db: SqlitePool, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    async fn list(&self) -> Result<Vec<Notification>, StoreError> {
        Ok(repository::fetch_notifications(&self.db, &self.user_id).await?)
    }

    async fn unread_count(&self) -> Result<usize, StoreError> {
        let count = repository::count_unread_notifications(&self.db, &self.user_id).await?;
        Ok(count.max(0) as usize)
    }

    async fn mark_as_read(&self, id: &str) -> Result<(), StoreError> {
        if repository::mark_notification_read(&self.db, &self.user_id, id).await? {
            Ok(())
        } else {
            Err(StoreError::NoRows)
        }
    }

    async fn mark_all_as_read(&self) -> Result<(), StoreError> {
        repository::mark_all_notifications_read(&self.db, &self.user_id).await?;
        Ok(())
    }
}

pub mod dto;
pub mod rest;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ScheduledLecture, ScheduledLectureDraft, ScheduledLectureWithLecture};

pub use rest::{RestStore, RestStoreConfig};
pub use sqlite::{SqliteNotificationStore, SqliteStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("no matching row")]
    NoRows,

    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Remote store contract for the `scheduled_lectures` table.
///
/// Every read and write is filtered by the owning user's id; an update or
/// delete that matches no row for that user fails with [`StoreError::NoRows`].
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// All of the user's scheduled lectures with the lecture title, subject
    /// id and subject name embedded, ordered by date then start time.
    async fn list_scheduled_lectures(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScheduledLectureWithLecture>, StoreError>;

    async fn insert_scheduled_lecture(
        &self,
        draft: &ScheduledLectureDraft,
    ) -> Result<ScheduledLecture, StoreError>;

    async fn set_completed(
        &self,
        user_id: &str,
        id: &str,
        completed: bool,
    ) -> Result<ScheduledLecture, StoreError>;

    async fn delete_scheduled_lecture(&self, user_id: &str, id: &str) -> Result<(), StoreError>;
}

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::Notify;
use study_planner::db::repository;
use study_planner::models::{
    Lecture, NewLectureRequest, NewSubjectRequest, ScheduledLecture, ScheduledLectureDraft,
    ScheduledLectureWithLecture,
};
use study_planner::store::{ScheduleStore, SqliteStore, StoreError};

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn seed_lecture(pool: &SqlitePool, user_id: &str, title: &str) -> Lecture {
    let subject = repository::insert_subject(
        pool,
        user_id,
        NewSubjectRequest {
            name: "Computer Science".to_string(),
            color: None,
            description: None,
        },
    )
    .await
    .expect("Failed to insert subject");

    repository::insert_lecture(
        pool,
        user_id,
        NewLectureRequest {
            subject_id: subject.id,
            title: title.to_string(),
            description: None,
            duration_minutes: Some(60),
        },
    )
    .await
    .expect("Failed to insert lecture")
}

/// Wraps a real store; mutations can be switched to fail and every call is
/// counted. With `hold_lists` set, a list reads its rows, signals
/// `list_read` and then waits for `release_list` before returning them.
pub struct FlakyStore {
    inner: SqliteStore,
    pub fail_mutations: AtomicBool,
    pub fail_reads: AtomicBool,
    pub hold_lists: AtomicBool,
    pub list_read: Notify,
    pub release_list: Notify,
    pub list_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub last_completed: std::sync::Mutex<Option<bool>>,
}

impl FlakyStore {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::new(pool),
            fail_mutations: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            hold_lists: AtomicBool::new(false),
            list_read: Notify::new(),
            release_list: Notify::new(),
            list_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            last_completed: std::sync::Mutex::new(None),
        })
    }

    fn network_error() -> StoreError {
        StoreError::Rejected {
            status: 503,
            message: "network unreachable".to_string(),
        }
    }
}

#[async_trait]
impl ScheduleStore for FlakyStore {
    async fn list_scheduled_lectures(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScheduledLectureWithLecture>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }
        let hold = self.hold_lists.load(Ordering::SeqCst);
        let rows = self.inner.list_scheduled_lectures(user_id).await;
        if hold {
            self.list_read.notify_one();
            self.release_list.notified().await;
        }
        rows
    }

    async fn insert_scheduled_lecture(
        &self,
        draft: &ScheduledLectureDraft,
    ) -> Result<ScheduledLecture, StoreError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }
        self.inner.insert_scheduled_lecture(draft).await
    }

    async fn set_completed(
        &self,
        user_id: &str,
        id: &str,
        completed: bool,
    ) -> Result<ScheduledLecture, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_completed.lock().unwrap() = Some(completed);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }
        self.inner.set_completed(user_id, id, completed).await
    }

    async fn delete_scheduled_lecture(&self, user_id: &str, id: &str) -> Result<(), StoreError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }
        self.inner.delete_scheduled_lecture(user_id, id).await
    }
}

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Utc;
use study_planner::models::NewScheduledLecture;
use study_planner::services::{LectureScheduler, ScheduleCache, ScheduleError};
use study_planner::toast::{ToastLevel, ToastQueue};

use common::{FlakyStore, seed_lecture, setup_test_db};

fn request(lecture_id: &str, date: &str, start: &str, end: &str) -> NewScheduledLecture {
    NewScheduledLecture {
        lecture_id: lecture_id.to_string(),
        scheduled_date: date.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        completed: false,
    }
}

struct Harness {
    store: Arc<FlakyStore>,
    cache: Arc<ScheduleCache>,
    toasts: Arc<ToastQueue>,
}

impl Harness {
    fn scheduler(&self, user: Option<&str>) -> LectureScheduler {
        LectureScheduler::new(
            self.store.clone(),
            self.cache.clone(),
            self.toasts.clone(),
            user.map(str::to_string),
        )
    }

    fn last_toast(&self) -> (ToastLevel, String) {
        let toast = self.toasts.active(Utc::now()).into_iter().next().expect("no toast pushed");
        (toast.level, toast.message)
    }
}

async fn harness() -> (Harness, sqlx::SqlitePool) {
    let pool = setup_test_db().await;
    let harness = Harness {
        store: FlakyStore::new(pool.clone()),
        cache: Arc::new(ScheduleCache::new()),
        toasts: Arc::new(ToastQueue::default()),
    };
    (harness, pool)
}

#[tokio::test]
async fn test_create_then_list_includes_exact_entry() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Operating Systems").await;
    let scheduler = h.scheduler(Some("user-u"));

    let before = scheduler.scheduled_lectures().await;
    assert!(before.is_empty());

    let created = scheduler
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .expect("create should succeed");
    assert_eq!(created.user_id, "user-u");

    let after = scheduler.scheduled_lectures().await;
    assert_eq!(after.len(), before.len() + 1);

    let entry = &after[0];
    assert_eq!(entry.schedule.id, created.id);
    assert_eq!(entry.schedule.lecture_id, lecture.id);
    assert_eq!(entry.schedule.scheduled_date, "2024-06-01");
    assert_eq!(entry.schedule.start_time, "10:00");
    assert_eq!(entry.schedule.end_time, "11:00");
    assert!(!entry.schedule.completed);

    let summary = entry.lecture.as_ref().expect("lecture should be embedded");
    assert_eq!(summary.title, "Operating Systems");
    assert_eq!(summary.subject.as_ref().unwrap().name, "Computer Science");

    assert_eq!(
        h.last_toast(),
        (ToastLevel::Success, "Lecture scheduled successfully".to_string())
    );
}

#[tokio::test]
async fn test_list_never_returns_other_users_rows() {
    let (h, pool) = harness().await;
    let mine = seed_lecture(&pool, "alice", "Compilers").await;
    let theirs = seed_lecture(&pool, "bob", "Databases").await;

    h.scheduler(Some("alice"))
        .schedule(request(&mine.id, "2024-06-01", "09:00", "10:00"))
        .await
        .unwrap();
    h.scheduler(Some("bob"))
        .schedule(request(&theirs.id, "2024-06-01", "09:00", "10:00"))
        .await
        .unwrap();

    let alice_rows = h.scheduler(Some("alice")).scheduled_lectures().await;
    assert_eq!(alice_rows.len(), 1);
    assert!(alice_rows.iter().all(|row| row.schedule.user_id == "alice"));

    let bob_rows = h.scheduler(Some("bob")).scheduled_lectures().await;
    assert_eq!(bob_rows.len(), 1);
    assert_eq!(bob_rows[0].schedule.user_id, "bob");
}

#[tokio::test]
async fn test_toggle_twice_restores_flag() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Networks").await;
    let scheduler = h.scheduler(Some("user-u"));

    let created = scheduler
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap();
    scheduler.scheduled_lectures().await;

    let first = scheduler.toggle_completion(&created.id).await.unwrap();
    assert!(first.completed);
    assert_eq!(*h.store.last_completed.lock().unwrap(), Some(true));

    scheduler.scheduled_lectures().await;
    let second = scheduler.toggle_completion(&created.id).await.unwrap();
    assert!(!second.completed);

    let rows = scheduler.scheduled_lectures().await;
    assert!(!rows[0].schedule.completed);
}

#[tokio::test]
async fn test_toggle_failure_leaves_cache_unchanged() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Networks").await;
    let scheduler = h.scheduler(Some("user-u"));

    let created = scheduler
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap();
    let cached = scheduler.scheduled_lectures().await;
    let list_calls = h.store.list_calls.load(Ordering::SeqCst);

    h.store.fail_mutations.store(true, Ordering::SeqCst);
    let err = scheduler.toggle_completion(&created.id).await.unwrap_err();

    assert!(matches!(err, ScheduleError::RemoteRejected(ref msg) if msg.contains("network unreachable")));
    assert_eq!(*h.store.last_completed.lock().unwrap(), Some(true));

    let (level, message) = h.last_toast();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Failed to update lecture"));

    // still fresh, no refetch, no local flip
    assert_eq!(scheduler.scheduled_lectures().await, cached);
    assert_eq!(h.store.list_calls.load(Ordering::SeqCst), list_calls);
}

#[tokio::test]
async fn test_toggle_twice_without_listing_restores_flag() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Networks").await;
    let scheduler = h.scheduler(Some("user-u"));

    let created = scheduler
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap();

    let first = scheduler.toggle_completion(&created.id).await.unwrap();
    assert!(first.completed);
    let second = scheduler.toggle_completion(&created.id).await.unwrap();
    assert!(!second.completed);
    assert_eq!(*h.store.last_completed.lock().unwrap(), Some(false));
    assert_eq!(h.store.update_calls.load(Ordering::SeqCst), 2);

    let rows = scheduler.scheduled_lectures().await;
    assert!(!rows[0].schedule.completed);
}

#[tokio::test]
async fn test_list_in_flight_during_create_is_not_served_as_fresh() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Networks").await;
    let scheduler = h.scheduler(Some("user-u"));

    h.store.hold_lists.store(true, Ordering::SeqCst);
    let slow = scheduler.clone();
    let in_flight = tokio::spawn(async move { slow.scheduled_lectures().await });

    // the list has read zero rows and is parked before caching them
    h.store.list_read.notified().await;
    h.store.hold_lists.store(false, Ordering::SeqCst);
    scheduler
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap();

    h.store.release_list.notify_one();
    assert!(in_flight.await.unwrap().is_empty());

    let rows = scheduler.scheduled_lectures().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].schedule.lecture_id, lecture.id);
}

#[tokio::test]
async fn test_toggle_loads_list_when_nothing_cached() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Networks").await;

    let created = h
        .scheduler(Some("user-u"))
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap();

    let fresh = LectureScheduler::new(
        h.store.clone(),
        Arc::new(ScheduleCache::new()),
        h.toasts.clone(),
        Some("user-u".to_string()),
    );
    let updated = fresh.toggle_completion(&created.id).await.unwrap();
    assert!(updated.completed);
}

#[tokio::test]
async fn test_delete_removes_only_target() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Algorithms").await;
    let scheduler = h.scheduler(Some("user-u"));

    let keep = scheduler
        .schedule(request(&lecture.id, "2024-06-01", "08:00", "09:00"))
        .await
        .unwrap();
    let gone = scheduler
        .schedule(request(&lecture.id, "2024-06-02", "08:00", "09:00"))
        .await
        .unwrap();

    scheduler.remove(&gone.id).await.expect("delete should succeed");
    assert_eq!(
        h.last_toast(),
        (ToastLevel::Success, "Scheduled lecture removed".to_string())
    );

    let rows = scheduler.scheduled_lectures().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].schedule.id, keep.id);
}

#[tokio::test]
async fn test_delete_missing_id_is_remote_rejection() {
    let (h, _pool) = harness().await;
    let scheduler = h.scheduler(Some("user-u"));

    let err = scheduler.remove("does-not-exist").await.unwrap_err();
    assert!(matches!(err, ScheduleError::RemoteRejected(_)));
    assert_eq!(h.last_toast().0, ToastLevel::Error);
}

#[tokio::test]
async fn test_delete_of_other_users_row_is_rejected() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "alice", "Compilers").await;
    let created = h
        .scheduler(Some("alice"))
        .schedule(request(&lecture.id, "2024-06-01", "09:00", "10:00"))
        .await
        .unwrap();

    let err = h.scheduler(Some("bob")).remove(&created.id).await.unwrap_err();
    assert!(matches!(err, ScheduleError::RemoteRejected(_)));
    assert_eq!(h.scheduler(Some("alice")).scheduled_lectures().await.len(), 1);
}

#[tokio::test]
async fn test_read_failure_yields_empty_list_and_error_toast() {
    let (h, _pool) = harness().await;
    h.store.fail_reads.store(true, Ordering::SeqCst);

    let rows = h.scheduler(Some("user-u")).scheduled_lectures().await;
    assert!(rows.is_empty());

    let (level, message) = h.last_toast();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Failed to load scheduled lectures"));
}

#[tokio::test]
async fn test_create_failure_surfaces_store_message() {
    let (h, pool) = harness().await;
    let lecture = seed_lecture(&pool, "user-u", "Networks").await;
    h.store.fail_mutations.store(true, Ordering::SeqCst);

    let err = h
        .scheduler(Some("user-u"))
        .schedule(request(&lecture.id, "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap_err();

    assert!(matches!(err, ScheduleError::RemoteRejected(ref msg) if msg.contains("network unreachable")));
    assert_eq!(h.last_toast().0, ToastLevel::Error);
}

#[tokio::test]
async fn test_create_with_unknown_lecture_is_rejected_by_store() {
    let (h, _pool) = harness().await;

    let err = h
        .scheduler(Some("user-u"))
        .schedule(request("no-such-lecture", "2024-06-01", "10:00", "11:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::RemoteRejected(_)));
}

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::{
    Lecture, LectureSummary, NewLectureRequest, NewNotificationRequest, NewSubjectRequest,
    Notification, ScheduledLecture, ScheduledLectureDraft, ScheduledLectureWithLecture, Subject,
    SubjectName,
};

pub async fn fetch_subjects(db: &SqlitePool, user_id: &str) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(
        r#"
        SELECT id, user_id, name, color, description, created_at, updated_at
        FROM subjects
        WHERE user_id = ?1
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn insert_subject(
    db: &SqlitePool,
    user_id: &str,
    req: NewSubjectRequest,
) -> Result<Subject, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO subjects (id, user_id, name, color, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.color)
    .bind(&req.description)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Subject {
        id,
        user_id: user_id.to_string(),
        name: req.name,
        color: req.color,
        description: req.description,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn fetch_lectures(db: &SqlitePool, user_id: &str) -> Result<Vec<Lecture>, sqlx::Error> {
    sqlx::query_as::<_, Lecture>(
        r#"
        SELECT id, user_id, subject_id, title, description, duration_minutes, created_at, updated_at
        FROM lectures
        WHERE user_id = ?1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Fails with a foreign key violation when `subject_id` does not exist.
pub async fn insert_lecture(
    db: &SqlitePool,
    user_id: &str,
    req: NewLectureRequest,
) -> Result<Lecture, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO lectures
            (id, user_id, subject_id, title, description, duration_minutes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.subject_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.duration_minutes)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Lecture {
        id,
        user_id: user_id.to_string(),
        subject_id: req.subject_id,
        title: req.title,
        description: req.description,
        duration_minutes: req.duration_minutes,
        created_at: now.clone(),
        updated_at: now,
    })
}

#[derive(Debug, FromRow)]
struct ScheduledLectureJoinRow {
    id: String,
    user_id: String,
    lecture_id: String,
    scheduled_date: String,
    start_time: String,
    end_time: String,
    completed: bool,
    created_at: String,
    updated_at: String,
    lecture_title: Option<String>,
    lecture_subject_id: Option<String>,
    subject_name: Option<String>,
}

impl From<ScheduledLectureJoinRow> for ScheduledLectureWithLecture {
    fn from(row: ScheduledLectureJoinRow) -> Self {
        let lecture = match (row.lecture_title, row.lecture_subject_id) {
            (Some(title), Some(subject_id)) => Some(LectureSummary {
                title,
                subject_id,
                subject: row.subject_name.map(|name| SubjectName { name }),
            }),
            _ => None,
        };

        ScheduledLectureWithLecture {
            schedule: ScheduledLecture {
                id: row.id,
                user_id: row.user_id,
                lecture_id: row.lecture_id,
                scheduled_date: row.scheduled_date,
                start_time: row.start_time,
                end_time: row.end_time,
                completed: row.completed,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            lecture,
        }
    }
}

pub async fn fetch_scheduled_lectures(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ScheduledLectureWithLecture>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ScheduledLectureJoinRow>(
        r#"
        SELECT
            sl.id,
            sl.user_id,
            sl.lecture_id,
            sl.scheduled_date,
            sl.start_time,
            sl.end_time,
            sl.completed,
            sl.created_at,
            sl.updated_at,
            l.title AS lecture_title,
            l.subject_id AS lecture_subject_id,
            s.name AS subject_name
        FROM scheduled_lectures sl
        LEFT JOIN lectures l ON l.id = sl.lecture_id
        LEFT JOIN subjects s ON s.id = l.subject_id
        WHERE sl.user_id = ?1
        ORDER BY sl.scheduled_date ASC, sl.start_time ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn find_scheduled_lecture(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<ScheduledLecture>, sqlx::Error> {
    sqlx::query_as::<_, ScheduledLecture>(
        "SELECT id, user_id, lecture_id, scheduled_date, start_time, end_time, completed, created_at, updated_at FROM scheduled_lectures WHERE id = ?1 AND user_id = ?2"
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_scheduled_lecture(
    db: &SqlitePool,
    draft: &ScheduledLectureDraft,
) -> Result<ScheduledLecture, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO scheduled_lectures
            (id, user_id, lecture_id, scheduled_date, start_time, end_time,
            completed, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
    )
    .bind(&id)
    .bind(&draft.user_id)
    .bind(&draft.lecture_id)
    .bind(&draft.scheduled_date)
    .bind(&draft.start_time)
    .bind(&draft.end_time)
    .bind(draft.completed)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(ScheduledLecture {
        id,
        user_id: draft.user_id.clone(),
        lecture_id: draft.lecture_id.clone(),
        scheduled_date: draft.scheduled_date.clone(),
        start_time: draft.start_time.clone(),
        end_time: draft.end_time.clone(),
        completed: draft.completed,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Returns `None` when no row with this id belongs to the user.
pub async fn set_scheduled_lecture_completed(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    completed: bool,
) -> Result<Option<ScheduledLecture>, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let affected = sqlx::query(
        r#"
        UPDATE scheduled_lectures
        SET completed = ?1,
            updated_at = ?2
        WHERE id = ?3 AND user_id = ?4
        "#,
    )
    .bind(completed)
    .bind(&now)
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_scheduled_lecture(db, user_id, id).await
}

pub async fn delete_scheduled_lecture(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM scheduled_lectures WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Newest first.
pub async fn fetch_notifications(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, kind, title, message, created_at, read
        FROM notifications
        WHERE user_id = ?1
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn count_unread_notifications(db: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0")
        .bind(user_id)
        .fetch_one(db)
        .await
}

pub async fn insert_notification(
    db: &SqlitePool,
    user_id: &str,
    req: NewNotificationRequest,
) -> Result<Notification, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, kind, title, message, read, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.kind)
    .bind(&req.title)
    .bind(&req.message)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Notification {
        id,
        kind: req.kind,
        title: req.title,
        message: req.message,
        created_at: now,
        read: false,
    })
}

/// Returns false when no notification with this id belongs to the user.
/// Marking an already-read notification still matches.
pub async fn mark_notification_read(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn mark_all_notifications_read(db: &SqlitePool, user_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0")
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result)
}

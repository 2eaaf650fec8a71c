use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::http::HeaderMap;
use axum::routing::{delete, patch};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::notification_center::{NotificationItem, badge_label};
use crate::services::{LectureScheduler, NotificationCenter};
use crate::state::AppState;
use crate::store::SqliteNotificationStore;
use crate::toast::Toast;

/// Header carrying the caller's identity, set by the auth proxy in front of
/// this service.
pub const USER_HEADER: &str = "x-user-id";

const ANONYMOUS_SESSION: &str = "anonymous";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/scheduled-lectures",
            get(list_scheduled_lectures).post(create_scheduled_lecture),
        )
        .route("/scheduled-lectures/{id}", delete(delete_scheduled_lecture))
        .route("/scheduled-lectures/{id}/toggle", patch(toggle_scheduled_lecture))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/lectures", get(list_lectures).post(create_lecture))
        .route(
            "/notifications",
            get(list_notifications).post(create_notification),
        )
        .route("/notifications/read-all", patch(mark_all_notifications_read))
        .route("/notifications/{id}/read", patch(mark_notification_read))
        .route("/toasts", get(list_toasts))
        .route("/toasts/{id}", delete(dismiss_toast))
        .with_state(state)
}

fn current_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn require_user(headers: &HeaderMap) -> Result<String, AppError> {
    current_user(headers).ok_or(AppError::Unauthorized)
}

fn notification_center_for(state: &AppState, user_id: &str) -> NotificationCenter {
    NotificationCenter::new(Arc::new(SqliteNotificationStore::new(
        state.db.clone(),
        user_id,
    )))
}

fn scheduler_for(state: &AppState, user_id: Option<String>) -> LectureScheduler {
    let toaster = state
        .toasts
        .for_session(user_id.as_deref().unwrap_or(ANONYMOUS_SESSION));
    LectureScheduler::new(state.store.clone(), state.cache.clone(), toaster, user_id)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_scheduled_lectures(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Json<Vec<ScheduledLectureWithLecture>> {
    let scheduler = scheduler_for(&state, current_user(&headers));
    Json(scheduler.scheduled_lectures().await)
}

async fn create_scheduled_lecture(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<NewScheduledLecture>,
) -> Result<(StatusCode, Json<ScheduledLecture>), AppError> {
    let scheduler = scheduler_for(&state, current_user(&headers));
    let created = scheduler.schedule(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn toggle_scheduled_lecture(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduledLecture>, AppError> {
    let scheduler = scheduler_for(&state, current_user(&headers));
    let updated = scheduler.toggle_completion(&id).await?;
    Ok(Json(updated))
}

async fn delete_scheduled_lecture(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scheduler = scheduler_for(&state, current_user(&headers));
    scheduler.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_subjects(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let user_id = require_user(&headers)?;
    let subjects = repository::fetch_subjects(&state.db, &user_id).await?;
    Ok(Json(subjects))
}

async fn create_subject(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<NewSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let user_id = require_user(&headers)?;
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    let subject = repository::insert_subject(&state.db, &user_id, req).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn list_lectures(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<Lecture>>, AppError> {
    let user_id = require_user(&headers)?;
    let lectures = repository::fetch_lectures(&state.db, &user_id).await?;
    Ok(Json(lectures))
}

async fn create_lecture(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<NewLectureRequest>,
) -> Result<(StatusCode, Json<Lecture>), AppError> {
    let user_id = require_user(&headers)?;
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    let subject_id = req.subject_id.clone();
    let lecture = repository::insert_lecture(&state.db, &user_id, req)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::BadRequest(format!("unknown subject: {}", subject_id))
            }
            _ => AppError::Database(e),
        })?;
    Ok((StatusCode::CREATED, Json(lecture)))
}

#[derive(Serialize)]
struct NotificationsResponse {
    unread_count: usize,
    badge: Option<String>,
    items: Vec<NotificationItem>,
}

async fn list_notifications(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let user_id = require_user(&headers)?;
    let center = notification_center_for(&state, &user_id);
    let unread_count = center.unread_count().await?;
    Ok(Json(NotificationsResponse {
        unread_count,
        badge: badge_label(unread_count),
        items: center.items(Utc::now()).await?,
    }))
}

async fn create_notification(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<NewNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let user_id = require_user(&headers)?;
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    let notification = repository::insert_notification(&state.db, &user_id, req).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

async fn mark_notification_read(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&headers)?;
    notification_center_for(&state, &user_id).select(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_notifications_read(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&headers)?;
    notification_center_for(&state, &user_id)
        .mark_all_as_read()
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_toasts(headers: HeaderMap, State(state): State<AppState>) -> Json<Vec<Toast>> {
    let session = current_user(&headers).unwrap_or_else(|| ANONYMOUS_SESSION.to_string());
    Json(state.toasts.for_session(&session).active(Utc::now()))
}

async fn dismiss_toast(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session = current_user(&headers).unwrap_or_else(|| ANONYMOUS_SESSION.to_string());
    if state.toasts.for_session(&session).dismiss(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A to-do item, optionally filed under a subject.
///
/// `priority` is one of `low`, `medium`, `high`; `status` is one of
/// `todo`, `in_progress`, `done`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub subject_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

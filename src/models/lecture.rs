use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lecture {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLectureRequest {
    pub subject_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
}

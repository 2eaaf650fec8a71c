use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudySession {
    pub id: String,
    pub user_id: String,
    pub subject_id: Option<String>,
    pub started_at: String,
    /// `None` while the session is still running
    pub ended_at: Option<String>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    /// Task this reminder fires for, if any
    pub task_id: Option<String>,
    pub title: String,
    pub remind_at: String,
    pub is_sent: bool,
    pub created_at: String,
    pub updated_at: String,
}

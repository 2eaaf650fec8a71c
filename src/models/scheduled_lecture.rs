use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ScheduledLecture {
    pub id: String,
    pub user_id: String,
    pub lecture_id: String,
    pub scheduled_date: String,
    pub start_time: String,
    pub end_time: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Subject fields embedded under a lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectName {
    pub name: String,
}

/// Lecture fields embedded under a scheduled lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureSummary {
    pub title: String,
    pub subject_id: String,
    pub subject: Option<SubjectName>,
}

/// A scheduled lecture together with the lecture and subject it points at,
/// as returned by a single embedded select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledLectureWithLecture {
    #[serde(flatten)]
    pub schedule: ScheduledLecture,
    pub lecture: Option<LectureSummary>,
}

impl ScheduledLectureWithLecture {
    pub fn id(&self) -> &str {
        &self.schedule.id
    }
}

/// Everything the caller supplies when scheduling a lecture. The owner is
/// stamped by the scheduler, the id by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScheduledLecture {
    pub lecture_id: String,
    pub scheduled_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewScheduledLecture {
    pub fn validate(&self) -> Result<(), String> {
        if self.lecture_id.trim().is_empty() {
            return Err("lecture_id must not be empty".to_string());
        }
        NaiveDate::parse_from_str(&self.scheduled_date, DATE_FORMAT)
            .map_err(|_| format!("invalid date: {}", self.scheduled_date))?;
        let start = NaiveTime::parse_from_str(&self.start_time, TIME_FORMAT)
            .map_err(|_| format!("invalid start time: {}", self.start_time))?;
        let end = NaiveTime::parse_from_str(&self.end_time, TIME_FORMAT)
            .map_err(|_| format!("invalid end time: {}", self.end_time))?;
        if end <= start {
            return Err("end time must be after start time".to_string());
        }
        Ok(())
    }

    pub fn for_user(self, user_id: &str) -> ScheduledLectureDraft {
        ScheduledLectureDraft {
            user_id: user_id.to_string(),
            lecture_id: self.lecture_id,
            scheduled_date: self.scheduled_date,
            start_time: self.start_time,
            end_time: self.end_time,
            completed: self.completed,
        }
    }
}

/// Insert payload: a new schedule stamped with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledLectureDraft {
    pub user_id: String,
    pub lecture_id: String,
    pub scheduled_date: String,
    pub start_time: String,
    pub end_time: String,
    pub completed: bool,
}

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::{
    LectureSummary, ScheduledLecture, ScheduledLectureWithLecture, SubjectName, TIME_FORMAT,
};

/// Columns requested from `scheduled_lectures`, embedding the lecture and
/// its subject through their foreign keys.
pub const SCHEDULED_LECTURE_SELECT: &str = "*,lectures(title,subject_id,subjects(name))";

#[derive(Debug, Deserialize)]
pub struct ScheduledLectureRecord {
    pub id: String,
    pub user_id: String,
    pub lecture_id: String,
    pub scheduled_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub lectures: Option<EmbeddedLecture>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddedLecture {
    pub title: String,
    pub subject_id: String,
    #[serde(default)]
    pub subjects: Option<EmbeddedSubject>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddedSubject {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionPatch<'a> {
    pub completed: bool,
    pub updated_at: &'a str,
}

impl ScheduledLectureRecord {
    pub fn into_view(self) -> ScheduledLectureWithLecture {
        let lecture = self.lectures.map(|l| LectureSummary {
            title: l.title,
            subject_id: l.subject_id,
            subject: l.subjects.map(|s| SubjectName { name: s.name }),
        });
        ScheduledLectureWithLecture {
            schedule: ScheduledLecture {
                id: self.id,
                user_id: self.user_id,
                lecture_id: self.lecture_id,
                scheduled_date: self.scheduled_date,
                start_time: short_time(self.start_time),
                end_time: short_time(self.end_time),
                completed: self.completed,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            lecture,
        }
    }

    pub fn into_schedule(self) -> ScheduledLecture {
        self.into_view().schedule
    }
}

/// `time` columns come back as `HH:MM:SS`; everything else uses `HH:MM`.
fn short_time(raw: String) -> String {
    match NaiveTime::parse_from_str(&raw, "%H:%M:%S") {
        Ok(time) => time.format(TIME_FORMAT).to_string(),
        Err(_) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_embedded_lecture() {
        let body = r#"[{
            "id": "9b1f",
            "user_id": "u1",
            "lecture_id": "L1",
            "scheduled_date": "2024-06-01",
            "start_time": "10:00",
            "end_time": "11:00",
            "completed": false,
            "created_at": "2024-05-30T08:00:00+00:00",
            "updated_at": "2024-05-30T08:00:00+00:00",
            "lectures": {
                "title": "Graph Theory",
                "subject_id": "S1",
                "subjects": { "name": "Discrete Math" }
            }
        }]"#;

        let records: Vec<ScheduledLectureRecord> = serde_json::from_str(body).unwrap();
        let view = records.into_iter().next().unwrap().into_view();

        assert_eq!(view.schedule.id, "9b1f");
        let lecture = view.lecture.expect("lecture should be embedded");
        assert_eq!(lecture.title, "Graph Theory");
        assert_eq!(lecture.subject.unwrap().name, "Discrete Math");
    }

    #[test]
    fn test_record_without_embedding() {
        let body = r#"{
            "id": "9b1f",
            "user_id": "u1",
            "lecture_id": "L1",
            "scheduled_date": "2024-06-01",
            "start_time": "10:00",
            "end_time": "11:00"
        }"#;

        let record: ScheduledLectureRecord = serde_json::from_str(body).unwrap();
        let view = record.into_view();
        assert!(!view.schedule.completed);
        assert!(view.lecture.is_none());
    }

    #[test]
    fn test_time_columns_with_seconds_are_shortened() {
        let body = r#"{
            "id": "9b1f",
            "user_id": "u1",
            "lecture_id": "L1",
            "scheduled_date": "2024-06-01",
            "start_time": "09:30:00",
            "end_time": "11:00"
        }"#;

        let record: ScheduledLectureRecord = serde_json::from_str(body).unwrap();
        let schedule = record.into_schedule();
        assert_eq!(schedule.start_time, "09:30");
        assert_eq!(schedule.end_time, "11:00");
    }
}

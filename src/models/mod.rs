pub mod lecture;
pub mod note;
pub mod notification;
pub mod reminder;
pub mod scheduled_lecture;
pub mod study_session;
pub mod subject;
pub mod task;

pub use lecture::{Lecture, NewLectureRequest};
pub use note::Note;
pub use notification::{NewNotificationRequest, Notification, NotificationIcon};
pub use reminder::Reminder;
pub use scheduled_lecture::{
    LectureSummary, NewScheduledLecture, ScheduledLecture, ScheduledLectureDraft,
    ScheduledLectureWithLecture, SubjectName, TIME_FORMAT,
};
pub use study_session::StudySession;
pub use subject::{NewSubjectRequest, Subject};
pub use task::Task;

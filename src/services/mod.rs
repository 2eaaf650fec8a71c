pub mod notification_center;
pub mod popup;
pub mod schedule;
pub mod session_sweeper;
pub mod spinner;

pub use notification_center::{NotificationCenter, NotificationStore};
pub use popup::{InMemorySessionFlags, MotivationalPopup, PopupConfig, SessionFlags};
pub use schedule::{LectureScheduler, ScheduleCache, ScheduleError};
pub use session_sweeper::{SessionSweeper, SweepReport};
pub use spinner::{LoadingSpinner, SpinnerSize};

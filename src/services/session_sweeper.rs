use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::services::ScheduleCache;
use crate::state::SessionRegistry;
use crate::toast::ToastQueue;

/// What one sweep removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub toasts: usize,
    pub sessions: usize,
    pub cached_queries: usize,
}

/// Periodically drops expired toasts, idle toast sessions and cached
/// schedule lists nobody has refreshed within `cache_max_age`.
pub struct SessionSweeper {
    toasts: Arc<SessionRegistry<ToastQueue>>,
    cache: Arc<ScheduleCache>,
    interval: Duration,
    cache_max_age: chrono::Duration,
}

impl SessionSweeper {
    pub fn new(
        toasts: Arc<SessionRegistry<ToastQueue>>,
        cache: Arc<ScheduleCache>,
        interval_secs: u64,
        cache_max_age_secs: u64,
    ) -> Self {
        Self {
            toasts,
            cache,
            interval: Duration::from_secs(interval_secs.max(1)),
            cache_max_age: chrono::Duration::seconds(cache_max_age_secs as i64),
        }
    }

    pub async fn start(self) {
        info!(
            "Starting session sweeper (interval: {:?}, cache max age: {}s)",
            self.interval,
            self.cache_max_age.num_seconds()
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let report = self.sweep().await;
            if report != SweepReport::default() {
                debug!(
                    "Swept {} toasts, {} idle sessions, {} cached queries",
                    report.toasts, report.sessions, report.cached_queries
                );
            }
        }
    }

    pub async fn sweep(&self) -> SweepReport {
        let now = Utc::now();
        let toasts = self
            .toasts
            .all()
            .iter()
            .map(|queue| queue.evict_expired(now))
            .sum();
        let sessions = self.toasts.retain(|queue| !queue.is_empty());
        let cached_queries = self.cache.evict_idle(self.cache_max_age, now).await;

        SweepReport {
            toasts,
            sessions,
            cached_queries,
        }
    }
}

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

pub const POPUP_SESSION_KEY: &str = "motivational_popup_shown";
pub const AUTO_DISMISS_AFTER: Duration = Duration::from_millis(6000);

const QUOTES: &[&str] = &[
    "Small steps every day add up to big results.",
    "You don't have to be great to start, but you have to start to be great.",
    "Focus on progress, not perfection.",
    "The expert in anything was once a beginner.",
    "Study now, thank yourself later.",
];

/// Flags that live for one browser session.
pub trait SessionFlags: Send + Sync {
    fn is_set(&self, key: &str) -> bool;
    fn set(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct InMemorySessionFlags {
    flags: Mutex<HashSet<String>>,
}

impl SessionFlags for InMemorySessionFlags {
    fn is_set(&self, key: &str) -> bool {
        self.flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(key)
    }

    fn set(&self, key: &str) {
        self.flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct PopupConfig {
    pub session_key: String,
    pub dismiss_after: Duration,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            session_key: POPUP_SESSION_KEY.to_string(),
            dismiss_after: AUTO_DISMISS_AFTER,
        }
    }
}

/// Overlay with a motivational quote, shown at most once per session.
///
/// Must be mounted inside a tokio runtime; the auto-dismiss timer is a
/// spawned task that is aborted on dismiss and on drop.
pub struct MotivationalPopup {
    flags: Arc<dyn SessionFlags>,
    config: PopupConfig,
    visible: Arc<AtomicBool>,
    quote: Option<&'static str>,
    timer: Option<JoinHandle<()>>,
}

impl MotivationalPopup {
    pub fn new(flags: Arc<dyn SessionFlags>, config: PopupConfig) -> Self {
        Self {
            flags,
            config,
            visible: Arc::new(AtomicBool::new(false)),
            quote: None,
            timer: None,
        }
    }

    /// Shows the popup unless it was already shown this session.
    /// Returns whether it is now visible.
    pub fn mount(&mut self) -> bool {
        if self.flags.is_set(&self.config.session_key) {
            debug!("motivational popup already shown this session");
            return false;
        }
        self.flags.set(&self.config.session_key);

        let pick = chrono::Utc::now().timestamp_subsec_nanos() as usize % QUOTES.len();
        self.quote = Some(QUOTES[pick]);
        self.visible.store(true, Ordering::SeqCst);

        let visible = self.visible.clone();
        let delay = self.config.dismiss_after;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            visible.store(false, Ordering::SeqCst);
        }));
        true
    }

    pub fn dismiss(&mut self) {
        self.visible.store(false, Ordering::SeqCst);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// The quote to render, or `None` when nothing should be drawn.
    pub fn quote(&self) -> Option<&'static str> {
        if self.is_visible() { self.quote } else { None }
    }
}

impl Drop for MotivationalPopup {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

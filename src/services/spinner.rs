use serde::{Deserialize, Serialize};

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinnerSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl SpinnerSize {
    pub fn diameter_px(self) -> u32 {
        match self {
            SpinnerSize::Small => 16,
            SpinnerSize::Medium => 32,
            SpinnerSize::Large => 48,
        }
    }
}

/// Loading indicator shown while a query is in flight.
#[derive(Debug, Clone, Default)]
pub struct LoadingSpinner {
    pub size: SpinnerSize,
    pub label: Option<String>,
}

impl LoadingSpinner {
    pub fn new(size: SpinnerSize) -> Self {
        Self { size, label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn frame(&self, tick: usize) -> char {
        FRAMES[tick % FRAMES.len()]
    }

    pub fn render(&self, tick: usize) -> String {
        match &self.label {
            Some(label) => format!("{} {}", self.frame(tick), label),
            None => self.frame(tick).to_string(),
        }
    }
}

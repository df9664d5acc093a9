use quiz_core::model::SessionState;
use serde::Serialize;

/// How close the countdown is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUrgency {
    Plenty,
    Medium,
    Low,
    Critical,
}

impl TimeUrgency {
    #[must_use]
    pub fn classify(seconds_left: u32) -> Self {
        match seconds_left {
            0..=5 => Self::Critical,
            6..=10 => Self::Low,
            11..=20 => Self::Medium,
            _ => Self::Plenty,
        }
    }
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    /// 1-based position of the displayed question; 0 when nothing is loaded.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub score: u32,
    pub time_remaining: u32,
    pub urgency: TimeUrgency,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        let total = state.total_questions();
        let answered = state.answers().len();
        Self {
            position: if total == 0 { 0 } else { state.current_index() + 1 },
            total,
            answered,
            remaining: total.saturating_sub(answered),
            score: state.score(),
            time_remaining: state.time_remaining(),
            urgency: TimeUrgency::classify(state.time_remaining()),
            is_complete: state.is_completed(),
        }
    }
}

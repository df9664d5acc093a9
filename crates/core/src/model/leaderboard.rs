use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DifficultyFilter, SessionState};
use crate::scoring;

/// Number of results a leaderboard keeps.
pub const LEADERBOARD_CAPACITY: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error("score {score} exceeds total {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("percentage {0} is outside 0..=100")]
    PercentageOutOfRange(u8),
}

/// Outcome of one completed session, as stored on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    score: u32,
    total: u32,
    percentage: u8,
    difficulty: DifficultyFilter,
    timestamp: DateTime<Utc>,
}

impl ResultRecord {
    /// Summarise a session at the moment it completed.
    #[must_use]
    pub fn from_session(state: &SessionState, completed_at: DateTime<Utc>) -> Self {
        let score = state.score();
        let total = u32::try_from(state.total_questions()).unwrap_or(u32::MAX);
        Self {
            score,
            total,
            percentage: scoring::percentage(score, total),
            difficulty: state.difficulty_filter(),
            timestamp: completed_at,
        }
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` if the numbers cannot describe a real result.
    pub fn from_persisted(
        score: u32,
        total: u32,
        percentage: u8,
        difficulty: DifficultyFilter,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, LeaderboardError> {
        if score > total {
            return Err(LeaderboardError::ScoreExceedsTotal { score, total });
        }
        if percentage > 100 {
            return Err(LeaderboardError::PercentageOutOfRange(percentage));
        }
        Ok(Self {
            score,
            total,
            percentage,
            difficulty,
            timestamp,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyFilter {
        self.difficulty
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Bounded, percentage-ordered list of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<ResultRecord>,
}

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a list loaded from storage, in the order it was stored.
    #[must_use]
    pub fn from_entries(entries: Vec<ResultRecord>) -> Self {
        Self { entries }
    }

    /// Append `result`, stable-sort descending by percentage and keep the top entries.
    ///
    /// Equal percentages keep their prior relative order, so an older result
    /// outranks a newer one with the same percentage.
    #[must_use]
    pub fn record(mut self, result: ResultRecord) -> Self {
        self.entries.push(result);
        self.entries
            .sort_by(|a, b| b.percentage.cmp(&a.percentage));
        self.entries.truncate(LEADERBOARD_CAPACITY);
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[ResultRecord] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ResultRecord> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use std::sync::Arc;

use quiz_core::model::{Leaderboard, ResultRecord, SessionState};
use storage::repository::{InMemoryRepository, LeaderboardRepository};

use crate::Clock;
use crate::error::QuizServiceError;

/// Persists completed sessions onto the bounded leaderboard.
///
/// This service owns the time source used to stamp results and the
/// leaderboard repository. Ordering and truncation stay in
/// [`Leaderboard::record`].
#[derive(Clone)]
pub struct ResultsRecorder {
    clock: Clock,
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl ResultsRecorder {
    #[must_use]
    pub fn new(clock: Clock, leaderboard: Arc<dyn LeaderboardRepository>) -> Self {
        Self { clock, leaderboard }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    /// Record the result of a completed session.
    ///
    /// Returns the stored record, which may already have been pushed off the
    /// leaderboard if ten better results exist.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the leaderboard cannot be loaded
    /// or saved.
    pub async fn record(&self, state: &SessionState) -> Result<ResultRecord, QuizServiceError> {
        let result = ResultRecord::from_session(state, self.clock.now());
        let board = self.leaderboard.load_leaderboard().await?;
        let board = board.record(result.clone());
        self.leaderboard.save_leaderboard(&board).await?;

        tracing::info!(
            score = result.score(),
            total = result.total(),
            percentage = result.percentage(),
            difficulty = %result.difficulty(),
            "result recorded"
        );
        Ok(result)
    }

    /// The stored leaderboard, best first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn top(&self) -> Result<Leaderboard, QuizServiceError> {
        Ok(self.leaderboard.load_leaderboard().await?)
    }
}

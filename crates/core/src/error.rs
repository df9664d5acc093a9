use thiserror::Error;

use crate::model::{LeaderboardError, ParseDifficultyError, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error(transparent)]
    Difficulty(#[from] ParseDifficultyError),
}

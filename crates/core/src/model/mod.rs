mod answer;
mod ids;
mod leaderboard;
mod question;
pub mod session;

pub use ids::{ParseIdError, QuestionId, SessionId};

pub use answer::AnswerRecord;
pub use leaderboard::{LEADERBOARD_CAPACITY, Leaderboard, LeaderboardError, ResultRecord};
pub use question::{
    Difficulty, DifficultyFilter, MIN_OPTIONS, ParseDifficultyError, Question, QuestionDraft,
    QuestionError,
};
pub use session::{InvariantViolation, QUESTION_TIME_LIMIT_SECS, SessionState};

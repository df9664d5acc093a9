use std::collections::HashSet;

use thiserror::Error;

use crate::model::{AnswerRecord, DifficultyFilter, Question, QuestionId};

/// Seconds each question may stay on screen before it times out.
pub const QUESTION_TIME_LIMIT_SECS: u32 = 30;

/// A broken `SessionState` invariant. Only produced by [`SessionState::check_invariants`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantViolation {
    #[error("current index {index} out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{answers} answers recorded but only {visited} questions visited")]
    TooManyAnswers { answers: usize, visited: usize },

    #[error("question {0} answered more than once")]
    DuplicateAnswer(QuestionId),

    #[error("answer recorded for question {0} which is not in this session")]
    ForeignAnswer(QuestionId),

    #[error("answer recorded for question {0} which was never visited")]
    UnvisitedAnswer(QuestionId),

    #[error("score {score} does not match {correct} correct answers")]
    ScoreMismatch { score: u32, correct: u32 },

    #[error("time remaining {0}s exceeds the question limit")]
    TimeOutOfRange(u32),
}

/// Single source of truth for an in-progress or completed quiz.
///
/// Fields are only writable from [`crate::reducer`]; everything else reads it
/// through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) questions: Vec<Question>,
    pub(crate) current_index: usize,
    pub(crate) furthest_index: usize,
    pub(crate) answers: Vec<AnswerRecord>,
    pub(crate) score: u32,
    pub(crate) completed: bool,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) time_remaining: u32,
    pub(crate) difficulty_filter: DifficultyFilter,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            furthest_index: 0,
            answers: Vec::new(),
            score: 0,
            completed: false,
            loading: false,
            error: None,
            time_remaining: QUESTION_TIME_LIMIT_SECS,
            difficulty_filter: DifficultyFilter::All,
        }
    }
}

impl SessionState {
    /// Empty session waiting for questions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Highest question index visited since the last load or restart.
    #[must_use]
    pub fn furthest_index(&self) -> usize {
        self.furthest_index
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn difficulty_filter(&self) -> DifficultyFilter {
        self.difficulty_filter
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index + 1 == self.questions.len()
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&AnswerRecord> {
        self.answers.iter().find(|a| a.question_id() == question_id)
    }

    /// Record for the question currently displayed, if it was answered.
    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        self.current_question()
            .and_then(|q| self.answer_for(q.id()))
    }

    /// Derived purely from `answers`; there is no separate flag to drift.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.current_answer().is_some()
    }

    /// Load finished but the filtered bank is empty.
    ///
    /// Distinct from a load failure, which is reported through [`Self::error`].
    #[must_use]
    pub fn no_questions_available(&self) -> bool {
        self.questions.is_empty() && !self.loading
    }

    /// True when a session can be entered: loaded, error-free, non-empty, not finished.
    #[must_use]
    pub fn can_start(&self) -> bool {
        !self.loading && self.error.is_none() && !self.questions.is_empty() && !self.completed
    }

    /// Count of correct records, recomputed from `answers`.
    #[must_use]
    pub fn correct_count(&self) -> u32 {
        let n = self.answers.iter().filter(|a| a.is_correct()).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    /// Verify every structural invariant of the session.
    ///
    /// # Errors
    ///
    /// Returns the first `InvariantViolation` found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let len = self.questions.len();
        if self.current_index >= len.max(1) {
            return Err(InvariantViolation::IndexOutOfRange {
                index: self.current_index,
                len,
            });
        }

        let visited = self.furthest_index + 1;
        if self.answers.len() > visited {
            return Err(InvariantViolation::TooManyAnswers {
                answers: self.answers.len(),
                visited,
            });
        }

        let mut seen = HashSet::with_capacity(self.answers.len());
        for record in &self.answers {
            let id = record.question_id();
            if !seen.insert(id) {
                return Err(InvariantViolation::DuplicateAnswer(id));
            }
            let Some(position) = self.questions.iter().position(|q| q.id() == id) else {
                return Err(InvariantViolation::ForeignAnswer(id));
            };
            if position > self.furthest_index {
                return Err(InvariantViolation::UnvisitedAnswer(id));
            }
        }

        let correct = self.correct_count();
        if self.score != correct {
            return Err(InvariantViolation::ScoreMismatch {
                score: self.score,
                correct,
            });
        }

        if self.time_remaining > QUESTION_TIME_LIMIT_SECS {
            return Err(InvariantViolation::TimeOutOfRange(self.time_remaining));
        }

        Ok(())
    }
}

use async_trait::async_trait;
use quiz_core::model::{DifficultyFilter, Leaderboard, Question};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("i/o error: {0}")]
    Io(String),
}

/// Ordered source of questions for a session.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question, or replace the one with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Load the questions passing `filter`, in bank order.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read.
    async fn load_questions(&self, filter: DifficultyFilter)
    -> Result<Vec<Question>, StorageError>;

    /// Number of questions passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read.
    async fn count_questions(&self, filter: DifficultyFilter) -> Result<usize, StorageError> {
        Ok(self.load_questions(filter).await?.len())
    }
}

/// Persistence for the bounded leaderboard.
///
/// Repositories store and return the list verbatim; ordering and truncation
/// belong to [`Leaderboard::record`].
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Load the stored leaderboard, empty if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if stored entries cannot be read.
    async fn load_leaderboard(&self) -> Result<Leaderboard, StorageError>;

    /// Replace the stored leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be written.
    async fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    leaderboard: Arc<Mutex<Leaderboard>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with `questions`, in order.
    #[must_use]
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            leaderboard: Arc::default(),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|q| q.id() == question.id()) {
            Some(existing) => *existing = question.clone(),
            None => guard.push(question.clone()),
        }
        Ok(())
    }

    async fn load_questions(
        &self,
        filter: DifficultyFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(filter.apply(&guard))
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn load_leaderboard(&self) -> Result<Leaderboard, StorageError> {
        let guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError> {
        let mut guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = board.clone();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo);
        Self {
            questions,
            leaderboard,
        }
    }
}

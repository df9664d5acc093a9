//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while reading [`crate::config::QuizSettings`] from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a positive number of milliseconds, got {raw:?}")]
    InvalidDuration { var: &'static str, raw: String },
    #[error("{var} must be true or false, got {raw:?}")]
    InvalidFlag { var: &'static str, raw: String },
    #[error("QUIZ_SELECTION_MODE must be immediate or deferred, got {0:?}")]
    InvalidSelectionMode(String),
}

/// Errors emitted by the quiz session driver and its collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("no questions available for {0}")]
    NoQuestions(quiz_core::model::DifficultyFilter),
    #[error("session task has stopped")]
    Closed,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

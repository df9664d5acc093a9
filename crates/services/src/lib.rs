#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod results;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::QuizServices;
pub use config::{QuizSettings, SelectionMode};
pub use error::{AppServicesError, ConfigError, QuizServiceError};
pub use results::ResultsRecorder;

pub use sessions::{
    QuestionReview, QuizSession, QuizSessionHandle, ResultSummary, ReviewOutcome, SessionEntry,
    SessionProgress, SessionSnapshot, TimeUrgency, UiEvent,
};

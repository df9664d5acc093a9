use std::sync::Arc;

use quiz_core::model::{Difficulty, DifficultyFilter};
use storage::repository::{InMemoryRepository, QuestionRepository, Storage};

use crate::Clock;
use crate::config::QuizSettings;
use crate::error::{AppServicesError, QuizServiceError};
use crate::results::ResultsRecorder;
use crate::sessions::QuizSession;

/// Assembles the question bank, the results recorder and the session settings.
#[derive(Clone)]
pub struct QuizServices {
    questions: Arc<dyn QuestionRepository>,
    recorder: Arc<ResultsRecorder>,
    settings: QuizSettings,
}

impl QuizServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        Self {
            questions: Arc::clone(&storage.questions),
            recorder: Arc::new(ResultsRecorder::new(clock, Arc::clone(&storage.leaderboard))),
            settings,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, settings))
    }

    #[must_use]
    pub fn in_memory(repo: InMemoryRepository, clock: Clock, settings: QuizSettings) -> Self {
        Self::new(&Storage::from_in_memory(repo), clock, settings)
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn recorder(&self) -> Arc<ResultsRecorder> {
        Arc::clone(&self.recorder)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<dyn QuestionRepository> {
        Arc::clone(&self.questions)
    }

    /// A fresh, unloaded session for `filter`.
    #[must_use]
    pub fn session(&self, filter: DifficultyFilter) -> QuizSession {
        QuizSession::new(
            Arc::clone(&self.questions),
            ResultsRecorder::clone(&self.recorder),
            self.settings.clone(),
        )
        .with_difficulty(filter)
    }

    /// Number of questions behind every filter, `All` first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn question_counts(&self) -> Result<Vec<(DifficultyFilter, usize)>, QuizServiceError> {
        let filters = std::iter::once(DifficultyFilter::All)
            .chain(Difficulty::ALL.into_iter().map(DifficultyFilter::from));
        let mut counts = Vec::new();
        for filter in filters {
            counts.push((filter, self.questions.count_questions(filter).await?));
        }
        Ok(counts)
    }
}

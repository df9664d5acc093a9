#![allow(dead_code)]

use async_trait::async_trait;
use quiz_core::model::{Difficulty, DifficultyFilter, Question, QuestionId};
use quiz_core::time::fixed_clock;
use services::{QuizServices, QuizSettings};
use storage::repository::{InMemoryRepository, QuestionRepository, StorageError};

/// Four options, correct answer at `correct`.
pub fn question(id: u64, difficulty: Difficulty, correct: usize) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}?"),
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct,
        difficulty,
    )
    .unwrap()
}

/// Four medium questions whose correct option is always the first.
pub fn medium_bank() -> InMemoryRepository {
    InMemoryRepository::with_questions((1..=4).map(|id| question(id, Difficulty::Medium, 0)).collect())
}

/// Two easy questions followed by one medium question.
pub fn mixed_bank() -> InMemoryRepository {
    InMemoryRepository::with_questions(vec![
        question(1, Difficulty::Easy, 0),
        question(2, Difficulty::Easy, 1),
        question(3, Difficulty::Medium, 2),
    ])
}

pub fn quiz_services(repo: InMemoryRepository, settings: QuizSettings) -> QuizServices {
    QuizServices::in_memory(repo, fixed_clock(), settings)
}

pub fn ids(questions: &[Question]) -> Vec<u64> {
    questions.iter().map(|q| q.id().value()).collect()
}

/// Bank whose every read fails.
pub struct UnreachableBank;

#[async_trait]
impl QuestionRepository for UnreachableBank {
    async fn upsert_question(&self, _question: &Question) -> Result<(), StorageError> {
        Err(StorageError::Connection("bank offline".into()))
    }

    async fn load_questions(
        &self,
        _filter: DifficultyFilter,
    ) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Connection("bank offline".into()))
    }
}

//! Question bank files.
//!
//! A bank is a JSON document of the form `{"questions": [...]}` where each
//! entry uses the `id`, `question`, `options`, `correctAnswer` and
//! `difficulty` keys.

use std::path::Path;

use quiz_core::model::{Question, QuestionId};
use serde::Deserialize;
use std::collections::HashSet;

use crate::repository::{InMemoryRepository, StorageError};

/// Bundled sample bank, used when no other source is configured.
pub const SAMPLE_BANK_JSON: &str = include_str!("../data/questions.json");

#[derive(Debug, Deserialize)]
struct QuestionBankFile {
    questions: Vec<Question>,
}

/// Parse and validate a bank document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document is malformed, a
/// question fails validation, or two questions share an id.
pub fn parse_question_bank(raw: &str) -> Result<Vec<Question>, StorageError> {
    let file: QuestionBankFile =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let mut seen: HashSet<QuestionId> = HashSet::with_capacity(file.questions.len());
    for q in &file.questions {
        if !seen.insert(q.id()) {
            return Err(StorageError::Serialization(format!(
                "duplicate question id {}",
                q.id()
            )));
        }
    }

    Ok(file.questions)
}

/// Read and parse a bank file from disk.
///
/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read, or the errors of
/// [`parse_question_bank`].
pub fn read_question_bank(path: &Path) -> Result<Vec<Question>, StorageError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("{}: {e}", path.display())))?;
    parse_question_bank(&raw)
}

/// The bundled sample bank.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the bundled file is invalid.
pub fn sample_questions() -> Result<Vec<Question>, StorageError> {
    parse_question_bank(SAMPLE_BANK_JSON)
}

impl InMemoryRepository {
    /// In-memory repository holding the questions of a bank document.
    ///
    /// # Errors
    ///
    /// See [`parse_question_bank`].
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        Ok(Self::with_questions(parse_question_bank(raw)?))
    }
}

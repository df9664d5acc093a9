use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Outcome of answering one question.
///
/// `is_correct` and `correct_index` are captured when the record is created and
/// never recomputed, so a record stays meaningful even if the question it was
/// taken against is no longer current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    question_id: QuestionId,
    selected_index: Option<usize>,
    correct_index: usize,
    is_correct: bool,
}

impl AnswerRecord {
    /// Grade `selected` against `question`.
    ///
    /// A `None` selection is recorded as incorrect.
    #[must_use]
    pub fn evaluate(question: &Question, selected: Option<usize>) -> Self {
        let correct_index = question.correct_answer_index();
        Self {
            question_id: question.id(),
            selected_index: selected,
            correct_index,
            is_correct: selected == Some(correct_index),
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    #[test]
    fn grades_against_captured_correct_index() {
        let q = Question::new(
            QuestionId::new(3),
            "Capital of France?",
            vec!["Berlin".into(), "Paris".into(), "Rome".into()],
            1,
            Difficulty::Easy,
        )
        .unwrap();

        let right = AnswerRecord::evaluate(&q, Some(1));
        assert!(right.is_correct());
        assert_eq!(right.correct_index(), 1);

        let wrong = AnswerRecord::evaluate(&q, Some(2));
        assert!(!wrong.is_correct());
        assert_eq!(wrong.selected_index(), Some(2));

        assert!(!AnswerRecord::evaluate(&q, None).is_correct());
    }
}

use quiz_core::model::{DifficultyFilter, QuestionId, SessionState};
use quiz_core::scoring::{ScoreBand, ScoreReport, ScoreTier};
use serde::Serialize;

/// What happened to one question, for the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    Correct { selected: usize },
    Incorrect { selected: usize },
    /// Timed out or skipped without a choice.
    Unanswered,
}

/// Presentation-agnostic breakdown of a single question.
///
/// No pre-formatted strings: presenters decide how to render the choice and
/// the correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub outcome: ReviewOutcome,
}

/// Everything the results screen shows for a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub score: u32,
    pub total: u32,
    pub percentage: u8,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    #[serde(skip)]
    pub tier: ScoreTier,
    #[serde(skip)]
    pub band: ScoreBand,
    pub feedback: &'static str,
    pub difficulty: DifficultyFilter,
    pub questions: Vec<QuestionReview>,
}

impl ResultSummary {
    /// Build the summary for `state`, or `None` while the session is running.
    #[must_use]
    pub fn from_state(state: &SessionState) -> Option<Self> {
        if !state.is_completed() {
            return None;
        }

        let questions: Vec<QuestionReview> = state
            .questions()
            .iter()
            .map(|question| {
                let outcome = match state
                    .answer_for(question.id())
                    .and_then(|record| record.selected_index().map(|i| (i, record.is_correct())))
                {
                    Some((selected, true)) => ReviewOutcome::Correct { selected },
                    Some((selected, false)) => ReviewOutcome::Incorrect { selected },
                    None => ReviewOutcome::Unanswered,
                };
                QuestionReview {
                    question_id: question.id(),
                    text: question.text().to_string(),
                    options: question.options().to_vec(),
                    correct_index: question.correct_answer_index(),
                    outcome,
                }
            })
            .collect();

        let count = |pred: fn(&ReviewOutcome) -> bool| {
            let n = questions.iter().filter(|q| pred(&q.outcome)).count();
            u32::try_from(n).unwrap_or(u32::MAX)
        };
        let correct = count(|o| matches!(o, ReviewOutcome::Correct { .. }));
        let incorrect = count(|o| matches!(o, ReviewOutcome::Incorrect { .. }));
        let unanswered = count(|o| matches!(o, ReviewOutcome::Unanswered));

        let total = u32::try_from(state.total_questions()).unwrap_or(u32::MAX);
        let report = ScoreReport::new(state.score(), total);

        Some(Self {
            score: report.score,
            total: report.total,
            percentage: report.percentage,
            correct,
            incorrect,
            unanswered,
            tier: report.tier,
            band: report.band,
            feedback: report.tier.label(),
            difficulty: state.difficulty_filter(),
            questions,
        })
    }
}

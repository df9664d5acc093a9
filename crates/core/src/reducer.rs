//! Session transition function.
//!
//! ```text
//! action ──→ reduce(state, action) ──→ state'
//! ```
//!
//! `reduce` is the only place a [`SessionState`] changes. It is pure: no I/O,
//! no clocks, no timers. Transitions whose preconditions do not hold are
//! ignored and return the state unchanged.

use serde::{Deserialize, Serialize};

use crate::model::session::QUESTION_TIME_LIMIT_SECS;
use crate::model::{AnswerRecord, DifficultyFilter, Question, SessionState};

/// Everything that can happen to a session.
///
/// Serialised as `{"type": "SUBMIT_ANSWER", "payload": 2}`. Any unrecognised
/// `type` deserialises to [`SessionAction::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionAction {
    LoadQuestions(Vec<Question>),
    SetLoading(bool),
    SetError(String),
    SubmitAnswer(usize),
    Advance,
    Retreat,
    Complete,
    Restart,
    TickTimer(u32),
    SetDifficulty(DifficultyFilter),
    #[serde(other)]
    Unknown,
}

/// Apply one action to a session.
#[must_use]
pub fn reduce(mut state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::LoadQuestions(questions) => {
            state.questions = questions;
            state.loading = false;
            state.error = None;
            state.current_index = 0;
            state.furthest_index = 0;
            state.answers.clear();
            state.score = 0;
            state
        }
        SessionAction::SetLoading(loading) => {
            state.loading = loading;
            state
        }
        SessionAction::SetError(message) => {
            state.error = Some(message);
            state.loading = false;
            state
        }
        SessionAction::SubmitAnswer(selected) => submit_answer(state, selected),
        SessionAction::Advance => advance(state),
        SessionAction::Retreat => {
            state.current_index = state.current_index.saturating_sub(1);
            state.time_remaining = QUESTION_TIME_LIMIT_SECS;
            state
        }
        SessionAction::Complete => {
            state.completed = true;
            state
        }
        SessionAction::Restart => SessionState {
            questions: std::mem::take(&mut state.questions),
            difficulty_filter: state.difficulty_filter,
            ..SessionState::default()
        },
        SessionAction::TickTimer(remaining) => {
            state.time_remaining = remaining.min(QUESTION_TIME_LIMIT_SECS);
            state
        }
        SessionAction::SetDifficulty(filter) => {
            state.difficulty_filter = filter;
            state
        }
        SessionAction::Unknown => state,
    }
}

fn submit_answer(mut state: SessionState, selected: usize) -> SessionState {
    if state.completed || state.is_current_answered() {
        return state;
    }
    // Grade against the question current at this moment, before any index change.
    let Some(question) = state.current_question() else {
        return state;
    };
    if !question.is_valid_option(selected) {
        return state;
    }

    let record = AnswerRecord::evaluate(question, Some(selected));
    if record.is_correct() {
        state.score = state.score.saturating_add(1);
    }
    state.answers.push(record);
    state
}

fn advance(mut state: SessionState) -> SessionState {
    if state.completed || state.questions.is_empty() {
        return state;
    }

    if state.is_last_question() {
        state.completed = true;
    } else {
        state.current_index += 1;
        state.furthest_index = state.furthest_index.max(state.current_index);
    }
    state.time_remaining = QUESTION_TIME_LIMIT_SECS;
    state
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

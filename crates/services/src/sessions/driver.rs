//! Single owner of a running quiz.
//!
//! `QuizSession` holds the [`SessionState`] and is the only thing that feeds
//! it to [`reduce`]. UI events and timer signals are handled one at a time,
//! so a timer task can never race a user action: whichever reaches the
//! driver first is applied, and leaving a question cancels its timer before
//! the next action is reduced.

use std::sync::Arc;

use quiz_core::model::{DifficultyFilter, ResultRecord, SessionId, SessionState};
use quiz_core::{SessionAction, reduce};
use rand::rng;
use rand::seq::SliceRandom;
use storage::repository::QuestionRepository;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::progress::SessionProgress;
use super::timer::{TimerController, TimerPhase, TimerSignal};
use super::view::ResultSummary;
use crate::config::{QuizSettings, SelectionMode};
use crate::error::QuizServiceError;
use crate::results::ResultsRecorder;

/// Commands a presenter can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Start,
    SelectOption(usize),
    Submit,
    GoNext,
    GoPrevious,
    Finish,
    SetDifficulty(DifficultyFilter),
    Restart,
}

/// Outcome of loading the bank for the current filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEntry {
    Ready { total: usize },
    NoQuestions,
    LoadFailed(String),
}

/// Everything a presenter needs to render the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub progress: SessionProgress,
    pub pending_selection: Option<usize>,
    pub timer: TimerPhase,
    pub started: bool,
    pub summary: Option<ResultSummary>,
}

pub struct QuizSession {
    id: SessionId,
    state: SessionState,
    timer: TimerController,
    signals: mpsc::UnboundedReceiver<TimerSignal>,
    pending_selection: Option<usize>,
    started: bool,
    last_result: Option<ResultRecord>,
    questions: Arc<dyn QuestionRepository>,
    recorder: ResultsRecorder,
    settings: QuizSettings,
}

impl QuizSession {
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        recorder: ResultsRecorder,
        settings: QuizSettings,
    ) -> Self {
        let id = SessionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = TimerController::new(id, &settings, tx);
        Self {
            id,
            state: SessionState::new(),
            timer,
            signals: rx,
            pending_selection: None,
            started: false,
            last_result: None,
            questions,
            recorder,
            settings,
        }
    }

    /// Choose the filter used by the first [`QuizSession::load`].
    #[must_use]
    pub fn with_difficulty(mut self, filter: DifficultyFilter) -> Self {
        self.dispatch(SessionAction::SetDifficulty(filter));
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn timer_phase(&self) -> TimerPhase {
        self.timer.phase()
    }

    #[must_use]
    pub fn pending_selection(&self) -> Option<usize> {
        self.pending_selection
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Result stored when the session last completed.
    #[must_use]
    pub fn last_result(&self) -> Option<&ResultRecord> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::from_state(&self.state)
    }

    #[must_use]
    pub fn summary(&self) -> Option<ResultSummary> {
        ResultSummary::from_state(&self.state)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            progress: self.progress(),
            pending_selection: self.pending_selection,
            timer: self.timer.phase(),
            started: self.started,
            summary: self.summary(),
        }
    }

    /// Reset progress and load the bank for the current filter. Storage
    /// failures end up in [`SessionState::error`] rather than in the return type.
    pub async fn load(&mut self) -> SessionEntry {
        self.leave_question();
        self.started = false;
        self.last_result = None;
        self.dispatch(SessionAction::Restart);
        self.dispatch(SessionAction::SetLoading(true));

        let filter = self.state.difficulty_filter();
        match self.questions.load_questions(filter).await {
            Ok(mut questions) => {
                if self.settings.shuffle {
                    questions.shuffle(&mut rng());
                }
                self.dispatch(SessionAction::LoadQuestions(questions));
                let total = self.state.total_questions();
                if total == 0 {
                    tracing::info!(session = %self.id, %filter, "no questions available");
                    SessionEntry::NoQuestions
                } else {
                    tracing::info!(session = %self.id, %filter, total, "questions loaded");
                    SessionEntry::Ready { total }
                }
            }
            Err(err) => {
                tracing::warn!(session = %self.id, %filter, error = %err, "question load failed");
                let message = err.to_string();
                self.dispatch(SessionAction::SetError(message.clone()));
                SessionEntry::LoadFailed(message)
            }
        }
    }

    /// Begin the first countdown.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NoQuestions` if nothing is loaded, loading
    /// failed, or the session already finished.
    pub fn start(&mut self) -> Result<(), QuizServiceError> {
        if self.started {
            return Ok(());
        }
        if !self.state.can_start() {
            return Err(QuizServiceError::NoQuestions(self.state.difficulty_filter()));
        }
        self.started = true;
        tracing::info!(
            session = %self.id,
            total = self.state.total_questions(),
            "session started"
        );
        self.enter_current();
        Ok(())
    }

    /// Choose an option on the displayed question.
    ///
    /// Submits straight away in [`SelectionMode::Immediate`]; otherwise only
    /// marks the choice as pending.
    pub async fn select_option(&mut self, option: usize) {
        if !self.accepting_answers() {
            tracing::debug!(session = %self.id, option, "selection ignored");
            return;
        }
        match self.settings.selection_mode {
            SelectionMode::Immediate => self.submit_option(option).await,
            SelectionMode::Deferred => {
                let valid = self
                    .state
                    .current_question()
                    .is_some_and(|q| q.is_valid_option(option));
                if valid {
                    self.pending_selection = Some(option);
                } else {
                    tracing::debug!(session = %self.id, option, "selection out of range");
                }
            }
        }
    }

    /// Confirm the pending selection.
    pub async fn submit(&mut self) {
        if !self.accepting_answers() {
            tracing::debug!(session = %self.id, "submit ignored");
            return;
        }
        match self.pending_selection {
            Some(option) => self.submit_option(option).await,
            None => tracing::debug!(session = %self.id, "submit without a selection"),
        }
    }

    pub async fn go_next(&mut self) {
        if !self.started || self.state.is_completed() {
            tracing::debug!(session = %self.id, "next ignored");
            return;
        }
        self.leave_question();
        self.dispatch(SessionAction::Advance);
        self.after_move().await;
    }

    pub fn go_previous(&mut self) {
        if !self.started || self.state.is_completed() || self.state.current_index() == 0 {
            tracing::debug!(session = %self.id, "previous ignored");
            return;
        }
        self.leave_question();
        self.dispatch(SessionAction::Retreat);
        self.enter_current();
    }

    /// Complete the session. Only offered on the last question.
    pub async fn finish(&mut self) {
        if !self.started || self.state.is_completed() || !self.state.is_last_question() {
            tracing::debug!(session = %self.id, "finish ignored");
            return;
        }
        self.leave_question();
        self.dispatch(SessionAction::Complete);
        self.on_completed().await;
    }

    /// Switch the filter and reload. The session waits for [`QuizSession::start`].
    pub async fn set_difficulty(&mut self, filter: DifficultyFilter) -> SessionEntry {
        self.dispatch(SessionAction::SetDifficulty(filter));
        self.load().await
    }

    /// Reset progress, reload with the same filter and start again.
    pub async fn restart(&mut self) -> SessionEntry {
        let entry = self.load().await;
        if matches!(entry, SessionEntry::Ready { .. }) {
            if let Err(err) = self.start() {
                tracing::debug!(session = %self.id, error = %err, "restart could not start");
            }
        }
        entry
    }

    /// Route a presenter command.
    ///
    /// # Errors
    ///
    /// Only [`UiEvent::Start`] can fail; see [`QuizSession::start`].
    pub async fn handle(&mut self, event: UiEvent) -> Result<(), QuizServiceError> {
        match event {
            UiEvent::Start => self.start()?,
            UiEvent::SelectOption(option) => self.select_option(option).await,
            UiEvent::Submit => self.submit().await,
            UiEvent::GoNext => self.go_next().await,
            UiEvent::GoPrevious => self.go_previous(),
            UiEvent::Finish => self.finish().await,
            UiEvent::SetDifficulty(filter) => {
                self.set_difficulty(filter).await;
            }
            UiEvent::Restart => {
                self.restart().await;
            }
        }
        Ok(())
    }

    /// Apply a signal from the timer task. Signals from cancelled tasks are dropped.
    pub async fn handle_signal(&mut self, signal: TimerSignal) {
        if !self.timer.accepts(&signal.key()) {
            tracing::debug!(session = %self.id, ?signal, "stale timer signal dropped");
            return;
        }
        match signal {
            TimerSignal::Tick(key) => {
                let remaining = self.state.time_remaining().saturating_sub(1);
                self.dispatch(SessionAction::TickTimer(remaining));
                if remaining == 0 {
                    self.expire(key.question_index);
                }
            }
            TimerSignal::GraceElapsed(_) => {
                self.timer.reset();
                self.dispatch(SessionAction::Advance);
                self.after_move().await;
            }
        }
    }

    /// Wait for the next timer signal and apply it.
    ///
    /// Returns `false` without waiting when nothing is scheduled and no
    /// signal is queued.
    pub async fn pump_timer(&mut self) -> bool {
        let signal = if self.timer.active_key().is_some() {
            self.signals.recv().await
        } else {
            self.signals.try_recv().ok()
        };
        match signal {
            Some(signal) => {
                self.handle_signal(signal).await;
                true
            }
            None => false,
        }
    }

    /// Move the session onto its own task, driven through the returned handle.
    #[must_use]
    pub fn spawn(self) -> QuizSessionHandle {
        let (commands_tx, mut commands_rx) = mpsc::channel::<SessionCommand>(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(self.snapshot());
        let mut session = self;

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = commands_rx.recv() => {
                        let Some(SessionCommand { event, respond_to }) = command else {
                            break;
                        };
                        let outcome = session.handle(event).await;
                        snapshot_tx.send_replace(session.snapshot());
                        if respond_to.send(outcome).is_err() {
                            tracing::trace!("session command response dropped (receiver gone)");
                        }
                    }
                    Some(signal) = session.signals.recv() => {
                        session.handle_signal(signal).await;
                        snapshot_tx.send_replace(session.snapshot());
                    }
                }
            }
            tracing::debug!(session = %session.id, "session task finished");
        });

        QuizSessionHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
            task,
        }
    }

    fn dispatch(&mut self, action: SessionAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    fn accepting_answers(&self) -> bool {
        self.started
            && !self.state.is_completed()
            && !self.state.is_current_answered()
            && matches!(self.timer.phase(), TimerPhase::Running { .. })
    }

    async fn submit_option(&mut self, option: usize) {
        let before = self.state.answers().len();
        self.dispatch(SessionAction::SubmitAnswer(option));
        if self.state.answers().len() == before {
            tracing::debug!(session = %self.id, option, "submit rejected");
            return;
        }
        self.pending_selection = None;
        self.timer.mark_answered();
        tracing::debug!(
            session = %self.id,
            index = self.state.current_index(),
            correct = self.state.current_answer().is_some_and(|a| a.is_correct()),
            "answer recorded"
        );
        if self.settings.auto_advance_after_answer {
            self.go_next().await;
        }
    }

    fn expire(&mut self, question_index: usize) {
        if let Some(option) = self.pending_selection.take() {
            self.dispatch(SessionAction::SubmitAnswer(option));
            tracing::debug!(session = %self.id, question_index, option, "pending selection submitted");
        }
        tracing::debug!(session = %self.id, question_index, "question timed out");
        self.timer.expire(question_index);
    }

    fn leave_question(&mut self) {
        self.timer.reset();
        self.pending_selection = None;
    }

    fn enter_current(&mut self) {
        if self.state.is_completed() {
            self.timer.stop();
        } else if self.state.current_question().is_none() || self.state.is_current_answered() {
            self.timer.reset();
        } else {
            self.timer.start(self.state.current_index());
        }
    }

    async fn after_move(&mut self) {
        if self.state.is_completed() {
            self.on_completed().await;
        } else {
            self.enter_current();
        }
    }

    async fn on_completed(&mut self) {
        self.timer.stop();
        self.pending_selection = None;
        tracing::info!(
            session = %self.id,
            score = self.state.score(),
            total = self.state.total_questions(),
            "session completed"
        );
        match self.recorder.record(&self.state).await {
            Ok(result) => self.last_result = Some(result),
            Err(err) => {
                tracing::warn!(session = %self.id, error = %err, "failed to record result");
            }
        }
    }
}

struct SessionCommand {
    event: UiEvent,
    respond_to: oneshot::Sender<Result<(), QuizServiceError>>,
}

/// Handle to a session running on its own task.
pub struct QuizSessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl QuizSessionHandle {
    /// Send a command and wait until it has been applied.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Closed` if the session task is gone, or the
    /// error of the command itself.
    pub async fn send(&self, event: UiEvent) -> Result<(), QuizServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.commands
            .send(SessionCommand { event, respond_to })
            .await
            .map_err(|_| QuizServiceError::Closed)?;
        response.await.map_err(|_| QuizServiceError::Closed)?
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the session task and cancel its timers.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "session task ended abnormally");
        }
    }
}

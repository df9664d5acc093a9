mod common;

use std::time::Duration;

use quiz_core::model::{DifficultyFilter, QUESTION_TIME_LIMIT_SECS};
use services::sessions::TimerPhase;
use services::{QuizServiceError, QuizSettings, SelectionMode, UiEvent};
use storage::repository::InMemoryRepository;

use common::{medium_bank, quiz_services};

#[tokio::test(start_paused = true)]
async fn tick_queued_before_submit_is_discarded() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    // The first tick is sent into the channel but not yet applied.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    session.select_option(0).await;
    assert_eq!(session.timer_phase(), TimerPhase::Answered { question_index: 0 });

    assert!(session.pump_timer().await, "stale tick is drained");
    assert_eq!(session.state().time_remaining(), QUESTION_TIME_LIMIT_SECS);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!session.pump_timer().await);
    assert_eq!(session.state().answers().len(), 1);
    assert_eq!(session.state().current_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_next_beats_pending_grace_advance() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    while session.timer_phase() != (TimerPhase::Expired { question_index: 0 }) {
        session.pump_timer().await;
    }
    assert_eq!(session.state().time_remaining(), 0);

    session.go_next().await;
    assert_eq!(session.state().current_index(), 1);

    // The cancelled grace never advances a second time.
    session.pump_timer().await;
    assert_eq!(session.state().current_index(), 1);
    assert_eq!(session.state().time_remaining(), QUESTION_TIME_LIMIT_SECS - 1);
}

#[tokio::test(start_paused = true)]
async fn queued_grace_signal_after_manual_next_is_stale() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    while session.timer_phase() != (TimerPhase::Expired { question_index: 0 }) {
        session.pump_timer().await;
    }
    // Let the grace delay fire without applying its signal.
    tokio::time::sleep(Duration::from_secs(2)).await;
    session.go_next().await;
    assert_eq!(session.state().current_index(), 1);

    assert!(session.pump_timer().await);
    assert_eq!(session.state().current_index(), 1);
    assert_eq!(session.state().time_remaining(), QUESTION_TIME_LIMIT_SECS);
}

#[tokio::test(start_paused = true)]
async fn finish_during_grace_cancels_advance() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();
    for _ in 0..3 {
        session.go_next().await;
    }

    while session.timer_phase() != (TimerPhase::Expired { question_index: 3 }) {
        session.pump_timer().await;
    }
    session.finish().await;

    assert!(session.state().is_completed());
    assert_eq!(session.timer_phase(), TimerPhase::Stopped);
    assert!(!session.pump_timer().await);
    assert_eq!(services.recorder().top().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn deferred_selection_is_submitted_on_timeout() {
    let settings = QuizSettings::default().with_selection_mode(SelectionMode::Deferred);
    let services = quiz_services(medium_bank(), settings);
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    session.select_option(2).await;
    assert_eq!(session.pending_selection(), Some(2));
    assert!(session.state().answers().is_empty());

    while session.timer_phase() != (TimerPhase::Expired { question_index: 0 }) {
        session.pump_timer().await;
    }
    let answers = session.state().answers();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].selected_index(), Some(2));
    assert!(!answers[0].is_correct());
    assert_eq!(session.pending_selection(), None);

    // Locked during the grace period.
    session.select_option(0).await;
    assert_eq!(session.state().answers().len(), 1);

    session.pump_timer().await;
    assert_eq!(session.state().current_index(), 1);
}

#[tokio::test(start_paused = true)]
async fn deferred_submit_confirms_latest_selection() {
    let settings = QuizSettings::default().with_selection_mode(SelectionMode::Deferred);
    let services = quiz_services(medium_bank(), settings);
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    session.select_option(3).await;
    session.select_option(0).await;
    session.submit().await;

    assert_eq!(session.state().score(), 1);
    assert_eq!(session.state().answers()[0].selected_index(), Some(0));
    assert_eq!(session.timer_phase(), TimerPhase::Answered { question_index: 0 });

    // Leaving a question drops an unconfirmed choice.
    session.go_next().await;
    session.select_option(1).await;
    session.go_next().await;
    assert_eq!(session.pending_selection(), None);
    assert_eq!(session.state().answers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn spawned_session_applies_commands_and_ticks() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    let handle = session.spawn();

    handle.send(UiEvent::Start).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(handle.snapshot().state.time_remaining(), QUESTION_TIME_LIMIT_SECS - 3);

    handle.send(UiEvent::SelectOption(0)).await.unwrap();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.progress.answered, 1);
    assert_eq!(snapshot.progress.score, 1);

    handle.send(UiEvent::Finish).await.unwrap();
    assert!(!handle.snapshot().state.is_completed());

    for _ in 0..3 {
        handle.send(UiEvent::GoNext).await.unwrap();
    }
    handle.send(UiEvent::Finish).await.unwrap();
    let snapshot = handle.snapshot();
    assert!(snapshot.state.is_completed());
    let summary = snapshot.summary.unwrap();
    assert_eq!((summary.score, summary.total, summary.percentage), (1, 4, 25));

    handle.shutdown().await;
    assert_eq!(services.recorder().top().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn spawned_session_reports_start_errors() {
    let services = quiz_services(InMemoryRepository::new(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::Easy);
    session.load().await;
    let handle = session.spawn();

    let err = handle.send(UiEvent::Start).await.unwrap_err();
    assert!(matches!(err, QuizServiceError::NoQuestions(DifficultyFilter::Easy)));
    assert!(!handle.snapshot().started);

    handle.shutdown().await;
}

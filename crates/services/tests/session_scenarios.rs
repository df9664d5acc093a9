mod common;

use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{DifficultyFilter, QUESTION_TIME_LIMIT_SECS, ResultRecord};
use quiz_core::scoring::ScoreTier;
use quiz_core::time::{fixed_clock, fixed_now};
use services::sessions::TimerPhase;
use services::{
    QuizServiceError, QuizSession, QuizSettings, ResultsRecorder, ReviewOutcome, SessionEntry,
};
use tokio::time::Instant;

use common::{ids, medium_bank, mixed_bank, quiz_services, UnreachableBank};

#[tokio::test(start_paused = true)]
async fn two_of_four_with_last_question_timed_out() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);

    assert_eq!(session.load().await, SessionEntry::Ready { total: 4 });
    session.start().unwrap();

    session.select_option(0).await;
    session.go_next().await;
    session.select_option(1).await;
    session.go_next().await;
    session.select_option(0).await;
    session.go_next().await;

    // Question 4 is left to run out.
    let started = Instant::now();
    while !session.state().is_completed() {
        assert!(session.pump_timer().await);
    }
    assert_eq!(started.elapsed(), Duration::from_millis(31_500));

    let state = session.state();
    assert_eq!(state.answers().len(), 3);
    assert_eq!(state.score(), 2);
    assert_eq!(session.timer_phase(), TimerPhase::Stopped);
    assert_eq!(session.last_result().map(ResultRecord::percentage), Some(50));

    let summary = session.summary().unwrap();
    assert_eq!((summary.correct, summary.incorrect, summary.unanswered), (2, 1, 1));
    assert_eq!(summary.questions[3].outcome, ReviewOutcome::Unanswered);
    assert_eq!(summary.tier, ScoreTier::Passing);

    let board = services.recorder().top().await.unwrap();
    assert_eq!(board.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_medium_question_finished_early() {
    let services = quiz_services(mixed_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::Medium);

    assert_eq!(session.load().await, SessionEntry::Ready { total: 1 });
    session.start().unwrap();
    session.select_option(2).await;
    session.finish().await;

    assert!(session.state().is_completed());
    let summary = session.summary().unwrap();
    assert_eq!(summary.percentage, 100);
    assert_eq!(summary.tier, ScoreTier::Outstanding);

    let board = services.recorder().top().await.unwrap();
    assert_eq!(board.len(), 1);
    let entry = &board.entries()[0];
    assert_eq!(entry.difficulty(), DifficultyFilter::Medium);
    assert_eq!(entry.difficulty().as_str(), "medium");
    assert_eq!(entry.timestamp(), fixed_now());
}

#[tokio::test(start_paused = true)]
async fn empty_filter_cannot_be_entered() {
    let services = quiz_services(mixed_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::Hard);

    assert_eq!(session.load().await, SessionEntry::NoQuestions);
    assert!(session.state().no_questions_available());
    assert!(matches!(
        session.start(),
        Err(QuizServiceError::NoQuestions(DifficultyFilter::Hard))
    ));
    assert_eq!(session.timer_phase(), TimerPhase::Idle);

    // Nothing is scheduled, so the pump returns immediately.
    assert!(!session.pump_timer().await);
}

#[tokio::test(start_paused = true)]
async fn previous_on_first_question_keeps_counting() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    for _ in 0..5 {
        session.pump_timer().await;
    }
    session.go_previous();

    assert_eq!(session.state().current_index(), 0);
    assert_eq!(session.state().time_remaining(), QUESTION_TIME_LIMIT_SECS - 5);
    assert_eq!(session.timer_phase(), TimerPhase::Running { question_index: 0 });
}

#[tokio::test(start_paused = true)]
async fn leaderboard_keeps_ten_best_across_sessions() {
    let services = quiz_services(medium_bank(), QuizSettings::default());

    // Scores 0..=4 out of 4, recorded repeatedly.
    for run in 0..11_usize {
        let mut session = services.session(DifficultyFilter::All);
        session.load().await;
        session.start().unwrap();
        let correct = run % 5;
        for index in 0..4 {
            session.select_option(if index < correct { 0 } else { 1 }).await;
            session.go_next().await;
        }
        assert!(session.state().is_completed());
    }

    let board = services.recorder().top().await.unwrap();
    assert_eq!(board.len(), 10);
    let percentages: Vec<u8> = board.entries().iter().map(ResultRecord::percentage).collect();
    assert_eq!(percentages, vec![100, 100, 75, 75, 50, 50, 25, 25, 0, 0]);
}

#[tokio::test(start_paused = true)]
async fn restart_reloads_same_order_with_zero_score() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();
    let before = ids(session.state().questions());

    session.select_option(0).await;
    session.go_next().await;
    session.select_option(0).await;
    assert_eq!(session.state().score(), 2);

    assert_eq!(session.restart().await, SessionEntry::Ready { total: 4 });
    let state = session.state();
    assert_eq!(ids(state.questions()), before);
    assert_eq!(state.score(), 0);
    assert!(state.answers().is_empty());
    assert_eq!(state.current_index(), 0);
    assert_eq!(state.time_remaining(), QUESTION_TIME_LIMIT_SECS);
    assert!(session.is_started());
    assert_eq!(session.timer_phase(), TimerPhase::Running { question_index: 0 });
}

#[tokio::test(start_paused = true)]
async fn restart_after_completion_records_a_second_result() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();
    skip_to_last(&mut session).await;
    session.finish().await;
    assert!(session.last_result().is_some());

    session.restart().await;
    assert!(!session.state().is_completed());
    assert!(session.last_result().is_none());
    skip_to_last(&mut session).await;
    session.finish().await;

    assert_eq!(services.recorder().top().await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn finish_before_last_question_is_ignored() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    session.finish().await;
    assert!(!session.state().is_completed());
    assert_eq!(session.timer_phase(), TimerPhase::Running { question_index: 0 });

    session.select_option(0).await;
    session.go_next().await;
    session.finish().await;
    assert!(!session.state().is_completed());
    assert!(services.recorder().top().await.unwrap().is_empty());

    skip_to_last(&mut session).await;
    session.finish().await;
    assert!(session.state().is_completed());
    assert_eq!(services.recorder().top().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reload_mid_countdown_starts_with_full_time() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();
    session.select_option(0).await;
    session.go_next().await;
    for _ in 0..18 {
        assert!(session.pump_timer().await);
    }
    assert_eq!(session.state().time_remaining(), QUESTION_TIME_LIMIT_SECS - 18);

    assert_eq!(session.load().await, SessionEntry::Ready { total: 4 });
    assert!(!session.is_started());
    session.start().unwrap();

    let state = session.state();
    assert_eq!(state.current_index(), 0);
    assert_eq!(state.time_remaining(), QUESTION_TIME_LIMIT_SECS);
    assert!(state.answers().is_empty());
    assert_eq!(state.score(), 0);
    assert_eq!(session.timer_phase(), TimerPhase::Running { question_index: 0 });
}

#[tokio::test(start_paused = true)]
async fn reload_after_completion_can_start_again() {
    let services = quiz_services(mixed_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::Medium);
    session.load().await;
    session.start().unwrap();
    session.finish().await;
    assert!(session.state().is_completed());

    assert_eq!(session.load().await, SessionEntry::Ready { total: 1 });
    assert!(!session.state().is_completed());
    assert!(session.last_result().is_none());
    session.start().unwrap();
    assert_eq!(session.timer_phase(), TimerPhase::Running { question_index: 0 });
}

#[tokio::test(start_paused = true)]
async fn difficulty_change_reloads_and_waits_for_start() {
    let services = quiz_services(mixed_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();
    session.select_option(0).await;

    assert_eq!(
        session.set_difficulty(DifficultyFilter::Easy).await,
        SessionEntry::Ready { total: 2 }
    );
    let state = session.state();
    assert_eq!(state.difficulty_filter(), DifficultyFilter::Easy);
    assert_eq!(ids(state.questions()), vec![1, 2]);
    assert!(state.answers().is_empty());
    assert!(!session.is_started());
    assert_eq!(session.timer_phase(), TimerPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn load_failure_is_reported_and_blocks_start() {
    let recorder = ResultsRecorder::in_memory(fixed_clock());
    let mut session = QuizSession::new(Arc::new(UnreachableBank), recorder, QuizSettings::default());

    let entry = session.load().await;
    assert!(matches!(entry, SessionEntry::LoadFailed(ref msg) if msg.contains("bank offline")));
    assert!(session.state().error().is_some());
    assert!(!session.state().is_loading());
    assert!(session.start().is_err());
}

#[tokio::test(start_paused = true)]
async fn revisited_answer_stays_locked() {
    let services = quiz_services(medium_bank(), QuizSettings::default());
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    session.select_option(3).await;
    session.go_next().await;
    session.go_previous();

    assert_eq!(session.state().current_index(), 0);
    assert_eq!(session.timer_phase(), TimerPhase::Idle);
    session.select_option(0).await;
    assert_eq!(session.state().answers().len(), 1);
    assert_eq!(session.state().score(), 0);
}

#[tokio::test(start_paused = true)]
async fn auto_advance_moves_on_after_answer() {
    let settings = QuizSettings::default().with_auto_advance(true);
    let services = quiz_services(medium_bank(), settings);
    let mut session = services.session(DifficultyFilter::All);
    session.load().await;
    session.start().unwrap();

    session.select_option(0).await;
    assert_eq!(session.state().current_index(), 1);
    assert_eq!(session.timer_phase(), TimerPhase::Running { question_index: 1 });
}

#[tokio::test(start_paused = true)]
async fn counts_match_loaded_sessions() {
    let services = quiz_services(mixed_bank(), QuizSettings::default());
    for (filter, count) in services.question_counts().await.unwrap() {
        let mut session = services.session(filter);
        let expected = if count == 0 {
            SessionEntry::NoQuestions
        } else {
            SessionEntry::Ready { total: count }
        };
        assert_eq!(session.load().await, expected, "{filter}");
    }
}

async fn skip_to_last(session: &mut QuizSession) {
    while !session.state().is_last_question() {
        session.go_next().await;
    }
}

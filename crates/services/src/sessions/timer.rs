//! Per-question countdown.
//!
//! The controller owns at most one tokio task at a time: either the ticking
//! countdown of the displayed question or the grace delay after it expired.
//! Tasks never see the session; they only post [`TimerSignal`]s, each stamped
//! with the [`TimerKey`] they were started under. Cancelling aborts the task
//! and bumps the generation, so signals already sitting in the channel no
//! longer match [`TimerController::accepts`] and are dropped by the driver.

use std::time::Duration;

use quiz_core::model::SessionId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::QuizSettings;

/// Identity of one scheduled timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub session: SessionId,
    pub question_index: usize,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// One tick interval elapsed on the running countdown.
    Tick(TimerKey),
    /// The grace delay after expiry elapsed.
    GraceElapsed(TimerKey),
}

impl TimerSignal {
    #[must_use]
    pub fn key(&self) -> TimerKey {
        match self {
            Self::Tick(key) | Self::GraceElapsed(key) => *key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running { question_index: usize },
    Answered { question_index: usize },
    Expired { question_index: usize },
    Stopped,
}

pub struct TimerController {
    session: SessionId,
    tick_interval: Duration,
    grace_period: Duration,
    signals: mpsc::UnboundedSender<TimerSignal>,
    generation: u64,
    phase: TimerPhase,
    active: Option<(TimerKey, JoinHandle<()>)>,
}

impl TimerController {
    #[must_use]
    pub fn new(
        session: SessionId,
        settings: &QuizSettings,
        signals: mpsc::UnboundedSender<TimerSignal>,
    ) -> Self {
        Self {
            session,
            tick_interval: settings.tick_interval,
            grace_period: settings.grace_period,
            signals,
            generation: 0,
            phase: TimerPhase::Idle,
            active: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    #[must_use]
    pub fn active_key(&self) -> Option<TimerKey> {
        self.active.as_ref().map(|(key, _)| *key)
    }

    /// Whether `key` belongs to the task currently scheduled.
    #[must_use]
    pub fn accepts(&self, key: &TimerKey) -> bool {
        self.active_key().as_ref() == Some(key)
    }

    /// Start the countdown for `question_index`, replacing anything scheduled.
    pub fn start(&mut self, question_index: usize) -> TimerKey {
        self.cancel();
        let key = self.next_key(question_index);
        let tx = self.signals.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(TimerSignal::Tick(key)).is_err() {
                    break;
                }
            }
        });

        self.active = Some((key, handle));
        self.phase = TimerPhase::Running { question_index };
        tracing::trace!(?key, "countdown started");
        key
    }

    /// The current question was answered; stop ticking.
    pub fn mark_answered(&mut self) {
        let index = self.current_index();
        self.cancel();
        if let Some(question_index) = index {
            self.phase = TimerPhase::Answered { question_index };
        }
    }

    /// The countdown for `question_index` ran out; schedule the grace advance.
    pub fn expire(&mut self, question_index: usize) -> TimerKey {
        self.cancel();
        let key = self.next_key(question_index);
        let tx = self.signals.clone();
        let grace = self.grace_period;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if tx.send(TimerSignal::GraceElapsed(key)).is_err() {
                tracing::trace!(?key, "grace signal dropped (session gone)");
            }
        });

        self.active = Some((key, handle));
        self.phase = TimerPhase::Expired { question_index };
        key
    }

    /// Leave the current question without scheduling anything.
    pub fn reset(&mut self) {
        self.cancel();
        self.phase = TimerPhase::Idle;
    }

    /// Session completed; nothing is scheduled until the next reset or start.
    pub fn stop(&mut self) {
        self.cancel();
        self.phase = TimerPhase::Stopped;
    }

    fn cancel(&mut self) {
        if let Some((key, handle)) = self.active.take() {
            handle.abort();
            tracing::trace!(?key, "timer cancelled");
        }
        self.generation = self.generation.wrapping_add(1);
    }

    fn next_key(&self, question_index: usize) -> TimerKey {
        TimerKey {
            session: self.session,
            question_index,
            generation: self.generation,
        }
    }

    fn current_index(&self) -> Option<usize> {
        match self.phase {
            TimerPhase::Running { question_index }
            | TimerPhase::Answered { question_index }
            | TimerPhase::Expired { question_index } => Some(question_index),
            TimerPhase::Idle | TimerPhase::Stopped => None,
        }
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.active.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (TimerController, mpsc::UnboundedReceiver<TimerSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = QuizSettings::default();
        (TimerController::new(SessionId::generate(), &settings, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval_with_current_key() {
        let (mut timer, mut rx) = controller();
        let key = timer.start(0);

        let started = Instant::now();
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(TimerSignal::Tick(key)));
        }
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert!(timer.accepts(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_invalidates_previous_key() {
        let (mut timer, mut rx) = controller();
        let first = timer.start(0);
        let second = timer.start(1);

        assert_ne!(first, second);
        assert!(!timer.accepts(&first));
        assert_eq!(rx.recv().await, Some(TimerSignal::Tick(second)));
    }

    #[tokio::test(start_paused = true)]
    async fn answered_timer_sends_nothing_more() {
        let (mut timer, mut rx) = controller();
        let key = timer.start(2);
        assert_eq!(rx.recv().await, Some(TimerSignal::Tick(key)));

        timer.mark_answered();
        assert_eq!(timer.phase(), TimerPhase::Answered { question_index: 2 });
        assert!(!timer.accepts(&key));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_fires_grace_once_after_delay() {
        let (mut timer, mut rx) = controller();
        timer.start(0);
        let started = Instant::now();
        let key = timer.expire(0);

        assert_eq!(rx.recv().await, Some(TimerSignal::GraceElapsed(key)));
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(timer.phase(), TimerPhase::Expired { question_index: 0 });

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_grace() {
        let (mut timer, mut rx) = controller();
        let key = timer.expire(4);
        timer.stop();

        assert_eq!(timer.phase(), TimerPhase::Stopped);
        assert!(!timer.accepts(&key));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}

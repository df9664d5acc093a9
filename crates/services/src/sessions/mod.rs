mod driver;
mod progress;
mod timer;
mod view;

// Public API of the session subsystem.
pub use driver::{QuizSession, QuizSessionHandle, SessionEntry, SessionSnapshot, UiEvent};
pub use progress::{SessionProgress, TimeUrgency};
pub use timer::{TimerController, TimerKey, TimerPhase, TimerSignal};
pub use view::{QuestionReview, ResultSummary, ReviewOutcome};

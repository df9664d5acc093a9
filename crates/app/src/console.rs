//! Line-oriented presenter over stdin/stdout.

use std::fmt;

use quiz_core::model::DifficultyFilter;
use services::sessions::TimerPhase;
use services::{QuizServices, ReviewOutcome, SessionEntry, SessionSnapshot, TimeUrgency, UiEvent};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Event(UiEvent),
    Help,
    Quit,
}

#[derive(Debug)]
pub enum InputError {
    Unknown(String),
    InvalidOption(String),
    Difficulty(quiz_core::Error),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Unknown(raw) => write!(f, "unknown command: {raw} (type h for help)"),
            InputError::InvalidOption(raw) => write!(f, "invalid option number: {raw}"),
            InputError::Difficulty(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Map one input line to a session command.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let input = match word.to_ascii_lowercase().as_str() {
        "" | "start" => Input::Event(UiEvent::Start),
        "s" | "submit" => Input::Event(UiEvent::Submit),
        "n" | "next" => Input::Event(UiEvent::GoNext),
        "p" | "prev" | "previous" => Input::Event(UiEvent::GoPrevious),
        "f" | "finish" => Input::Event(UiEvent::Finish),
        "r" | "restart" => Input::Event(UiEvent::Restart),
        "d" | "difficulty" => {
            let filter: DifficultyFilter = rest
                .parse()
                .map_err(|e| InputError::Difficulty(quiz_core::Error::from(e)))?;
            Input::Event(UiEvent::SetDifficulty(filter))
        }
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        digits if digits.chars().all(|c| c.is_ascii_digit()) => {
            let number: usize = digits
                .parse()
                .map_err(|_| InputError::InvalidOption(digits.to_string()))?;
            let option = number
                .checked_sub(1)
                .ok_or_else(|| InputError::InvalidOption(digits.to_string()))?;
            Input::Event(UiEvent::SelectOption(option))
        }
        _ => return Err(InputError::Unknown(line.to_string())),
    };
    Ok(input)
}

pub fn print_help() {
    println!("Commands:");
    println!("  <enter>, start   begin the quiz");
    println!("  1-4              choose an option");
    println!("  s                submit the chosen option (deferred mode)");
    println!("  n / p            next / previous question");
    println!("  f                finish (last question)");
    println!("  r                restart with the same difficulty");
    println!("  d <tier>         switch difficulty: all, easy, medium, hard");
    println!("  q                quit");
}

/// Run an interactive session until the user quits or stdin closes.
pub async fn play(
    services: &QuizServices,
    filter: DifficultyFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let counts = services.question_counts().await?;
    let listed: Vec<String> = counts
        .iter()
        .map(|(filter, count)| format!("{filter} {count}"))
        .collect();
    println!("Question bank: {}", listed.join(", "));

    let mut session = services.session(filter);
    if let SessionEntry::LoadFailed(message) = session.load().await {
        return Err(message.into());
    }

    let handle = session.spawn();
    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer = Renderer::default();

    print_help();
    renderer.render(&handle.snapshot());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => print_help(),
                    Ok(Input::Event(event)) => {
                        if let Err(err) = handle.send(event).await {
                            println!("{err}");
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let snapshot = snapshots.borrow_and_update().clone();
        renderer.render(&snapshot);
    }

    handle.shutdown().await;
    Ok(())
}

/// The parts of a snapshot whose change is worth printing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    started: bool,
    completed: bool,
    loading: bool,
    index: usize,
    total: usize,
    answered: usize,
    urgency: TimeUrgency,
    expired: bool,
    pending: Option<usize>,
    filter: DifficultyFilter,
    error: Option<String>,
}

impl Frame {
    fn of(snapshot: &SessionSnapshot) -> Self {
        let state = &snapshot.state;
        Self {
            started: snapshot.started,
            completed: state.is_completed(),
            loading: state.is_loading(),
            index: state.current_index(),
            total: state.total_questions(),
            answered: state.answers().len(),
            urgency: snapshot.progress.urgency,
            expired: matches!(snapshot.timer, TimerPhase::Expired { .. }),
            pending: snapshot.pending_selection,
            filter: state.difficulty_filter(),
            error: state.error().map(str::to_string),
        }
    }
}

#[derive(Default)]
struct Renderer {
    last: Option<Frame>,
}

impl Renderer {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        let frame = Frame::of(snapshot);
        let last = self.last.replace(frame.clone());
        if last.as_ref() == Some(&frame) || frame.loading {
            return;
        }
        let changed = |f: fn(&Frame) -> bool| last.as_ref().is_none_or(|l| f(l) != f(&frame));

        if let Some(error) = &frame.error {
            if last.as_ref().is_none_or(|l| l.error.as_ref() != Some(error)) {
                println!("Could not load questions: {error}");
            }
            return;
        }

        if !frame.started && !frame.completed {
            let moved = last
                .as_ref()
                .is_none_or(|l| l.started || l.filter != frame.filter || l.total != frame.total);
            if moved {
                if frame.total == 0 {
                    println!("No {} questions available. Try `d all`.", frame.filter);
                } else {
                    println!(
                        "{} {} questions ready. Press enter to start.",
                        frame.total, frame.filter
                    );
                }
            }
            return;
        }

        if frame.completed {
            if changed(|f| f.completed) {
                print_summary(snapshot);
            }
            return;
        }

        let entered = last
            .as_ref()
            .is_none_or(|l| !l.started || l.completed || l.index != frame.index);
        if entered {
            print_question(snapshot);
            return;
        }

        if frame.answered > last.as_ref().map_or(0, |l| l.answered) {
            print_feedback(snapshot);
        }
        if frame.expired && changed(|f| f.expired) {
            println!("Time's up!");
        }
        if let Some(option) = frame.pending {
            if last.as_ref().is_none_or(|l| l.pending != frame.pending) {
                println!("Selected {}. Type s to submit.", option + 1);
            }
        }
        if frame.urgency != TimeUrgency::Plenty
            && frame.urgency != TimeUrgency::Medium
            && last.as_ref().is_none_or(|l| l.urgency != frame.urgency)
        {
            println!("{}s left", snapshot.state.time_remaining());
        }
    }
}

fn print_question(snapshot: &SessionSnapshot) {
    let state = &snapshot.state;
    let Some(question) = state.current_question() else {
        return;
    };
    println!();
    println!(
        "Question {} of {} [{}]  score {}",
        snapshot.progress.position,
        snapshot.progress.total,
        question.difficulty(),
        snapshot.progress.score
    );
    println!("{}", question.text());
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
    match state.current_answer() {
        Some(answer) => match answer.selected_index() {
            Some(selected) => println!("Answered: {}", selected + 1),
            None => println!("Not answered"),
        },
        None => println!("{}s left", state.time_remaining()),
    }
}

fn print_feedback(snapshot: &SessionSnapshot) {
    let Some(answer) = snapshot.state.current_answer() else {
        return;
    };
    if answer.is_correct() {
        println!("Correct!");
    } else {
        let correct = answer.correct_index();
        let text = snapshot
            .state
            .current_question()
            .and_then(|q| q.option(correct))
            .unwrap_or_default();
        println!("Wrong. The answer was {}) {text}", correct + 1);
    }
}

fn print_summary(snapshot: &SessionSnapshot) {
    let Some(summary) = &snapshot.summary else {
        return;
    };
    println!();
    println!(
        "Finished: {}/{} ({}%)  {}",
        summary.score, summary.total, summary.percentage, summary.feedback
    );
    println!(
        "Correct {}, incorrect {}, unanswered {}",
        summary.correct, summary.incorrect, summary.unanswered
    );
    for (i, review) in summary.questions.iter().enumerate() {
        let correct = review
            .options
            .get(review.correct_index)
            .map_or("", String::as_str);
        let verdict = match &review.outcome {
            ReviewOutcome::Correct { .. } => "correct".to_string(),
            ReviewOutcome::Incorrect { selected } => {
                let chosen = review.options.get(*selected).map_or("", String::as_str);
                format!("you said {chosen}, answer {correct}")
            }
            ReviewOutcome::Unanswered => format!("unanswered, answer {correct}"),
        };
        println!("  {}. {}  {verdict}", i + 1, review.text);
    }
    println!("Type r to play again or q to quit.");
}

use std::fmt;
use std::path::PathBuf;

use quiz_core::model::DifficultyFilter;
use services::{Clock, QuizServices, QuizSettings};
use storage::json::{read_question_bank, sample_questions};

mod console;
mod logging;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDifficulty { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value (all|easy|medium|hard): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play        [--db <sqlite_url>] [--difficulty <tier>] [--questions <file>]");
    eprintln!("  cargo run -p app -- leaderboard [--db <sqlite_url>] [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --difficulty all");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_DIFFICULTY, QUIZ_LOG");
    eprintln!("  QUIZ_TICK_MS, QUIZ_GRACE_MS, QUIZ_SELECTION_MODE, QUIZ_AUTO_ADVANCE, QUIZ_SHUFFLE");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Leaderboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    difficulty: DifficultyFilter,
    questions: Option<PathBuf>,
    json: bool,
}

impl Args {
    fn defaults() -> Result<Self, ArgsError> {
        let db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("sqlite:quiz.sqlite3".into()), normalize_sqlite_url);
        let difficulty = match std::env::var("QUIZ_DIFFICULTY") {
            Ok(raw) => parse_difficulty(raw)?,
            Err(_) => DifficultyFilter::All,
        };
        Ok(Self {
            db_url,
            difficulty,
            questions: None,
            json: false,
        })
    }

    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::defaults()?;

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                (Command::Play, "--difficulty") => {
                    let value = require_value(args, "--difficulty")?;
                    parsed.difficulty = parse_difficulty(value)?;
                }
                (Command::Play, "--questions") => {
                    let value = require_value(args, "--questions")?;
                    parsed.questions = Some(PathBuf::from(value));
                }
                (Command::Leaderboard, "--json") => parsed.json = true,
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn parse_difficulty(raw: String) -> Result<DifficultyFilter, ArgsError> {
    raw.parse::<DifficultyFilter>()
        .map_err(|_| ArgsError::InvalidDifficulty { raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Import `path` if given; fall back to the bundled bank when the database has none.
async fn ensure_question_bank(
    services: &QuizServices,
    path: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bank = services.questions();

    if let Some(path) = path {
        let questions = read_question_bank(path)?;
        for question in &questions {
            bank.upsert_question(question).await?;
        }
        tracing::info!(count = questions.len(), path = %path.display(), "question bank imported");
        return Ok(());
    }

    if bank.count_questions(DifficultyFilter::All).await? == 0 {
        let questions = sample_questions()?;
        for question in &questions {
            bank.upsert_question(question).await?;
        }
        tracing::info!(count = questions.len(), "sample question bank installed");
    }
    Ok(())
}

async fn print_leaderboard(
    services: &QuizServices,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = services.recorder().top().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    if board.is_empty() {
        println!("No results yet.");
        return Ok(());
    }
    println!("{:>4}  {:>7}  {:>4}  {:<10}  completed", "rank", "score", "pct", "difficulty");
    for (rank, entry) in board.entries().iter().enumerate() {
        println!(
            "{:>4}  {:>3}/{:<3}  {:>3}%  {:<10}  {}",
            rank + 1,
            entry.score(),
            entry.total(),
            entry.percentage(),
            entry.difficulty(),
            entry.timestamp().format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.peek().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            argv.next();
            cmd
        }
    };

    let parsed = Args::parse(cmd, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = QuizSettings::from_env()?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = QuizServices::new_sqlite(&parsed.db_url, Clock::system(), settings).await?;

    match cmd {
        Command::Play => {
            ensure_question_bank(&services, parsed.questions.as_ref()).await?;
            console::play(&services, parsed.difficulty).await
        }
        Command::Leaderboard => print_leaderboard(&services, parsed.json).await,
    }
}

#[tokio::main]
async fn main() {
    logging::init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use quiz_core::model::{AnswerSheet, QuizSettings, StartId};
use quiz_core::sample::sample_paragraphs;
use services::document::write_docx;
use services::{AppServices, Clock, ImportStatus};
use tracing::debug;

mod render;

#[derive(Parser)]
#[command(name = "quiz", version, about = "Run a ten-question quiz and report on the answers")]
struct Cli {
    /// SQLite database URL or path.
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db: String,

    /// Total reported with every result and top score bucket.
    #[arg(long, global = true, env = "QUIZ_QUESTIONS_PER_QUIZ", default_value_t = 10)]
    questions_per_quiz: u32,

    /// Allow a single attempt per client address.
    #[arg(
        long,
        global = true,
        env = "QUIZ_IP_LOCK",
        default_value_t = true,
        action = ArgAction::Set
    )]
    ip_lock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema
    InitDb,

    /// Import questions from a .docx document
    Import { file: PathBuf },

    /// Write the built-in sample quiz as a .docx document
    Sample {
        #[arg(long)]
        out: PathBuf,
    },

    /// List stored questions with their options
    Questions,

    /// Record a quiz start for a client address
    Start {
        #[arg(long)]
        ip: String,
    },

    /// Submit answers, e.g. --answers '{"1":"B","2":"c"}'
    Submit {
        #[arg(long)]
        ip: String,

        /// Start id returned by `start`, used to time the attempt.
        #[arg(long)]
        start: Option<u64>,

        #[arg(long)]
        answers: String,
    },

    /// Show whether an address already completed the quiz
    Status {
        #[arg(long)]
        ip: String,
    },

    /// Show the administrator dashboard
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Total attempts and average time as JSON
    Stats,

    /// Export attempts as CSV
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete all questions, attempts and start events
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Check cached counters against the response history
    Verify,
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
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    Ok(())
}

/// Reads `{"<question id>": "<label>", ...}`. Non-string labels are passed
/// through as text so they are skipped like any other invalid label.
fn parse_answers(raw: &str) -> anyhow::Result<AnswerSheet> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--answers is not valid JSON")?;
    let Some(map) = value.as_object() else {
        bail!("--answers must be a JSON object of question id to label");
    };
    Ok(AnswerSheet::from_raw(map.iter().map(|(key, value)| {
        let label = value
            .as_str()
            .map_or_else(|| value.to_string(), str::to_owned);
        (key.clone(), label)
    })))
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Sample generation needs no database.
    if let Commands::Sample { out } = &cli.command {
        write_docx(out, &sample_paragraphs())
            .with_context(|| format!("writing {}", out.display()))?;
        println!("Sample quiz document created: {}", out.display());
        return Ok(());
    }

    let settings = QuizSettings::new(cli.questions_per_quiz, cli.ip_lock, ["docx"])?;
    let db_url = normalize_sqlite_url(cli.db);
    prepare_sqlite_file(&db_url)?;
    debug!(db = %db_url, "opening database");
    let app = AppServices::new_sqlite(&db_url, Clock::default_clock(), settings).await?;

    match cli.command {
        Commands::Sample { .. } => {}
        Commands::InitDb => println!("Database initialized at {db_url}"),
        Commands::Import { file } => {
            let report = app.import().import_file(&file).await;
            println!("{}", report.message);
            if report.status == ImportStatus::Error {
                bail!("import failed");
            }
        }
        Commands::Questions => {
            let questions = app.quiz().questions().await?;
            print!("{}", render::questions(&questions));
        }
        Commands::Start { ip } => {
            let ticket = app.quiz().start(&ip).await?;
            println!("{}", serde_json::to_string_pretty(&ticket)?);
        }
        Commands::Submit { ip, start, answers } => {
            let sheet = parse_answers(&answers)?;
            let result = app
                .quiz()
                .submit(&ip, start.map(StartId::new), sheet)
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Status { ip } => match app.quiz().has_completed(&ip).await? {
            Some(attempt) => println!(
                "{ip} completed the quiz on {} with score {}",
                attempt.created_at.format("%Y-%m-%d %H:%M:%S"),
                attempt.score
            ),
            None => println!("{ip} has not completed the quiz"),
        },
        Commands::Dashboard { json } => {
            let dashboard = app.dashboard().dashboard().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print!("{}", render::dashboard(&dashboard));
            }
        }
        Commands::Stats => {
            let stats = app.dashboard().quick_stats().await?;
            println!("{}", serde_json::to_string(&stats)?);
        }
        Commands::Export { out } => {
            let csv = app.admin().export_csv().await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported attempts to {}", path.display());
                }
                None => print!("{csv}"),
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all quiz data without --yes");
            }
            let report = app.admin().clear_all().await;
            println!("{}", report.message());
            if !report.success {
                bail!("clear failed");
            }
        }
        Commands::Verify => {
            let drift = app.dashboard().check_counters().await?;
            if drift.is_empty() {
                println!("All counters match the response history");
            } else {
                for entry in &drift {
                    println!("{entry}");
                }
                bail!("{} counters out of sync", drift.len());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}

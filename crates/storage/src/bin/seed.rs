use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use quiz_core::model::{AnswerSheet, OptionLabel};
use quiz_core::parser::parse_paragraphs;
use quiz_core::sample::sample_paragraphs;
use storage::repository::{NewSubmission, Storage};

/// Load the sample quiz and optionally simulate attempts against it.
#[derive(Debug, Parser)]
#[command(name = "seed")]
struct Args {
    /// SQLite URL
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3", value_parser = non_empty)]
    db_url: String,

    /// Number of simulated attempts to record
    #[arg(long, env = "QUIZ_SEED_ATTEMPTS", default_value_t = 0)]
    attempts: u32,

    /// Fixed current time (RFC3339) for deterministic seeding
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,
}

fn non_empty(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err("value must not be empty".into());
    }
    Ok(raw.to_owned())
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("expected RFC3339, got {raw}"))
}

/// Picks the right answer most of the time, spreading misses across attempts.
fn simulated_choice(attempt: u32, number: u32, correct: OptionLabel) -> OptionLabel {
    if (attempt + number) % 3 != 0 {
        return correct;
    }
    let idx = OptionLabel::ALL
        .iter()
        .position(|label| *label == correct)
        .unwrap_or(0);
    OptionLabel::ALL[(idx + 1) % OptionLabel::ALL.len()]
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let outcome = parse_paragraphs(sample_paragraphs());
    let report = storage.questions.save_parsed(&outcome.questions).await?;
    if report.failed > 0 {
        return Err(report.errors.join("; ").into());
    }

    let questions = storage.questions.list_questions().await?;
    for i in 0..args.attempts {
        let ip_address = format!("10.0.0.{}", i + 1);
        let started_at = now - Duration::hours(i64::from(i)) - Duration::minutes(5);
        let start = storage.starts.record_start(&ip_address, started_at).await?;

        let mut answers = AnswerSheet::default();
        for question in &questions {
            answers.insert(
                question.id,
                simulated_choice(i, question.number, question.correct_answer),
            );
        }

        let created_at = started_at + Duration::seconds(60 + i64::from(i % 5) * 30);
        storage
            .attempts
            .record_submission(NewSubmission {
                ip_address,
                time_taken_secs: start.elapsed_secs(created_at),
                created_at,
                answers,
                once_per_address: false,
            })
            .await?;
    }

    println!(
        "Seeded {} sample questions and {} attempts into {}",
        report.succeeded, args.attempts, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

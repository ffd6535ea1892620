//! Dashboard aggregation over stored counters and attempt history.
//!
//! Everything here is recomputed on each view; nothing is cached.

use chrono::Timelike;
use serde::Serialize;

use crate::model::{Attempt, OptionLabel, Question, ScoreColor};

/// Length of the "most correct" / "most wrong" lists.
pub const TOP_QUESTIONS: usize = 5;

const PREVIEW_CHARS: usize = 80;

/// Rounds to one decimal place for presentation.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// First 80 characters of a question body, with `...` when cut.
#[must_use]
pub fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_CHARS {
        let head: String = body.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_owned()
    }
}

//
// ─── VIEW TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRank {
    pub number: u32,
    pub body: String,
    /// Correct count for the "most correct" list, wrong count for "most wrong".
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionBreakdown {
    pub label: OptionLabel,
    pub text: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionBreakdown {
    pub number: u32,
    pub body: String,
    pub total_attempts: u32,
    pub correct_count: u32,
    pub correct_percentage: f64,
    pub correct_answer: OptionLabel,
    pub options: Vec<OptionBreakdown>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBucket {
    pub score: u32,
    pub count: u32,
    pub color: ScoreColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickStats {
    pub total_attempts: u32,
    pub average_time: u32,
}

/// Administrator dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_attempts: u32,
    pub quiz_starts: u64,
    pub completion_rate: f64,
    pub average_time: u32,
    pub hourly_activity: [u32; 24],
    pub most_correct: Vec<QuestionRank>,
    pub most_wrong: Vec<QuestionRank>,
    pub questions: Vec<QuestionBreakdown>,
    pub score_distribution: Vec<ScoreBucket>,
}

impl Dashboard {
    /// Builds the dashboard from stored questions, every attempt, and the
    /// number of durable quiz-start events.
    #[must_use]
    pub fn compute(
        questions: &[Question],
        attempts: &[Attempt],
        quiz_starts: u64,
        max_score: u32,
    ) -> Self {
        let mut by_number: Vec<&Question> = questions.iter().collect();
        by_number.sort_by_key(|q| q.number);

        Self {
            total_attempts: attempt_count(attempts),
            quiz_starts,
            completion_rate: round_tenth(completion_rate(attempts.len() as u64, quiz_starts)),
            average_time: average_time(attempts),
            hourly_activity: hourly_activity(attempts),
            most_correct: most_correct(&by_number),
            most_wrong: most_wrong(&by_number),
            questions: by_number.iter().map(|q| breakdown(q)).collect(),
            score_distribution: score_distribution(attempts, max_score),
        }
    }
}

//
// ─── AGGREGATES ────────────────────────────────────────────────────────────────
//

fn attempt_count(attempts: &[Attempt]) -> u32 {
    u32::try_from(attempts.len()).unwrap_or(u32::MAX)
}

#[must_use]
pub fn quick_stats(attempts: &[Attempt]) -> QuickStats {
    QuickStats {
        total_attempts: attempt_count(attempts),
        average_time: average_time(attempts),
    }
}

/// Completed attempts per durable start, as a percentage capped at 100.
///
/// Submissions that never recorded a start can push the raw ratio past 100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_rate(completed: u64, started: u64) -> f64 {
    if started == 0 {
        return 0.0;
    }
    (completed as f64 / started as f64 * 100.0).min(100.0)
}

/// Mean time taken in whole seconds (truncated); 0 without attempts.
#[must_use]
pub fn average_time(attempts: &[Attempt]) -> u32 {
    if attempts.is_empty() {
        return 0;
    }
    let total: u64 = attempts.iter().map(|a| u64::from(a.time_taken_secs)).sum();
    u32::try_from(total / attempts.len() as u64).unwrap_or(u32::MAX)
}

/// Attempts per UTC hour of day.
#[must_use]
pub fn hourly_activity(attempts: &[Attempt]) -> [u32; 24] {
    let mut hours = [0_u32; 24];
    for attempt in attempts {
        // hour() is always 0..=23
        hours[attempt.created_at.hour() as usize] += 1;
    }
    hours
}

/// Attempt counts for every score in `0..=max_score`.
#[must_use]
pub fn score_distribution(attempts: &[Attempt], max_score: u32) -> Vec<ScoreBucket> {
    (0..=max_score)
        .map(|score| ScoreBucket {
            score,
            count: u32::try_from(attempts.iter().filter(|a| a.score == score).count())
                .unwrap_or(u32::MAX),
            color: ScoreColor::from_score(score),
        })
        .collect()
}

fn most_correct(by_number: &[&Question]) -> Vec<QuestionRank> {
    let mut ranked = by_number.to_vec();
    // stable: ties stay in question-number order
    ranked.sort_by(|a, b| b.correct_count.cmp(&a.correct_count));
    ranked
        .into_iter()
        .take(TOP_QUESTIONS)
        .map(|q| QuestionRank {
            number: q.number,
            body: preview(&q.body),
            count: q.correct_count,
            percentage: round_tenth(q.correct_percentage()),
        })
        .collect()
}

fn most_wrong(by_number: &[&Question]) -> Vec<QuestionRank> {
    let mut ranked: Vec<&Question> = by_number
        .iter()
        .copied()
        .filter(|q| q.total_attempts > 0 && q.wrong_percentage() > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.wrong_percentage().total_cmp(&a.wrong_percentage()));
    ranked
        .into_iter()
        .take(TOP_QUESTIONS)
        .map(|q| QuestionRank {
            number: q.number,
            body: preview(&q.body),
            count: q.wrong_count(),
            percentage: round_tenth(q.wrong_percentage()),
        })
        .collect()
}

fn breakdown(question: &Question) -> QuestionBreakdown {
    let mut options: Vec<OptionBreakdown> = question
        .options
        .iter()
        .map(|o| OptionBreakdown {
            label: o.label,
            text: o.text.clone(),
            count: o.selection_count,
            percentage: round_tenth(question.selection_percentage(o)),
        })
        .collect();
    options.sort_by_key(|o| o.label);

    QuestionBreakdown {
        number: question.number,
        body: question.body.clone(),
        total_attempts: question.total_attempts,
        correct_count: question.correct_count,
        correct_percentage: round_tenth(question.correct_percentage()),
        correct_answer: question.correct_answer,
        options,
    }
}

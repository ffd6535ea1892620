use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AttemptId, OptionLabel, QuestionId, StartId};

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One completed quiz submission.
///
/// `score` always equals the number of correct responses recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub ip_address: String,
    pub score: u32,
    pub time_taken_secs: u32,
    pub created_at: DateTime<Utc>,
}

/// One answered question within an attempt. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub attempt_id: AttemptId,
    pub question_id: QuestionId,
    pub selected: OptionLabel,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

/// Durable record of a client opening the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizStart {
    pub id: StartId,
    pub ip_address: String,
    pub started_at: DateTime<Utc>,
}

impl QuizStart {
    /// Whole seconds between the start and `now`, never negative.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        let secs = (now - self.started_at).num_seconds().max(0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

//
// ─── SCORE COLOR ───────────────────────────────────────────────────────────────
//

/// Presentation band for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreColor {
    Red,
    Orange,
    Green,
}

impl ScoreColor {
    /// `<= 3` red, `4..=6` orange, `>= 7` green.
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=3 => Self::Red,
            4..=6 => Self::Orange,
            _ => Self::Green,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }
}

use serde::Serialize;

use crate::model::{OptionLabel, QuestionId};

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

/// One labeled answer choice of a stored question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    pub label: OptionLabel,
    pub text: String,
    /// Cached count of responses that selected this label.
    pub selection_count: u32,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A stored question with its options (ordered by label) and cached counters.
///
/// `total_attempts` and `correct_count` are a denormalization of the
/// response history; `crate::reconcile` recomputes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub number: u32,
    pub body: String,
    pub correct_answer: OptionLabel,
    pub total_attempts: u32,
    pub correct_count: u32,
    pub options: Vec<QuizOption>,
}

impl Question {
    /// Returns true if `selected` is this question's correct label.
    #[must_use]
    pub fn is_correct(&self, selected: OptionLabel) -> bool {
        self.correct_answer == selected
    }

    #[must_use]
    pub fn option(&self, label: OptionLabel) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.label == label)
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.total_attempts.saturating_sub(self.correct_count)
    }

    /// Correct answers as a percentage of all attempts; 0 without attempts.
    #[must_use]
    pub fn correct_percentage(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.total_attempts) * 100.0
    }

    /// `100 - correct_percentage`; 0 without attempts.
    #[must_use]
    pub fn wrong_percentage(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        100.0 - self.correct_percentage()
    }

    /// Share of this question's attempts that picked `option`.
    #[must_use]
    pub fn selection_percentage(&self, option: &QuizOption) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        f64::from(option.selection_count) / f64::from(self.total_attempts) * 100.0
    }

    /// True when the correct label names exactly one of the options.
    ///
    /// Questions imported from a record with missing options may violate
    /// this until the document is re-uploaded.
    #[must_use]
    pub fn has_consistent_answer_key(&self) -> bool {
        self.options
            .iter()
            .filter(|o| o.label == self.correct_answer)
            .count()
            == 1
    }
}

use serde::Serialize;

use crate::model::{Attempt, AttemptId, OptionLabel, Question, QuestionId, ScoreColor};

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// A submitted entry that could not be interpreted and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedAnswer {
    QuestionId(String),
    Label { question_id: QuestionId, raw: String },
}

/// Normalized submission: question id to selected label, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: Vec<(QuestionId, OptionLabel)>,
    skipped: Vec<SkippedAnswer>,
}

impl AnswerSheet {
    /// Normalizes raw `(question id, label)` pairs.
    ///
    /// Labels are case-insensitive. A repeated question id keeps the last
    /// selection. Entries with an unparsable id or label are set aside in
    /// `skipped` rather than rejected. A label outside A..D such as `E` is
    /// therefore never graded: it is not stored as a wrong response and does
    /// not count toward the question's attempts.
    pub fn from_raw<I, K, V>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut sheet = Self::default();
        for (key, value) in raw {
            let Ok(question_id) = key.as_ref().parse::<QuestionId>() else {
                sheet
                    .skipped
                    .push(SkippedAnswer::QuestionId(key.as_ref().to_owned()));
                continue;
            };
            let Ok(label) = value.as_ref().parse::<OptionLabel>() else {
                sheet.skipped.push(SkippedAnswer::Label {
                    question_id,
                    raw: value.as_ref().to_owned(),
                });
                continue;
            };
            sheet.insert(question_id, label);
        }
        sheet
    }

    pub fn insert(&mut self, question_id: QuestionId, label: OptionLabel) {
        match self.entries.iter_mut().find(|(id, _)| *id == question_id) {
            Some(entry) => entry.1 = label,
            None => self.entries.push((question_id, label)),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[(QuestionId, OptionLabel)] {
        &self.entries
    }

    #[must_use]
    pub fn skipped(&self) -> &[SkippedAnswer] {
        &self.skipped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//
// ─── GRADING ───────────────────────────────────────────────────────────────────
//

/// A single answer checked against its stored question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question: Question,
    pub selected: OptionLabel,
    pub is_correct: bool,
}

impl GradedAnswer {
    #[must_use]
    pub fn grade(question: Question, selected: OptionLabel) -> Self {
        let is_correct = question.is_correct(selected);
        Self {
            question,
            selected,
            is_correct,
        }
    }
}

/// Number of correct answers in one submission.
#[must_use]
pub fn score_of(graded: &[GradedAnswer]) -> u32 {
    let correct = graded.iter().filter(|g| g.is_correct).count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionOutcome {
    pub label: OptionLabel,
    pub text: String,
    pub is_selected: bool,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub question_number: u32,
    pub question_body: String,
    pub selected_option: OptionLabel,
    pub correct_option: OptionLabel,
    pub is_correct: bool,
    pub options: Vec<OptionOutcome>,
}

impl From<&GradedAnswer> for AnsweredQuestion {
    fn from(graded: &GradedAnswer) -> Self {
        let question = &graded.question;
        let mut options: Vec<OptionOutcome> = question
            .options
            .iter()
            .map(|o| OptionOutcome {
                label: o.label,
                text: o.text.clone(),
                is_selected: o.label == graded.selected,
                is_correct: o.label == question.correct_answer,
            })
            .collect();
        options.sort_by_key(|o| o.label);

        Self {
            question_id: question.id,
            question_number: question.number,
            question_body: question.body.clone(),
            selected_option: graded.selected,
            correct_option: question.correct_answer,
            is_correct: graded.is_correct,
            options,
        }
    }
}

/// What the client sees after submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub attempt_id: AttemptId,
    pub score: u32,
    pub total: u32,
    pub score_color: ScoreColor,
    pub time_taken: u32,
    pub responses: Vec<AnsweredQuestion>,
}

impl SubmissionResult {
    #[must_use]
    pub fn new(attempt: &Attempt, graded: &[GradedAnswer], total: u32) -> Self {
        Self {
            attempt_id: attempt.id,
            score: attempt.score,
            total,
            score_color: ScoreColor::from_score(attempt.score),
            time_taken: attempt.time_taken_secs,
            responses: graded.iter().map(AnsweredQuestion::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizOption;
    use crate::time::fixed_now;

    fn question(id: u64, answer: OptionLabel) -> Question {
        Question {
            id: QuestionId::new(id),
            number: u32::try_from(id).unwrap(),
            body: format!("Q{id}"),
            correct_answer: answer,
            total_attempts: 0,
            correct_count: 0,
            options: OptionLabel::ALL
                .iter()
                .rev()
                .map(|label| QuizOption {
                    label: *label,
                    text: format!("opt {label}"),
                    selection_count: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn sheet_normalizes_case_and_skips_garbage() {
        let sheet = AnswerSheet::from_raw([("1", "b"), ("x", "A"), ("2", "E"), ("3", " c ")]);
        assert_eq!(
            sheet.entries(),
            &[
                (QuestionId::new(1), OptionLabel::B),
                (QuestionId::new(3), OptionLabel::C)
            ]
        );
        assert_eq!(sheet.skipped().len(), 2);
        assert!(matches!(&sheet.skipped()[0], SkippedAnswer::QuestionId(raw) if raw == "x"));
    }

    #[test]
    fn sheet_keeps_last_selection_for_repeated_id() {
        let sheet = AnswerSheet::from_raw([("1", "a"), ("01", "d")]);
        assert_eq!(sheet.entries(), &[(QuestionId::new(1), OptionLabel::D)]);
    }

    #[test]
    fn score_counts_correct_answers() {
        let graded = vec![
            GradedAnswer::grade(question(1, OptionLabel::B), OptionLabel::B),
            GradedAnswer::grade(question(2, OptionLabel::A), OptionLabel::C),
            GradedAnswer::grade(question(3, OptionLabel::D), OptionLabel::D),
        ];
        assert_eq!(score_of(&graded), 2);
    }

    #[test]
    fn result_flags_selected_and_correct_options_in_label_order() {
        let graded = vec![GradedAnswer::grade(
            question(1, OptionLabel::B),
            OptionLabel::C,
        )];
        let attempt = Attempt {
            id: AttemptId::new(9),
            ip_address: "127.0.0.1".into(),
            score: score_of(&graded),
            time_taken_secs: 42,
            created_at: fixed_now(),
        };

        let result = SubmissionResult::new(&attempt, &graded, 10);
        assert_eq!(result.score, 0);
        assert_eq!(result.total, 10);
        assert_eq!(result.score_color, ScoreColor::Red);
        assert_eq!(result.time_taken, 42);

        let answered = &result.responses[0];
        assert!(!answered.is_correct);
        let labels: Vec<_> = answered.options.iter().map(|o| o.label).collect();
        assert_eq!(labels, OptionLabel::ALL.to_vec());
        assert!(answered.options[1].is_correct && !answered.options[1].is_selected);
        assert!(answered.options[2].is_selected && !answered.options[2].is_correct);
    }
}

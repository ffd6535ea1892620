//! Counter reconciliation.
//!
//! Question and option counters and attempt scores are cached aggregates
//! of the response history. They must always equal a recomputation from
//! that history; [`find_drift`] reports every place where they do not.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::{Attempt, AttemptId, OptionLabel, Question, QuestionId, Response};

/// A cached counter that disagrees with the response history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CounterDrift {
    QuestionTotal {
        number: u32,
        stored: u32,
        expected: u32,
    },
    QuestionCorrect {
        number: u32,
        stored: u32,
        expected: u32,
    },
    OptionSelection {
        number: u32,
        label: OptionLabel,
        stored: u32,
        expected: u32,
    },
    AttemptScore {
        attempt_id: AttemptId,
        stored: u32,
        expected: u32,
    },
}

impl fmt::Display for CounterDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterDrift::QuestionTotal {
                number,
                stored,
                expected,
            } => write!(
                f,
                "Question {number} total attempts is {stored}, responses say {expected}"
            ),
            CounterDrift::QuestionCorrect {
                number,
                stored,
                expected,
            } => write!(
                f,
                "Question {number} correct count is {stored}, responses say {expected}"
            ),
            CounterDrift::OptionSelection {
                number,
                label,
                stored,
                expected,
            } => write!(
                f,
                "Question {number} option {label} selection count is {stored}, responses say {expected}"
            ),
            CounterDrift::AttemptScore {
                attempt_id,
                stored,
                expected,
            } => write!(
                f,
                "Attempt {attempt_id} score is {stored}, responses say {expected}"
            ),
        }
    }
}

#[derive(Default)]
struct Tally {
    total: u32,
    correct: u32,
    by_label: HashMap<OptionLabel, u32>,
}

/// Compares every cached counter with a recount of `responses`.
#[must_use]
pub fn find_drift(
    questions: &[Question],
    attempts: &[Attempt],
    responses: &[Response],
) -> Vec<CounterDrift> {
    let mut per_question: HashMap<QuestionId, Tally> = HashMap::new();
    let mut per_attempt: HashMap<AttemptId, u32> = HashMap::new();

    for response in responses {
        let tally = per_question.entry(response.question_id).or_default();
        tally.total += 1;
        *tally.by_label.entry(response.selected).or_default() += 1;
        if response.is_correct {
            tally.correct += 1;
            *per_attempt.entry(response.attempt_id).or_default() += 1;
        }
    }

    let empty = Tally::default();
    let mut drift = Vec::new();

    for question in questions {
        let tally = per_question.get(&question.id).unwrap_or(&empty);
        if question.total_attempts != tally.total {
            drift.push(CounterDrift::QuestionTotal {
                number: question.number,
                stored: question.total_attempts,
                expected: tally.total,
            });
        }
        if question.correct_count != tally.correct {
            drift.push(CounterDrift::QuestionCorrect {
                number: question.number,
                stored: question.correct_count,
                expected: tally.correct,
            });
        }
        for option in &question.options {
            let expected = tally.by_label.get(&option.label).copied().unwrap_or(0);
            if option.selection_count != expected {
                drift.push(CounterDrift::OptionSelection {
                    number: question.number,
                    label: option.label,
                    stored: option.selection_count,
                    expected,
                });
            }
        }
    }

    for attempt in attempts {
        let expected = per_attempt.get(&attempt.id).copied().unwrap_or(0);
        if attempt.score != expected {
            drift.push(CounterDrift::AttemptScore {
                attempt_id: attempt.id,
                stored: attempt.score,
                expected,
            });
        }
    }

    drift
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizOption;
    use crate::time::fixed_now;

    fn question(id: u64, total: u32, correct: u32, selections: [u32; 4]) -> Question {
        Question {
            id: QuestionId::new(id),
            number: u32::try_from(id).unwrap(),
            body: "Q".into(),
            correct_answer: OptionLabel::B,
            total_attempts: total,
            correct_count: correct,
            options: OptionLabel::ALL
                .iter()
                .zip(selections)
                .map(|(label, selection_count)| QuizOption {
                    label: *label,
                    text: label.to_string(),
                    selection_count,
                })
                .collect(),
        }
    }

    fn response(attempt: u64, question: u64, selected: OptionLabel) -> Response {
        Response {
            attempt_id: AttemptId::new(attempt),
            question_id: QuestionId::new(question),
            selected,
            is_correct: selected == OptionLabel::B,
            created_at: fixed_now(),
        }
    }

    fn attempt(id: u64, score: u32) -> Attempt {
        Attempt {
            id: AttemptId::new(id),
            ip_address: "127.0.0.1".into(),
            score,
            time_taken_secs: 0,
            created_at: fixed_now(),
        }
    }

    #[test]
    fn consistent_counters_report_nothing() {
        let questions = vec![question(1, 2, 1, [0, 1, 1, 0])];
        let responses = vec![
            response(1, 1, OptionLabel::B),
            response(2, 1, OptionLabel::C),
        ];
        let attempts = vec![attempt(1, 1), attempt(2, 0)];
        assert!(find_drift(&questions, &attempts, &responses).is_empty());
    }

    #[test]
    fn every_kind_of_drift_is_reported() {
        let questions = vec![question(1, 3, 0, [0, 0, 2, 0])];
        let responses = vec![
            response(1, 1, OptionLabel::B),
            response(2, 1, OptionLabel::C),
        ];
        let attempts = vec![attempt(1, 0), attempt(2, 0)];

        let drift = find_drift(&questions, &attempts, &responses);
        assert_eq!(
            drift,
            vec![
                CounterDrift::QuestionTotal {
                    number: 1,
                    stored: 3,
                    expected: 2
                },
                CounterDrift::QuestionCorrect {
                    number: 1,
                    stored: 0,
                    expected: 1
                },
                CounterDrift::OptionSelection {
                    number: 1,
                    label: OptionLabel::B,
                    stored: 0,
                    expected: 1
                },
                CounterDrift::OptionSelection {
                    number: 1,
                    label: OptionLabel::C,
                    stored: 2,
                    expected: 1
                },
                CounterDrift::AttemptScore {
                    attempt_id: AttemptId::new(1),
                    stored: 0,
                    expected: 1
                },
            ]
        );
        assert_eq!(
            drift[0].to_string(),
            "Question 1 total attempts is 3, responses say 2"
        );
    }
}

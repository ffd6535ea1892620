use chrono::{DateTime, Utc};
use quiz_core::model::{
    Attempt, AttemptId, OptionLabel, Question, QuestionId, QuizOption, QuizStart, Response,
    StartId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(super) fn connection<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(super) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(super) fn count_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    i64_to_u64(field, v)
}

pub(super) fn count_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    i64_to_u32(field, v)
}

pub(super) fn parse_label(s: &str) -> Result<OptionLabel, StorageError> {
    s.parse::<OptionLabel>()
        .map_err(|_| StorageError::Serialization(format!("invalid label: {s}")))
}

/// Maps a `questions` row; options are attached by the caller.
pub(super) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let number: i64 = row.try_get("number").map_err(ser)?;
    let correct: String = row.try_get("correct_answer").map_err(ser)?;
    let total_attempts: i64 = row.try_get("total_attempts").map_err(ser)?;
    let correct_count: i64 = row.try_get("correct_count").map_err(ser)?;

    Ok(Question {
        id: QuestionId::new(i64_to_u64("question_id", id)?),
        number: i64_to_u32("number", number)?,
        body: row.try_get("body").map_err(ser)?,
        correct_answer: parse_label(&correct)?,
        total_attempts: i64_to_u32("total_attempts", total_attempts)?,
        correct_count: i64_to_u32("correct_count", correct_count)?,
        options: Vec::new(),
    })
}

/// Maps an `options` row into its owning question id and the option.
pub(super) fn map_option_row(row: &SqliteRow) -> Result<(QuestionId, QuizOption), StorageError> {
    let question_id: i64 = row.try_get("question_id").map_err(ser)?;
    let label: String = row.try_get("label").map_err(ser)?;
    let selection_count: i64 = row.try_get("selection_count").map_err(ser)?;

    Ok((
        QuestionId::new(i64_to_u64("question_id", question_id)?),
        QuizOption {
            label: parse_label(&label)?,
            text: row.try_get("text").map_err(ser)?,
            selection_count: i64_to_u32("selection_count", selection_count)?,
        },
    ))
}

pub(super) fn map_attempt_row(row: &SqliteRow) -> Result<Attempt, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let score: i64 = row.try_get("score").map_err(ser)?;
    let time_taken: i64 = row.try_get("time_taken").map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    Ok(Attempt {
        id: AttemptId::new(i64_to_u64("attempt_id", id)?),
        ip_address: row.try_get("ip_address").map_err(ser)?,
        score: i64_to_u32("score", score)?,
        time_taken_secs: i64_to_u32("time_taken", time_taken)?,
        created_at,
    })
}

pub(super) fn map_response_row(row: &SqliteRow) -> Result<Response, StorageError> {
    let attempt_id: i64 = row.try_get("attempt_id").map_err(ser)?;
    let question_id: i64 = row.try_get("question_id").map_err(ser)?;
    let selected: String = row.try_get("selected_label").map_err(ser)?;
    let is_correct: bool = row.try_get("is_correct").map_err(ser)?;

    Ok(Response {
        attempt_id: AttemptId::new(i64_to_u64("attempt_id", attempt_id)?),
        question_id: QuestionId::new(i64_to_u64("question_id", question_id)?),
        selected: parse_label(&selected)?,
        is_correct,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(super) fn map_start_row(row: &SqliteRow) -> Result<QuizStart, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;

    Ok(QuizStart {
        id: StartId::new(i64_to_u64("start_id", id)?),
        ip_address: row.try_get("ip_address").map_err(ser)?,
        started_at: row.try_get("started_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_labels() {
        assert!(matches!(parse_label("E"), Err(StorageError::Serialization(_))));
        assert_eq!(parse_label("c").unwrap(), OptionLabel::C);
    }

    #[test]
    fn negative_counts_are_serialization_errors() {
        let err = count_u32("total_attempts", -1).unwrap_err();
        assert_eq!(err.to_string(), "serialization error: invalid total_attempts: -1");
    }
}

use std::collections::HashMap;

use quiz_core::model::{Question, QuestionId, QuizOption, SaveReport};
use quiz_core::parser::ParsedQuestion;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, warn};

use super::SqliteRepository;
use super::mapping::{connection, count_u32, map_option_row, map_question_row, ser};
use crate::repository::{QuestionRepository, StorageError};

/// Loads one question with its options on an existing connection.
pub(super) async fn fetch_question(
    conn: &mut SqliteConnection,
    id: QuestionId,
) -> Result<Option<Question>, StorageError> {
    // ids beyond the rowid range cannot exist
    let Ok(id_value) = i64::try_from(id.value()) else {
        return Ok(None);
    };
    let row = sqlx::query(
        r"
        SELECT id, number, body, correct_answer, total_attempts, correct_count
        FROM questions
        WHERE id = ?1
        ",
    )
    .bind(id_value)
    .fetch_optional(&mut *conn)
    .await
    .map_err(connection)?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut question = map_question_row(&row)?;

    let option_rows = sqlx::query(
        r"
        SELECT question_id, label, text, selection_count
        FROM options
        WHERE question_id = ?1
        ORDER BY label ASC
        ",
    )
    .bind(id_value)
    .fetch_all(&mut *conn)
    .await
    .map_err(connection)?;

    for row in option_rows {
        let (_, option) = map_option_row(&row)?;
        question.options.push(option);
    }
    Ok(Some(question))
}

/// Upserts a single record by question number, then its options by label.
async fn save_record(
    conn: &mut SqliteConnection,
    record: &ParsedQuestion,
) -> Result<(), StorageError> {
    let answer = record
        .answer
        .ok_or_else(|| StorageError::InvalidRecord("missing correct answer".into()))?;

    let row = sqlx::query(
        r"
        INSERT INTO questions (number, body, correct_answer)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(number) DO UPDATE SET
            body = excluded.body,
            correct_answer = excluded.correct_answer
        RETURNING id
        ",
    )
    .bind(i64::from(record.number))
    .bind(record.body.as_str())
    .bind(answer.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(connection)?;
    let question_id: i64 = row.try_get("id").map_err(ser)?;

    for (label, text) in &record.options {
        // counters survive a re-import; only the wording changes
        sqlx::query(
            r"
            INSERT INTO options (question_id, label, text)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(question_id, label) DO UPDATE SET
                text = excluded.text
            ",
        )
        .bind(question_id)
        .bind(label.as_str())
        .bind(text.as_str())
        .execute(&mut *conn)
        .await
        .map_err(connection)?;
    }

    Ok(())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let question_rows = sqlx::query(
            r"
            SELECT id, number, body, correct_answer, total_attempts, correct_count
            FROM questions
            ORDER BY number ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?;

        let option_rows = sqlx::query(
            r"
            SELECT question_id, label, text, selection_count
            FROM options
            ORDER BY question_id ASC, label ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?;

        let mut options: HashMap<QuestionId, Vec<QuizOption>> = HashMap::new();
        for row in option_rows {
            let (question_id, option) = map_option_row(&row)?;
            options.entry(question_id).or_default().push(option);
        }

        question_rows
            .iter()
            .map(|row| {
                let mut question = map_question_row(row)?;
                question.options = options.remove(&question.id).unwrap_or_default();
                Ok(question)
            })
            .collect()
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(connection)?;
        fetch_question(&mut conn, id).await
    }

    async fn count_questions(&self) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(connection)?;
        count_u32("question count", count)
    }

    async fn save_parsed(&self, records: &[ParsedQuestion]) -> Result<SaveReport, StorageError> {
        let mut report = SaveReport::new();
        let mut tx = self.pool.begin().await.map_err(connection)?;

        for record in records {
            let mut savepoint = sqlx::Connection::begin(&mut *tx)
                .await
                .map_err(connection)?;

            let saved = match save_record(&mut savepoint, record).await {
                Ok(()) => savepoint.commit().await.map_err(connection),
                Err(err) => {
                    if let Err(rollback) = savepoint.rollback().await {
                        warn!(number = record.number, error = %rollback, "savepoint rollback failed");
                    }
                    Err(err)
                }
            };

            match saved {
                Ok(()) => report.record_success(),
                Err(err) => {
                    warn!(number = record.number, error = %err, "question not saved");
                    report.record_failure(record.number, err);
                }
            }
        }

        if let Err(err) = tx.commit().await {
            warn!(error = %err, "import commit failed");
            report.commit_failed(records.len(), err);
        }

        debug!(
            succeeded = report.succeeded,
            failed = report.failed,
            "question batch saved"
        );
        Ok(report)
    }
}

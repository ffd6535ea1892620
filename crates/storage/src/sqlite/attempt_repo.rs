use quiz_core::model::{Attempt, AttemptId, GradedAnswer, Response, score_of};
use sqlx::Row;
use tracing::{debug, warn};

use super::SqliteRepository;
use super::mapping::{connection, id_i64, map_attempt_row, map_response_row, ser};
use super::question_repo::fetch_question;
use crate::repository::{AttemptRepository, NewSubmission, RecordedSubmission, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn first_attempt_from(&self, ip_address: &str) -> Result<Option<Attempt>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, ip_address, score, time_taken, created_at
            FROM attempts
            WHERE ip_address = ?1
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(ip_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(connection)?;

        row.as_ref().map(map_attempt_row).transpose()
    }

    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<RecordedSubmission, StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection)?;

        // score is filled in once every answer has been graded
        let row = sqlx::query(
            r"
            INSERT INTO attempts (ip_address, score, time_taken, created_at)
            SELECT ?1, 0, ?2, ?3
            WHERE ?4 = 0 OR NOT EXISTS (SELECT 1 FROM attempts WHERE ip_address = ?1)
            RETURNING id
            ",
        )
        .bind(submission.ip_address.as_str())
        .bind(i64::from(submission.time_taken_secs))
        .bind(submission.created_at)
        .bind(submission.once_per_address)
        .fetch_optional(&mut *tx)
        .await
        .map_err(connection)?;
        let Some(row) = row else {
            debug!(ip = %submission.ip_address, "address already has an attempt");
            return Err(StorageError::Conflict);
        };
        let attempt_id: i64 = row.try_get("id").map_err(ser)?;

        let mut graded: Vec<GradedAnswer> = Vec::with_capacity(submission.answers.entries().len());
        for &(question_id, selected) in submission.answers.entries() {
            let Some(question) = fetch_question(&mut tx, question_id).await? else {
                warn!(question_id = %question_id, "answer for unknown question skipped");
                continue;
            };
            let answer = GradedAnswer::grade(question, selected);
            let question_row = id_i64("question_id", answer.question.id.value())?;

            sqlx::query(
                r"
                UPDATE questions
                SET total_attempts = total_attempts + 1,
                    correct_count = correct_count + ?2
                WHERE id = ?1
                ",
            )
            .bind(question_row)
            .bind(i64::from(answer.is_correct))
            .execute(&mut *tx)
            .await
            .map_err(connection)?;

            let updated = sqlx::query(
                r"
                UPDATE options
                SET selection_count = selection_count + 1
                WHERE question_id = ?1 AND label = ?2
                ",
            )
            .bind(question_row)
            .bind(selected.as_str())
            .execute(&mut *tx)
            .await
            .map_err(connection)?;
            if updated.rows_affected() == 0 {
                debug!(question_id = %question_id, label = %selected, "selected option has no row");
            }

            sqlx::query(
                r"
                INSERT INTO responses (attempt_id, question_id, selected_label, is_correct, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(attempt_id)
            .bind(question_row)
            .bind(selected.as_str())
            .bind(answer.is_correct)
            .bind(submission.created_at)
            .execute(&mut *tx)
            .await
            .map_err(connection)?;

            graded.push(answer);
        }

        let score = score_of(&graded);
        sqlx::query("UPDATE attempts SET score = ?2 WHERE id = ?1")
            .bind(attempt_id)
            .bind(i64::from(score))
            .execute(&mut *tx)
            .await
            .map_err(connection)?;

        tx.commit().await.map_err(connection)?;

        let attempt = Attempt {
            id: AttemptId::new(
                u64::try_from(attempt_id)
                    .map_err(|_| StorageError::Serialization("attempt_id sign overflow".into()))?,
            ),
            ip_address: submission.ip_address,
            score,
            time_taken_secs: submission.time_taken_secs,
            created_at: submission.created_at,
        };
        debug!(attempt_id = %attempt.id, score, answered = graded.len(), "submission recorded");
        Ok(RecordedSubmission { attempt, graded })
    }

    async fn list_attempts(&self) -> Result<Vec<Attempt>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, ip_address, score, time_taken, created_at
            FROM attempts
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?;

        rows.iter().map(map_attempt_row).collect()
    }

    async fn list_responses(&self) -> Result<Vec<Response>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT attempt_id, question_id, selected_label, is_correct, created_at
            FROM responses
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?;

        rows.iter().map(map_response_row).collect()
    }
}

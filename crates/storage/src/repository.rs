use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerSheet, Attempt, GradedAnswer, Question, QuestionId, QuizStart, Response, SaveReport,
    StartId,
};
use quiz_core::parser::ParsedQuestion;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Everything needed to store one quiz submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub ip_address: String,
    pub time_taken_secs: u32,
    pub created_at: DateTime<Utc>,
    pub answers: AnswerSheet,
    /// Refuse the submission if `ip_address` already has an attempt.
    pub once_per_address: bool,
}

/// The stored attempt plus every answer that matched a known question.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub attempt: Attempt,
    pub graded: Vec<GradedAnswer>,
}

/// Questions and their options.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// All questions ordered by number, each with options ordered by label.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Fetch a question (with options) by storage id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the count cannot be read.
    async fn count_questions(&self) -> Result<u32, StorageError>;

    /// Insert or update parsed records, matching existing questions by number.
    ///
    /// Each record is saved in its own savepoint; a failing record is
    /// reported in the returned `SaveReport` and does not stop the batch.
    /// All records are committed together; if that commit fails every
    /// record counts as failed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the batch cannot be started at all.
    async fn save_parsed(&self, records: &[ParsedQuestion]) -> Result<SaveReport, StorageError>;
}

/// Completed attempts and their responses.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// The earliest attempt recorded for `ip_address`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn first_attempt_from(&self, ip_address: &str) -> Result<Option<Attempt>, StorageError>;

    /// Grade and store a submission in one transaction.
    ///
    /// Unknown question ids are skipped. Counters are incremented in place.
    /// With `once_per_address` set, the address check and the attempt
    /// insert are a single statement, so concurrent submissions from one
    /// address cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if `once_per_address` is set and the
    /// address already has an attempt, or `StorageError` if any write fails;
    /// nothing is stored then.
    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<RecordedSubmission, StorageError>;

    /// All attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_attempts(&self) -> Result<Vec<Attempt>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_responses(&self) -> Result<Vec<Response>, StorageError>;
}

/// Durable "quiz started" events.
#[async_trait]
pub trait QuizStartRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the event cannot be stored.
    async fn record_start(
        &self,
        ip_address: &str,
        started_at: DateTime<Utc>,
    ) -> Result<QuizStart, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_start(&self, id: StartId) -> Result<Option<QuizStart>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the count cannot be read.
    async fn count_starts(&self) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait ResetRepository: Send + Sync {
    /// Delete every question, option, attempt, response and start event
    /// in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any delete fails; nothing is removed then.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub starts: Arc<dyn QuizStartRepository>,
    pub reset: Arc<dyn ResetRepository>,
}

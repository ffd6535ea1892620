use std::sync::Arc;

use quiz_core::model::{
    AnswerSheet, Attempt, OptionLabel, Question, QuestionId, QuizSettings, QuizStart,
    SkippedAnswer, StartId, SubmissionResult,
};
use serde::Serialize;
use storage::repository::{
    AttemptRepository, NewSubmission, QuestionRepository, QuizStartRepository, StorageError,
};
use tracing::{info, warn};

use crate::Clock;
use crate::error::QuizError;

/// A question as handed to someone taking the quiz: no answer key, no counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub number: u32,
    pub body: String,
    pub options: Vec<(OptionLabel, String)>,
}

impl From<&Question> for QuizQuestion {
    fn from(question: &Question) -> Self {
        let mut options: Vec<(OptionLabel, String)> = question
            .options
            .iter()
            .map(|o| (o.label, o.text.clone()))
            .collect();
        options.sort_by_key(|(label, _)| *label);
        Self {
            id: question.id,
            number: question.number,
            body: question.body.clone(),
            options,
        }
    }
}

/// Returned by [`QuizService::start`]; the start id is passed back on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizTicket {
    pub start: QuizStart,
    pub questions: Vec<QuizQuestion>,
}

/// Runs the quiz for one client address at a time.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    settings: QuizSettings,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    starts: Arc<dyn QuizStartRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        starts: Arc<dyn QuizStartRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            questions,
            attempts,
            starts,
        }
    }

    /// All questions with options, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn questions(&self) -> Result<Vec<Question>, QuizError> {
        Ok(self.questions.list_questions().await?)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn question_count(&self) -> Result<u32, QuizError> {
        Ok(self.questions.count_questions().await?)
    }

    /// The earliest attempt from `ip_address` when the IP lock is on.
    ///
    /// Always `None` with the lock off.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn has_completed(&self, ip_address: &str) -> Result<Option<Attempt>, QuizError> {
        if !self.settings.ip_lock_enabled() {
            return Ok(None);
        }
        Ok(self.attempts.first_attempt_from(ip_address).await?)
    }

    async fn ensure_not_completed(&self, ip_address: &str) -> Result<(), QuizError> {
        if let Some(attempt) = self.has_completed(ip_address).await? {
            warn!(ip = ip_address, attempt_id = %attempt.id, "quiz already completed");
            return Err(QuizError::AlreadyCompleted);
        }
        Ok(())
    }

    /// Records a durable start event and returns the questions to answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyCompleted` if the IP lock applies,
    /// `QuizError::NoQuestions` if nothing has been imported yet, or
    /// `QuizError::Storage` if repository access fails.
    pub async fn start(&self, ip_address: &str) -> Result<QuizTicket, QuizError> {
        self.ensure_not_completed(ip_address).await?;

        let questions = self.questions.list_questions().await?;
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let start = self
            .starts
            .record_start(ip_address, self.clock.now())
            .await?;
        info!(ip = ip_address, start_id = %start.id, "quiz started");

        Ok(QuizTicket {
            start,
            questions: questions.iter().map(QuizQuestion::from).collect(),
        })
    }

    /// Grades and stores a submission.
    ///
    /// Time taken is measured from the referenced start event when it exists
    /// and belongs to the same address; otherwise it is 0.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyCompleted` if the IP lock applies, or
    /// `QuizError::Storage` if repository access fails.
    pub async fn submit(
        &self,
        ip_address: &str,
        start_id: Option<StartId>,
        answers: AnswerSheet,
    ) -> Result<SubmissionResult, QuizError> {
        self.ensure_not_completed(ip_address).await?;

        for skipped in answers.skipped() {
            match skipped {
                SkippedAnswer::QuestionId(raw) => {
                    warn!(ip = ip_address, key = %raw, "answer with invalid question id skipped");
                }
                SkippedAnswer::Label { question_id, raw } => {
                    warn!(ip = ip_address, question_id = %question_id, label = %raw, "answer with invalid label skipped");
                }
            }
        }

        let now = self.clock.now();
        let time_taken_secs = match start_id {
            Some(id) => match self.starts.get_start(id).await? {
                Some(start) if start.ip_address == ip_address => start.elapsed_secs(now),
                Some(_) => {
                    warn!(ip = ip_address, start_id = %id, "start belongs to another address");
                    0
                }
                None => {
                    warn!(ip = ip_address, start_id = %id, "unknown start id");
                    0
                }
            },
            None => 0,
        };

        let recorded = self
            .attempts
            .record_submission(NewSubmission {
                ip_address: ip_address.to_owned(),
                time_taken_secs,
                created_at: now,
                answers,
                once_per_address: self.settings.ip_lock_enabled(),
            })
            .await
            .map_err(|err| match err {
                // another submission from this address won the race
                StorageError::Conflict => QuizError::AlreadyCompleted,
                other => QuizError::Storage(other),
            })?;

        info!(
            ip = ip_address,
            attempt_id = %recorded.attempt.id,
            score = recorded.attempt.score,
            time_taken = time_taken_secs,
            "quiz submitted"
        );
        Ok(SubmissionResult::new(
            &recorded.attempt,
            &recorded.graded,
            self.settings.questions_per_quiz(),
        ))
    }
}

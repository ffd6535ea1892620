use std::sync::Arc;

use quiz_core::reconcile::{CounterDrift, find_drift};
use quiz_core::stats::{Dashboard, QuickStats, quick_stats};
use storage::repository::{AttemptRepository, QuestionRepository, QuizStartRepository};
use tracing::warn;

use crate::error::ServiceError;

/// Read-only statistics for the administrator.
#[derive(Clone)]
pub struct DashboardService {
    max_score: u32,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    starts: Arc<dyn QuizStartRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        max_score: u32,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        starts: Arc<dyn QuizStartRepository>,
    ) -> Self {
        Self {
            max_score,
            questions,
            attempts,
            starts,
        }
    }

    /// Recomputes the full dashboard from stored counters and history.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if repository access fails.
    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let questions = self.questions.list_questions().await?;
        let attempts = self.attempts.list_attempts().await?;
        let starts = self.starts.count_starts().await?;
        Ok(Dashboard::compute(
            &questions,
            &attempts,
            starts,
            self.max_score,
        ))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if repository access fails.
    pub async fn quick_stats(&self) -> Result<QuickStats, ServiceError> {
        let attempts = self.attempts.list_attempts().await?;
        Ok(quick_stats(&attempts))
    }

    /// Lists every cached counter that disagrees with the response history.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if repository access fails.
    pub async fn check_counters(&self) -> Result<Vec<CounterDrift>, ServiceError> {
        let questions = self.questions.list_questions().await?;
        let attempts = self.attempts.list_attempts().await?;
        let responses = self.attempts.list_responses().await?;

        let drift = find_drift(&questions, &attempts, &responses);
        for entry in &drift {
            warn!(%entry, "counter drift");
        }
        Ok(drift)
    }
}

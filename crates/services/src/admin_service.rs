use std::sync::Arc;

use serde::Serialize;
use storage::repository::{AttemptRepository, ResetRepository};
use tracing::{error, info};

use crate::error::ServiceError;

const EXPORT_HEADER: [&str; 4] = ["IP Address", "Score", "Time Taken (s)", "Timestamp"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a full reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub success: bool,
    pub errors: Vec<String>,
}

impl ClearReport {
    #[must_use]
    pub fn message(&self) -> String {
        if self.success {
            "All quiz data cleared successfully".to_string()
        } else {
            format!("Error clearing data: {}", self.errors.join("; "))
        }
    }
}

/// Export and reset operations.
#[derive(Clone)]
pub struct AdminService {
    attempts: Arc<dyn AttemptRepository>,
    reset: Arc<dyn ResetRepository>,
}

impl AdminService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>, reset: Arc<dyn ResetRepository>) -> Self {
        Self { attempts, reset }
    }

    /// Every attempt as CSV, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if attempts cannot be read, or
    /// `ServiceError::Export` if the CSV cannot be written.
    pub async fn export_csv(&self) -> Result<String, ServiceError> {
        let attempts = self.attempts.list_attempts().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(EXPORT_HEADER)
            .map_err(|e| ServiceError::Export(e.to_string()))?;
        for attempt in &attempts {
            writer
                .write_record([
                    attempt.ip_address.clone(),
                    attempt.score.to_string(),
                    attempt.time_taken_secs.to_string(),
                    attempt.created_at.format(TIMESTAMP_FORMAT).to_string(),
                ])
                .map_err(|e| ServiceError::Export(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ServiceError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ServiceError::Export(e.to_string()))
    }

    /// Deletes all questions, options, attempts, responses and start events.
    ///
    /// Never fails; storage errors are reported in the returned value.
    pub async fn clear_all(&self) -> ClearReport {
        match self.reset.clear_all().await {
            Ok(()) => {
                info!("quiz data reset");
                ClearReport {
                    success: true,
                    errors: Vec::new(),
                }
            }
            Err(err) => {
                error!(error = %err, "quiz data reset failed");
                ClearReport {
                    success: false,
                    errors: vec![err.to_string()],
                }
            }
        }
    }
}

use serde::Serialize;

/// Outcome of persisting a batch of parsed questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl SaveReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, number: u32, cause: impl std::fmt::Display) {
        self.failed += 1;
        self.errors
            .push(format!("Error saving Question {number}: {cause}"));
    }

    /// The final commit failed: nothing was written, so every record counts as failed.
    pub fn commit_failed(&mut self, total: usize, cause: impl std::fmt::Display) {
        self.errors.push(format!("Database commit error: {cause}"));
        self.failed = total;
        self.succeeded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_failure_overrides_per_record_successes() {
        let mut report = SaveReport::new();
        report.record_success();
        report.record_success();
        report.record_failure(3, "missing correct answer");
        report.commit_failed(3, "disk I/O error");

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 3);
        assert_eq!(
            report.errors,
            vec![
                "Error saving Question 3: missing correct answer".to_string(),
                "Database commit error: disk I/O error".to_string(),
            ]
        );
    }
}

use std::path::Path;
use std::sync::Arc;

use quiz_core::model::{QuizSettings, SaveReport};
use quiz_core::parser::{ParseOutcome, parse_paragraphs};
use serde::Serialize;
use storage::repository::QuestionRepository;
use tracing::{info, warn};

use crate::document;

/// How many parse or save errors are quoted in the import message.
const QUOTED_ERRORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Warning,
    Error,
}

/// Result of one document upload, ready to show to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub status: ImportStatus,
    pub message: String,
    pub imported: usize,
    pub failed: usize,
    pub parse_errors: Vec<String>,
    pub save_errors: Vec<String>,
}

impl ImportReport {
    fn nothing_found(parse_errors: Vec<String>) -> Self {
        Self {
            status: ImportStatus::Error,
            message: format!(
                "No questions found in document. Errors: {}",
                parse_errors.join("; ")
            ),
            imported: 0,
            failed: 0,
            parse_errors,
            save_errors: Vec::new(),
        }
    }

    fn from_save(parse_errors: Vec<String>, saved: SaveReport) -> Self {
        let mut parts = Vec::new();
        if saved.succeeded > 0 {
            parts.push(format!("Successfully imported {} questions", saved.succeeded));
        }
        if saved.failed > 0 {
            parts.push(format!("Failed to import {} questions", saved.failed));
        }
        if !parse_errors.is_empty() {
            parts.push(format!("Parse errors: {}", quoted(&parse_errors)));
        }
        if !saved.errors.is_empty() {
            parts.push(format!("Save errors: {}", quoted(&saved.errors)));
        }

        Self {
            status: if saved.failed == 0 {
                ImportStatus::Success
            } else {
                ImportStatus::Warning
            },
            message: parts.join("; "),
            imported: saved.succeeded,
            failed: saved.failed,
            parse_errors,
            save_errors: saved.errors,
        }
    }
}

fn quoted(errors: &[String]) -> String {
    errors
        .iter()
        .take(QUOTED_ERRORS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parses uploaded documents and upserts their questions.
#[derive(Clone)]
pub struct ImportService {
    settings: QuizSettings,
    questions: Arc<dyn QuestionRepository>,
}

impl ImportService {
    #[must_use]
    pub fn new(settings: QuizSettings, questions: Arc<dyn QuestionRepository>) -> Self {
        Self {
            settings,
            questions,
        }
    }

    /// Whether an upload with this file name is accepted.
    #[must_use]
    pub fn allowed_file(&self, filename: &str) -> bool {
        self.settings.allows_file(filename)
    }

    /// Reads, parses and saves a document. Failures are reported, never raised.
    pub async fn import_file(&self, path: &Path) -> ImportReport {
        let outcome = match document::load_paragraphs(path, &self.settings) {
            Ok(paragraphs) => parse_paragraphs(paragraphs),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "document could not be read");
                ParseOutcome::unreadable(err)
            }
        };
        self.import_outcome(outcome).await
    }

    /// Parses and saves already-extracted paragraphs.
    pub async fn import_paragraphs<I, S>(&self, paragraphs: I) -> ImportReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.import_outcome(parse_paragraphs(paragraphs)).await
    }

    async fn import_outcome(&self, outcome: ParseOutcome) -> ImportReport {
        let parse_errors = outcome.errors();
        if outcome.questions.is_empty() {
            warn!(errors = parse_errors.len(), "no questions found in document");
            return ImportReport::nothing_found(parse_errors);
        }

        let saved = match self.questions.save_parsed(&outcome.questions).await {
            Ok(saved) => saved,
            Err(err) => {
                let mut failed = SaveReport::new();
                failed.commit_failed(outcome.questions.len(), err);
                failed
            }
        };

        info!(
            imported = saved.succeeded,
            failed = saved.failed,
            parse_errors = parse_errors.len(),
            "document imported"
        );
        ImportReport::from_save(parse_errors, saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(succeeded: usize, failed: usize, errors: &[&str]) -> SaveReport {
        SaveReport {
            succeeded,
            failed,
            errors: errors.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn empty_document_message_lists_every_error() {
        let report = ImportReport::nothing_found(vec![
            "Error parsing document: bad zip".to_string(),
            "second".to_string(),
        ]);
        assert_eq!(report.status, ImportStatus::Error);
        assert_eq!(
            report.message,
            "No questions found in document. Errors: Error parsing document: bad zip; second"
        );
    }

    #[test]
    fn clean_import_is_success() {
        let report = ImportReport::from_save(Vec::new(), saved(10, 0, &[]));
        assert_eq!(report.status, ImportStatus::Success);
        assert_eq!(report.message, "Successfully imported 10 questions");
    }

    #[test]
    fn parse_errors_alone_keep_success_status() {
        let report = ImportReport::from_save(
            vec!["Question 2 missing options".to_string()],
            saved(2, 0, &[]),
        );
        assert_eq!(report.status, ImportStatus::Success);
        assert_eq!(
            report.message,
            "Successfully imported 2 questions; Parse errors: Question 2 missing options"
        );
    }

    #[test]
    fn failures_warn_and_quote_only_five_errors() {
        let errors: Vec<String> = (1..=7).map(|n| format!("e{n}")).collect();
        let report = ImportReport::from_save(
            errors.clone(),
            saved(1, 2, &["s1", "s2"]),
        );
        assert_eq!(report.status, ImportStatus::Warning);
        assert_eq!(
            report.message,
            "Successfully imported 1 questions; Failed to import 2 questions; \
             Parse errors: e1; e2; e3; e4; e5; Save errors: s1; s2"
        );
        assert_eq!(report.parse_errors, errors);
    }

    #[test]
    fn commit_failure_has_no_success_part() {
        let mut failed = SaveReport::new();
        failed.commit_failed(3, "disk full");
        let report = ImportReport::from_save(Vec::new(), failed);
        assert_eq!(
            report.message,
            "Failed to import 3 questions; Save errors: Database commit error: disk full"
        );
    }
}

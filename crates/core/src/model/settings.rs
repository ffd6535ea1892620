use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("questions per quiz must be > 0")]
    InvalidQuestionsPerQuiz,

    #[error("at least one upload extension must be allowed")]
    NoAllowedExtensions,
}

/// Quiz-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    questions_per_quiz: u32,
    ip_lock_enabled: bool,
    allowed_extensions: Vec<String>,
}

impl Default for QuizSettings {
    /// Ten questions, IP lock on, `.docx` uploads only.
    fn default() -> Self {
        Self {
            questions_per_quiz: 10,
            ip_lock_enabled: true,
            allowed_extensions: vec!["docx".to_owned()],
        }
    }
}

impl QuizSettings {
    /// Creates custom settings. Extensions are stored lowercase without a leading dot.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the question count is zero or no extension is allowed.
    pub fn new<I, S>(
        questions_per_quiz: u32,
        ip_lock_enabled: bool,
        allowed_extensions: I,
    ) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if questions_per_quiz == 0 {
            return Err(SettingsError::InvalidQuestionsPerQuiz);
        }
        let allowed_extensions: Vec<String> = allowed_extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if allowed_extensions.is_empty() {
            return Err(SettingsError::NoAllowedExtensions);
        }
        Ok(Self {
            questions_per_quiz,
            ip_lock_enabled,
            allowed_extensions,
        })
    }

    /// Fixed total reported with every result; also the highest score bucket.
    #[must_use]
    pub fn questions_per_quiz(&self) -> u32 {
        self.questions_per_quiz
    }

    #[must_use]
    pub fn ip_lock_enabled(&self) -> bool {
        self.ip_lock_enabled
    }

    #[must_use]
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// True when `filename` has an extension in the allowed set (case-insensitive).
    #[must_use]
    pub fn allows_file(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_docx_only() {
        let settings = QuizSettings::default();
        assert!(settings.allows_file("quiz.docx"));
        assert!(settings.allows_file("QUIZ.DOCX"));
        assert!(!settings.allows_file("quiz.doc"));
        assert!(!settings.allows_file("docx"));
    }

    #[test]
    fn new_normalizes_extensions() {
        let settings = QuizSettings::new(5, false, [".DOCX", " txt "]).unwrap();
        assert_eq!(settings.allowed_extensions(), ["docx", "txt"]);
        assert!(settings.allows_file("notes.TXT"));
    }

    #[test]
    fn new_rejects_zero_questions() {
        let err = QuizSettings::new(0, true, ["docx"]).unwrap_err();
        assert_eq!(err, SettingsError::InvalidQuestionsPerQuiz);
    }

    #[test]
    fn new_rejects_empty_extension_list() {
        let err = QuizSettings::new(10, true, [" . "]).unwrap_err();
        assert_eq!(err, SettingsError::NoAllowedExtensions);
    }
}

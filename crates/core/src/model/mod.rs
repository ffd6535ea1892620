mod attempt;
mod ids;
mod import;
mod label;
mod question;
mod settings;
mod submission;

pub use ids::{AttemptId, ParseIdError, QuestionId, StartId};
pub use label::{LabelError, OptionLabel};

pub use attempt::{Attempt, QuizStart, Response, ScoreColor};
pub use import::SaveReport;
pub use question::{Question, QuizOption};
pub use settings::{QuizSettings, SettingsError};
pub use submission::{
    AnswerSheet, AnsweredQuestion, GradedAnswer, OptionOutcome, SkippedAnswer, SubmissionResult,
    score_of,
};

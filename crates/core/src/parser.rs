//! Quiz document parser.
//!
//! Turns the ordered, trimmed paragraphs of an uploaded document into
//! question records. The accepted layout, matched case-insensitively:
//!
//! ```text
//! Question 1: What is the capital of France?
//! A. London
//! B. Paris
//! C. Berlin
//! D. Madrid
//! Question 1 Answer: B
//! ```
//!
//! Parsing never fails: malformed blocks are still emitted and reported
//! through [`ParseIssue`]s so the caller can show them and re-import.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::OptionLabel;

/// Characters of an unexpected line quoted in its issue.
const UNEXPECTED_PREVIEW_CHARS: usize = 50;

//
// ─── LINE CLASSIFICATION ───────────────────────────────────────────────────────
//

/// What a single paragraph means to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `Question <N>: <body>`
    Header { number: u32, body: &'a str },
    /// `<L>. <text>`
    Choice { label: OptionLabel, text: &'a str },
    /// `Question <N> Answer: <L>`; `N` is not checked against the open record.
    Answer { label: OptionLabel },
    /// Paragraphs starting with `#`.
    Comment,
    Other,
}

/// Classifies one trimmed paragraph. First match wins: header, choice, answer.
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    if let Some((number, body)) = match_header(line) {
        return Line::Header { number, body };
    }
    if let Some((label, text)) = match_choice(line) {
        return Line::Choice { label, text };
    }
    if let Some(label) = match_answer(line) {
        return Line::Answer { label };
    }
    if line.starts_with('#') {
        return Line::Comment;
    }
    Line::Other
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Consumes one or more leading whitespace characters.
fn skip_whitespace1(s: &str) -> Option<&str> {
    let rest = s.trim_start();
    (rest.len() < s.len()).then_some(rest)
}

fn split_digits(s: &str) -> Option<(&str, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    (end > 0).then(|| s.split_at(end))
}

fn match_header(line: &str) -> Option<(u32, &str)> {
    let rest = strip_prefix_ignore_case(line, "question")?;
    let rest = skip_whitespace1(rest)?;
    let (digits, rest) = split_digits(rest)?;
    let number: u32 = digits.parse().ok().filter(|n| *n > 0)?;
    let body = rest.strip_prefix(':')?.trim();
    (!body.is_empty()).then_some((number, body))
}

fn match_choice(line: &str) -> Option<(OptionLabel, &str)> {
    let mut chars = line.chars();
    let label = OptionLabel::from_char(chars.next()?)?;
    let text = chars.as_str().strip_prefix('.')?.trim();
    (!text.is_empty()).then_some((label, text))
}

fn match_answer(line: &str) -> Option<OptionLabel> {
    let rest = strip_prefix_ignore_case(line, "question")?;
    let rest = skip_whitespace1(rest)?;
    let (_, rest) = split_digits(rest)?;
    let rest = skip_whitespace1(rest)?;
    let rest = strip_prefix_ignore_case(rest, "answer:")?.trim_start();
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OptionLabel::from_char(c),
        _ => None,
    }
}

//
// ─── RECORDS & ISSUES ──────────────────────────────────────────────────────────
//

/// One question block as found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuestion {
    pub number: u32,
    pub body: String,
    pub options: BTreeMap<OptionLabel, String>,
    pub answer: Option<OptionLabel>,
}

impl ParsedQuestion {
    #[must_use]
    pub fn new(number: u32, body: impl Into<String>) -> Self {
        Self {
            number,
            body: body.into(),
            options: BTreeMap::new(),
            answer: None,
        }
    }

    /// Has an answer and all four options.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answer.is_some() && self.options.len() == OptionLabel::ALL.len()
    }
}

/// A non-fatal problem found while reading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseIssue {
    MissingAnswer { number: u32 },
    MissingOptions { number: u32 },
    UnexpectedLine { number: u32, line: String },
    /// The document itself could not be opened or read.
    Document(String),
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::MissingAnswer { number } => write!(f, "Question {number} missing answer"),
            ParseIssue::MissingOptions { number } => {
                write!(f, "Question {number} missing options")
            }
            ParseIssue::UnexpectedLine { number, line } => {
                let preview: String = line.chars().take(UNEXPECTED_PREVIEW_CHARS).collect();
                write!(f, "Unexpected line in Question {number}: {preview}...")
            }
            ParseIssue::Document(cause) => write!(f, "Error parsing document: {cause}"),
        }
    }
}

/// Everything gathered from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub questions: Vec<ParsedQuestion>,
    pub issues: Vec<ParseIssue>,
}

impl ParseOutcome {
    /// Outcome for a document that could not be read at all.
    #[must_use]
    pub fn unreadable(cause: impl fmt::Display) -> Self {
        Self {
            questions: Vec::new(),
            issues: vec![ParseIssue::Document(cause.to_string())],
        }
    }

    /// Issues rendered for display.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    fn close(&mut self, question: ParsedQuestion) {
        if question.answer.is_none() {
            self.issues.push(ParseIssue::MissingAnswer {
                number: question.number,
            });
        } else if question.options.len() < OptionLabel::ALL.len() {
            self.issues.push(ParseIssue::MissingOptions {
                number: question.number,
            });
        }
        self.questions.push(question);
    }
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//

/// Parses document paragraphs into question records.
///
/// A record closes when the next header arrives or input ends. Within an
/// open record a later option or answer line overwrites an earlier one.
/// Lines before the first header are ignored.
pub fn parse_paragraphs<I, S>(paragraphs: I) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ParseOutcome::default();
    let mut open: Option<ParsedQuestion> = None;

    for paragraph in paragraphs {
        let line = paragraph.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        match classify(line) {
            Line::Header { number, body } => {
                if let Some(done) = open.take() {
                    outcome.close(done);
                }
                open = Some(ParsedQuestion::new(number, body));
            }
            Line::Choice { label, text } => {
                if let Some(current) = open.as_mut() {
                    current.options.insert(label, text.to_owned());
                }
            }
            Line::Answer { label } => {
                if let Some(current) = open.as_mut() {
                    current.answer = Some(label);
                }
            }
            Line::Comment => {}
            Line::Other => {
                if let Some(current) = open.as_ref() {
                    outcome.issues.push(ParseIssue::UnexpectedLine {
                        number: current.number,
                        line: line.to_owned(),
                    });
                }
            }
        }
    }

    if let Some(done) = open {
        outcome.close(done);
    }
    outcome
}

//! Built-in sample quiz in the upload format.

use crate::model::OptionLabel;

/// A sample question: number, body, options A..D, correct label.
pub type SampleQuestion = (u32, &'static str, [&'static str; 4], OptionLabel);

pub const SAMPLE_QUESTIONS: [SampleQuestion; 10] = [
    (
        1,
        "What is the capital city of France?",
        ["London", "Paris", "Berlin", "Madrid"],
        OptionLabel::B,
    ),
    (
        2,
        "Which programming language is known for its use in web development and has a famous \"Python\" named after it?",
        ["Java", "C++", "Python", "Ruby"],
        OptionLabel::C,
    ),
    (
        3,
        "What is the largest planet in our solar system?",
        ["Saturn", "Jupiter", "Neptune", "Uranus"],
        OptionLabel::B,
    ),
    (
        4,
        "In what year did World War II end?",
        ["1942", "1945", "1948", "1950"],
        OptionLabel::B,
    ),
    (
        5,
        "What is the chemical symbol for gold?",
        ["Go", "Gd", "Au", "Ag"],
        OptionLabel::C,
    ),
    (
        6,
        "Which scientist developed the theory of relativity?",
        ["Isaac Newton", "Albert Einstein", "Niels Bohr", "Stephen Hawking"],
        OptionLabel::B,
    ),
    (
        7,
        "What is the smallest prime number?",
        ["0", "1", "2", "3"],
        OptionLabel::C,
    ),
    (
        8,
        "Which continent is known as the \"Land of the Rising Sun\"?",
        ["China", "India", "Japan", "Thailand"],
        OptionLabel::C,
    ),
    (
        9,
        "What is the largest ocean on Earth?",
        ["Atlantic Ocean", "Indian Ocean", "Arctic Ocean", "Pacific Ocean"],
        OptionLabel::D,
    ),
    (
        10,
        "Which organ in the human body pumps blood throughout the circulatory system?",
        ["Brain", "Liver", "Heart", "Lungs"],
        OptionLabel::C,
    ),
];

/// Paragraphs of the sample document, including the title and the
/// instructions that precede the first question.
#[must_use]
pub fn sample_paragraphs() -> Vec<String> {
    let mut paragraphs = vec![
        "Sample Quiz Questions".to_string(),
        "Each question has 4 options and the correct answer is indicated at the end.".to_string(),
        String::new(),
    ];
    for (number, body, options, answer) in SAMPLE_QUESTIONS {
        paragraphs.push(format!("Question {number}: {body}"));
        for (label, text) in OptionLabel::ALL.iter().zip(options) {
            paragraphs.push(format!("{label}. {text}"));
        }
        paragraphs.push(format!("Question {number} Answer: {answer}"));
        paragraphs.push(String::new());
    }
    paragraphs
}

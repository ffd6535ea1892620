//! Plain-text views for the terminal.

use std::fmt::Write;

use quiz_core::model::Question;
use quiz_core::stats::{Dashboard, QuestionRank};

pub fn questions(questions: &[Question]) -> String {
    let mut out = String::new();
    if questions.is_empty() {
        out.push_str("No questions imported\n");
        return out;
    }
    for question in questions {
        let _ = writeln!(
            out,
            "[{}] Question {}: {}",
            question.id, question.number, question.body
        );
        for option in &question.options {
            let marker = if option.label == question.correct_answer {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(out, "  {marker} {}. {}", option.label, option.text);
        }
        if !question.has_consistent_answer_key() {
            let _ = writeln!(
                out,
                "  ! answer {} has no matching option",
                question.correct_answer
            );
        }
    }
    out
}

fn ranks(out: &mut String, title: &str, unit: &str, ranked: &[QuestionRank]) {
    let _ = writeln!(out, "{title}:");
    if ranked.is_empty() {
        out.push_str("  (none)\n");
    }
    for rank in ranked {
        let _ = writeln!(
            out,
            "  Q{} {} {unit} ({:.1}%) {}",
            rank.number, rank.count, rank.percentage, rank.body
        );
    }
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Attempts:        {}", dashboard.total_attempts);
    let _ = writeln!(out, "Quiz starts:     {}", dashboard.quiz_starts);
    let _ = writeln!(out, "Completion rate: {:.1}%", dashboard.completion_rate);
    let _ = writeln!(out, "Average time:    {}s", dashboard.average_time);

    out.push_str("\nActivity by hour (UTC):\n");
    for (hour, count) in dashboard.hourly_activity.iter().enumerate() {
        if *count > 0 {
            let _ = writeln!(out, "  {hour:02}:00  {count}");
        }
    }

    out.push('\n');
    ranks(&mut out, "Most correct", "correct", &dashboard.most_correct);
    ranks(&mut out, "Most wrong", "wrong", &dashboard.most_wrong);

    out.push_str("\nScore distribution:\n");
    for bucket in &dashboard.score_distribution {
        let _ = writeln!(
            out,
            "  {:>2} {:<6} {}",
            bucket.score,
            bucket.color.as_str(),
            bucket.count
        );
    }

    out.push_str("\nQuestions:\n");
    for question in &dashboard.questions {
        let _ = writeln!(
            out,
            "  Q{} {} ({}/{} correct, {:.1}%, answer {})",
            question.number,
            question.body,
            question.correct_count,
            question.total_attempts,
            question.correct_percentage,
            question.correct_answer
        );
        for option in &question.options {
            let _ = writeln!(
                out,
                "     {}. {}: {} ({:.1}%)",
                option.label, option.text, option.count, option.percentage
            );
        }
    }
    out
}

use chrono::Duration;
use quiz_core::model::{AnswerSheet, OptionLabel, QuestionId, StartId};
use quiz_core::parser::{ParsedQuestion, parse_paragraphs};
use quiz_core::reconcile::find_drift;
use quiz_core::time::fixed_now;
use storage::repository::{NewSubmission, Storage, StorageError};

fn block(number: u32, body: &str, answer: char) -> Vec<String> {
    vec![
        format!("Question {number}: {body}"),
        "A. first".to_string(),
        "B. second".to_string(),
        "C. third".to_string(),
        "D. fourth".to_string(),
        format!("Question {number} Answer: {answer}"),
    ]
}

async fn storage(name: &str) -> Storage {
    Storage::sqlite(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("sqlite storage")
}

fn submission(ip: &str, pairs: &[(&str, &str)], offset_secs: i64) -> NewSubmission {
    NewSubmission {
        ip_address: ip.to_string(),
        time_taken_secs: 42,
        created_at: fixed_now() + Duration::seconds(offset_secs),
        answers: AnswerSheet::from_raw(pairs.iter().copied()),
        once_per_address: false,
    }
}

#[tokio::test]
async fn reimport_updates_by_number_and_keeps_counters() {
    let storage = storage("memdb_reimport").await;

    let first = parse_paragraphs(block(1, "Original wording?", 'A'));
    let report = storage.questions.save_parsed(&first.questions).await.unwrap();
    assert_eq!((report.succeeded, report.failed), (1, 0));

    let question = &storage.questions.list_questions().await.unwrap()[0];
    let id = question.id.to_string();
    storage
        .attempts
        .record_submission(submission("1.1.1.1", &[(id.as_str(), "a")], 0))
        .await
        .unwrap();

    let second = parse_paragraphs(block(1, "Reworded?", 'B'));
    let report = storage.questions.save_parsed(&second.questions).await.unwrap();
    assert_eq!(report.succeeded, 1);

    let questions = storage.questions.list_questions().await.unwrap();
    assert_eq!(questions.len(), 1);
    let question = &questions[0];
    assert_eq!(question.body, "Reworded?");
    assert_eq!(question.correct_answer, OptionLabel::B);
    assert_eq!(question.total_attempts, 1);
    assert_eq!(question.correct_count, 1);
    assert_eq!(question.options.len(), 4);
    assert_eq!(question.option(OptionLabel::A).unwrap().selection_count, 1);
}

#[tokio::test]
async fn record_without_answer_fails_alone() {
    let storage = storage("memdb_partial_batch").await;

    let mut missing = ParsedQuestion::new(2, "No key?");
    missing.options.insert(OptionLabel::A, "x".into());
    let mut records = parse_paragraphs(block(1, "Fine?", 'C')).questions;
    records.push(missing);
    records.extend(parse_paragraphs(block(3, "Also fine?", 'D')).questions);

    let report = storage.questions.save_parsed(&records).await.unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(
        report.errors,
        vec!["Error saving Question 2: invalid record: missing correct answer".to_string()]
    );
    assert_eq!(storage.questions.count_questions().await.unwrap(), 2);
}

#[tokio::test]
async fn submission_grades_and_increments_counters() {
    let storage = storage("memdb_submission").await;
    let outcome = parse_paragraphs(
        block(1, "One?", 'A')
            .into_iter()
            .chain(block(2, "Two?", 'C')),
    );
    storage.questions.save_parsed(&outcome.questions).await.unwrap();
    let questions = storage.questions.list_questions().await.unwrap();
    let (q1, q2) = (questions[0].id.to_string(), questions[1].id.to_string());

    let recorded = storage
        .attempts
        .record_submission(submission(
            "10.0.0.1",
            &[(q1.as_str(), "b"), (q2.as_str(), "C"), ("9999", "A"), ("abc", "A")],
            0,
        ))
        .await
        .unwrap();

    assert_eq!(recorded.attempt.score, 1);
    assert_eq!(recorded.graded.len(), 2);

    let questions = storage.questions.list_questions().await.unwrap();
    assert_eq!(questions[0].total_attempts, 1);
    assert_eq!(questions[0].correct_count, 0);
    assert_eq!(questions[0].option(OptionLabel::B).unwrap().selection_count, 1);
    assert_eq!(questions[1].correct_count, 1);

    let responses = storage.attempts.list_responses().await.unwrap();
    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r.attempt_id == recorded.attempt.id));
}

#[tokio::test]
async fn out_of_range_question_id_is_skipped_not_fatal() {
    let storage = storage("memdb_oversized_id").await;
    let outcome = parse_paragraphs(block(1, "One?", 'B'));
    storage.questions.save_parsed(&outcome.questions).await.unwrap();
    let q1 = storage.questions.list_questions().await.unwrap()[0].id.to_string();

    let recorded = storage
        .attempts
        .record_submission(submission(
            "10.0.0.2",
            &[(q1.as_str(), "b"), ("18446744073709551615", "A")],
            0,
        ))
        .await
        .unwrap();

    assert_eq!(recorded.attempt.score, 1);
    assert_eq!(recorded.graded.len(), 1);
    assert_eq!(storage.attempts.list_responses().await.unwrap().len(), 1);
    assert!(
        storage
            .questions
            .get_question(QuestionId::new(u64::MAX))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn selection_without_option_row_still_counts_toward_question() {
    let storage = storage("memdb_missing_option_row").await;
    let outcome = parse_paragraphs([
        "Question 1: X?",
        "A. yes",
        "B. no",
        "Question 1 Answer: A",
    ]);
    assert_eq!(outcome.errors(), vec!["Question 1 missing options"]);
    storage.questions.save_parsed(&outcome.questions).await.unwrap();
    let id = storage.questions.list_questions().await.unwrap()[0].id.to_string();

    let recorded = storage
        .attempts
        .record_submission(submission("10.0.0.3", &[(id.as_str(), "C")], 0))
        .await
        .unwrap();
    assert_eq!(recorded.attempt.score, 0);

    let questions = storage.questions.list_questions().await.unwrap();
    let question = &questions[0];
    assert_eq!(question.total_attempts, 1);
    assert_eq!(question.correct_count, 0);
    assert_eq!(question.options.len(), 2);
    assert!(question.options.iter().all(|o| o.selection_count == 0));

    let attempts = storage.attempts.list_attempts().await.unwrap();
    let responses = storage.attempts.list_responses().await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].selected, OptionLabel::C);
    assert!(find_drift(&questions, &attempts, &responses).is_empty());
}

#[tokio::test]
async fn once_per_address_refuses_a_second_attempt() {
    let storage = storage("memdb_once_per_address").await;
    let locked = |ip: &str| NewSubmission {
        once_per_address: true,
        ..submission(ip, &[], 0)
    };

    storage.attempts.record_submission(locked("10.0.0.4")).await.unwrap();
    let second = storage.attempts.record_submission(locked("10.0.0.4")).await;
    assert!(matches!(second, Err(StorageError::Conflict)));
    storage.attempts.record_submission(locked("10.0.0.5")).await.unwrap();

    assert_eq!(storage.attempts.list_attempts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn first_attempt_and_newest_first_listing() {
    let storage = storage("memdb_attempt_order").await;

    for (ip, offset) in [("a", 0), ("b", 60), ("a", 120)] {
        storage
            .attempts
            .record_submission(submission(ip, &[], offset))
            .await
            .unwrap();
    }

    let first = storage.attempts.first_attempt_from("a").await.unwrap().unwrap();
    assert_eq!(first.created_at, fixed_now());
    assert!(storage.attempts.first_attempt_from("c").await.unwrap().is_none());

    let listed = storage.attempts.list_attempts().await.unwrap();
    let ips: Vec<_> = listed.iter().map(|a| a.ip_address.as_str()).collect();
    assert_eq!(ips, vec!["a", "b", "a"]);
    assert_eq!(listed[0].created_at, fixed_now() + Duration::seconds(120));
}

#[tokio::test]
async fn starts_are_durable_and_counted() {
    let storage = storage("memdb_starts").await;

    let start = storage.starts.record_start("1.2.3.4", fixed_now()).await.unwrap();
    storage.starts.record_start("1.2.3.4", fixed_now()).await.unwrap();

    let fetched = storage.starts.get_start(start.id).await.unwrap().unwrap();
    assert_eq!(fetched, start);
    assert_eq!(storage.starts.count_starts().await.unwrap(), 2);
    assert!(
        storage
            .starts
            .get_start(StartId::new(u64::MAX))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn clear_all_removes_everything() {
    let storage = storage("memdb_clear_all").await;
    let outcome = parse_paragraphs(block(1, "One?", 'A'));
    storage.questions.save_parsed(&outcome.questions).await.unwrap();
    let id = storage.questions.list_questions().await.unwrap()[0].id.to_string();
    storage.starts.record_start("x", fixed_now()).await.unwrap();
    storage
        .attempts
        .record_submission(submission("x", &[(id.as_str(), "A")], 0))
        .await
        .unwrap();

    storage.reset.clear_all().await.unwrap();

    assert_eq!(storage.questions.count_questions().await.unwrap(), 0);
    assert!(storage.attempts.list_attempts().await.unwrap().is_empty());
    assert!(storage.attempts.list_responses().await.unwrap().is_empty());
    assert_eq!(storage.starts.count_starts().await.unwrap(), 0);
    assert!(
        storage
            .questions
            .get_question(QuestionId::new(1))
            .await
            .unwrap()
            .is_none()
    );
}

#[test]
fn storage_error_messages_are_stable() {
    let err = StorageError::InvalidRecord("missing correct answer".into());
    assert_eq!(err.to_string(), "invalid record: missing correct answer");
}

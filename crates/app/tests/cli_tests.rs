//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn db(&self) -> String {
        self.dir.path().join("quiz.sqlite3").display().to_string()
    }

    fn quiz(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("quiz").unwrap();
        cmd.env_remove("QUIZ_DB_URL")
            .env_remove("QUIZ_IP_LOCK")
            .env_remove("QUIZ_QUESTIONS_PER_QUIZ")
            .env("RUST_LOG", "warn")
            .arg("--db")
            .arg(self.db());
        cmd
    }

    fn import_sample(&self) {
        let doc = self.dir.path().join("sample.docx");
        self.quiz()
            .arg("sample")
            .arg("--out")
            .arg(&doc)
            .assert()
            .success();
        self.quiz()
            .arg("import")
            .arg(&doc)
            .assert()
            .success()
            .stdout(predicate::str::contains("Successfully imported 10 questions"));
    }
}

#[test]
fn init_db_creates_file() {
    let ws = Workspace::new();
    ws.quiz()
        .arg("init-db")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));
    assert!(ws.dir.path().join("quiz.sqlite3").exists());
}

#[test]
fn sample_import_then_questions() {
    let ws = Workspace::new();
    ws.import_sample();

    ws.quiz()
        .arg("questions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1: What is the capital city of France?"))
        .stdout(predicate::str::contains("* B. Paris"));
}

#[test]
fn submit_then_locked_out() {
    let ws = Workspace::new();
    ws.import_sample();

    ws.quiz()
        .args(["start", "--ip", "10.1.1.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"questions\""));

    ws.quiz()
        .args(["submit", "--ip", "10.1.1.1", "--start", "1", "--answers", r#"{"1":"b","2":"a"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"score\": 1"))
        .stdout(predicate::str::contains("\"score_color\": \"red\""));

    ws.quiz()
        .args(["submit", "--ip", "10.1.1.1", "--answers", "{}"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already completed"));

    ws.quiz()
        .args(["status", "--ip", "10.1.1.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with score 1"));

    ws.quiz()
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("All counters match"));
}

#[test]
fn ip_lock_can_be_disabled() {
    let ws = Workspace::new();
    ws.import_sample();

    for _ in 0..2 {
        ws.quiz()
            .args(["--ip-lock", "false", "submit", "--ip", "10.2.2.2", "--answers", r#"{"3":"B"}"#])
            .assert()
            .success();
    }

    ws.quiz()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_attempts\":2"));
}

#[test]
fn dashboard_json_and_export() {
    let ws = Workspace::new();
    ws.import_sample();
    ws.quiz()
        .args(["submit", "--ip", "10.3.3.3", "--answers", r#"{"1":"B"}"#])
        .assert()
        .success();

    ws.quiz()
        .args(["dashboard", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_attempts\": 1"))
        .stdout(predicate::str::contains("\"score_distribution\""));

    ws.quiz()
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Most correct:"));

    ws.quiz()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("IP Address,Score,Time Taken (s),Timestamp\n10.3.3.3,1,0,"));
}

#[test]
fn clear_requires_confirmation() {
    let ws = Workspace::new();
    ws.import_sample();

    ws.quiz()
        .arg("clear")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    ws.quiz()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All quiz data cleared successfully"));

    ws.quiz()
        .args(["start", "--ip", "10.4.4.4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no questions available"));
}

#[test]
fn importing_a_non_docx_fails() {
    let ws = Workspace::new();
    let path = ws.dir.path().join("quiz.txt");
    std::fs::write(&path, "Question 1: x?").unwrap();

    ws.quiz()
        .arg("import")
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "No questions found in document. Errors: Error parsing document: unsupported file type: quiz.txt",
        ));
}

#[test]
fn malformed_answers_are_rejected() {
    let ws = Workspace::new();
    ws.quiz()
        .args(["submit", "--ip", "10.5.5.5", "--answers", "[1]"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("JSON object"));
}

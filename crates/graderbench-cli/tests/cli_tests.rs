//! CLI integration tests using assert_cmd.
//!
//! These exercise argument handling and early validation only; runs against
//! a live server are covered by the client crate's wiremock tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn graderbench() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("graderbench").unwrap()
}

#[test]
fn help_lists_subcommands() {
    graderbench()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("pull"));
}

#[test]
fn version_flag() {
    graderbench()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("graderbench"));
}

#[test]
fn run_requires_models_flag() {
    graderbench()
        .arg("run")
        .arg("--questions")
        .arg("questions.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--models"));
}

#[test]
fn run_with_missing_question_file_fails() {
    graderbench()
        .arg("run")
        .arg("--questions")
        .arg("nonexistent.toml")
        .arg("--models")
        .arg("llama3.1:8b")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn run_with_empty_question_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.toml");
    std::fs::write(&path, "# empty\n").unwrap();

    graderbench()
        .arg("run")
        .arg("--questions")
        .arg(&path)
        .arg("--models")
        .arg("llama3.1:8b")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no [[questions]]"));
}

#[test]
fn run_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.toml");
    std::fs::write(
        &path,
        "[[questions]]\nquestion = \"q\"\nreference_answer = \"a\"\nstudent_answer = \"s\"\n",
    )
    .unwrap();

    graderbench()
        .arg("run")
        .arg("--questions")
        .arg(&path)
        .arg("--models")
        .arg("llama3.1:8b")
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("format must be one of"));
}

#[test]
fn run_rejects_zero_attempts() {
    graderbench()
        .arg("run")
        .arg("--questions")
        .arg("questions.toml")
        .arg("--models")
        .arg("llama3.1:8b")
        .arg("--attempts")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("attempts must be at least 1"));
}

#[test]
fn run_with_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questions.toml");
    std::fs::write(
        &path,
        "[[questions]]\nquestion = \"q\"\nreference_answer = \"a\"\nstudent_answer = \"s\"\n",
    )
    .unwrap();

    graderbench()
        .arg("run")
        .arg("--questions")
        .arg(&path)
        .arg("--models")
        .arg("llama3.1:8b")
        .arg("--config")
        .arg("/nonexistent/graderbench.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

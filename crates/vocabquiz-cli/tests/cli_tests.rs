//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vocabquiz() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("vocabquiz").unwrap()
}

/// A command isolated from the user's config and API keys.
fn isolated(dir: &Path) -> Command {
    let mut cmd = vocabquiz();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("VOCABQUIZ_GEMINI_KEY")
        .env_remove("VOCABQUIZ_OPENAI_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn play(dir: &Path, input: &str) -> Command {
    let mut cmd = isolated(dir);
    cmd.arg("play")
        .arg("--provider")
        .arg("mock")
        .arg("--store")
        .arg(dir.join("topics.json"))
        .arg("--export")
        .arg(dir.join("reports"))
        .arg("--seed")
        .arg("1")
        .write_stdin(input.to_string());
    cmd
}

const PETS: &str = "cat - con mèo\ndog - con chó\nrun - chạy\njump - nhảy\n\n";

#[test]
fn validate_builtin_topics() {
    vocabquiz()
        .arg("validate")
        .arg("--topics")
        .arg("../vocabquiz-core/topics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Software Development"))
        .stdout(predicate::str::contains("Banking & Fintech"))
        .stdout(predicate::str::contains("All topics valid"));
}

#[test]
fn validate_reports_duplicate_words() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dupes.toml");
    std::fs::write(
        &path,
        r#"
[topic]
id = "dupes"
name = "Dupes"

[[pairs]]
english_word = "cat"
vietnamese_meaning = "con mèo"

[[pairs]]
english_word = "cat"
vietnamese_meaning = "mèo"
"#,
    )
    .unwrap();

    vocabquiz()
        .arg("validate")
        .arg("--topics")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Topic: Dupes [dupes] (2 pairs)"))
        .stdout(predicate::str::contains("WARNING"));
}

#[test]
fn validate_nonexistent_file() {
    vocabquiz()
        .arg("validate")
        .arg("--topics")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    isolated(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created vocabquiz.toml"))
        .stdout(predicate::str::contains("Created topics/example.toml"));

    assert!(dir.path().join("vocabquiz.toml").exists());
    assert!(dir.path().join("topics/example.toml").exists());

    // The generated topic passes validation.
    vocabquiz()
        .arg("validate")
        .arg("--topics")
        .arg(dir.path().join("topics/example.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("All topics valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    isolated(dir.path()).arg("init").assert().success();

    isolated(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn topics_lists_builtin_and_saved() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("topics.json");
    std::fs::write(
        &store,
        r#"{"Kitchen":[{"englishWord":"knife","vietnameseMeaning":"con dao"}]}"#,
    )
    .unwrap();

    isolated(dir.path())
        .arg("topics")
        .arg("--store")
        .arg(&store)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"software_development\""))
        .stdout(predicate::str::contains("\"Kitchen\""))
        .stdout(predicate::str::contains("\"saved\""));
}

#[test]
fn topics_table_output() {
    let dir = TempDir::new().unwrap();

    isolated(dir.path())
        .arg("topics")
        .arg("--store")
        .arg(dir.path().join("missing.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Source"))
        .stdout(predicate::str::contains("Banking & Fintech"));
}

#[test]
fn play_custom_list_and_submit_unanswered() {
    let dir = TempDir::new().unwrap();
    let input = format!("c\nPets\n{PETS}en 4\ns\ny\nh\nq\n");

    play(dir.path(), &input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generating phonetics"))
        .stdout(predicate::str::contains("You have 4 unanswered question(s)."))
        .stdout(predicate::str::contains("Score: 0/4 (0%) - needs improvement"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn play_rejects_short_custom_list() {
    let dir = TempDir::new().unwrap();
    let input = "c\nPets\ncat - con mèo\ndog - con chó\n\n";

    play(dir.path(), input)
        .assert()
        .success()
        .stdout(predicate::str::contains("at least 4"));
}

#[test]
fn play_exports_report() {
    let dir = TempDir::new().unwrap();
    let input = format!("c\nPets\n{PETS}en 4\ns\ny\nx\nq\n");

    play(dir.path(), &input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report saved to"));

    let reports: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(reports.len(), 1);
    let body = std::fs::read_to_string(reports[0].path()).unwrap();
    assert!(body.contains("\"topic\": \"Pets\""));
}

#[test]
fn play_generates_and_saves_topic() {
    let dir = TempDir::new().unwrap();
    let input = "g\nKitchen\ncooking\nknife\npan\nbowl\nspoon\n\ns\nq\n";

    play(dir.path(), input)
        .assert()
        .success()
        .stdout(predicate::str::contains("knife - nghĩa của knife"));

    let saved = std::fs::read_to_string(dir.path().join("topics.json")).unwrap();
    assert!(saved.contains("Kitchen"));
    assert!(saved.contains("nghĩa của spoon"));
}

#[test]
fn play_unknown_provider_fails() {
    let dir = TempDir::new().unwrap();

    isolated(dir.path())
        .arg("play")
        .arg("--provider")
        .arg("nope")
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn play_ends_on_closed_input() {
    let dir = TempDir::new().unwrap();

    play(dir.path(), "")
        .assert()
        .success()
        .stdout(predicate::str::contains("Predefined topics"));
}

#[test]
fn help_output() {
    vocabquiz()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "English-Vietnamese vocabulary quizzes and flashcards",
        ));
}

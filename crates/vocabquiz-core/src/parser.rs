//! Vocabulary input parsing.
//!
//! Two input formats are handled here: the free-text lists typed into the
//! custom-topic and keyword screens, and predefined topic files in TOML.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Topic, VocabularyPair, MIN_QUIZ_PAIRS};

// ---------------------------------------------------------------------------
// Free-text lists
// ---------------------------------------------------------------------------

/// Parse one `word - meaning` pair per line.
///
/// A line is kept only if splitting on `-` yields exactly two non-empty
/// trimmed parts. Everything else (blank lines, hyphenated words, lines
/// without a separator) is silently dropped.
pub fn parse_custom_list(text: &str) -> Vec<VocabularyPair> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split('-').map(str::trim);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(word), Some(meaning), None) if !word.is_empty() && !meaning.is_empty() => {
                    Some(VocabularyPair::new(word, meaning))
                }
                _ => None,
            }
        })
        .collect()
}

/// One keyword per non-empty line, trimmed.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Topic files
// ---------------------------------------------------------------------------

/// Intermediate TOML structure for parsing topic files.
#[derive(Debug, Deserialize)]
struct TomlTopicFile {
    topic: TomlTopicHeader,
    #[serde(default)]
    pairs: Vec<TomlPair>,
}

#[derive(Debug, Deserialize)]
struct TomlTopicHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlPair {
    english_word: String,
    vietnamese_meaning: String,
    #[serde(default)]
    english_description: Option<String>,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    examples: Vec<String>,
}

/// Parse a single topic file.
pub fn parse_topic_file(path: &Path) -> Result<Topic> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read topic file: {}", path.display()))?;

    parse_topic_str(&content, path)
}

/// Parse a TOML string into a `Topic`. `source_path` is only used in errors.
pub fn parse_topic_str(content: &str, source_path: &Path) -> Result<Topic> {
    let parsed: TomlTopicFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let pairs = parsed
        .pairs
        .into_iter()
        .map(|p| VocabularyPair {
            english_word: p.english_word,
            vietnamese_meaning: p.vietnamese_meaning,
            english_description: p.english_description,
            phonetic: p.phonetic,
            part_of_speech: p.part_of_speech,
            examples: p.examples,
        })
        .collect();

    Ok(Topic {
        id: parsed.topic.id,
        name: parsed.topic.name,
        description: parsed.topic.description,
        pairs,
    })
}

/// Recursively load all `.toml` topic files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_topic_directory(dir: &Path) -> Result<Vec<Topic>> {
    let mut topics = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            topics.extend(load_topic_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_topic_file(&path) {
                Ok(topic) => topics.push(topic),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(topics)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A warning from topic validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The topic ID this warning belongs to.
    pub topic_id: String,
    /// Warning message.
    pub message: String,
}

/// Validate a topic for issues that would degrade its quizzes.
pub fn validate_topic(topic: &Topic) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |message: String| {
        warnings.push(ValidationWarning {
            topic_id: topic.id.clone(),
            message,
        })
    };

    if topic.pairs.len() < MIN_QUIZ_PAIRS {
        warn(format!(
            "only {} pairs, a quiz needs at least {MIN_QUIZ_PAIRS}",
            topic.pairs.len()
        ));
    }

    let mut seen_words = HashSet::new();
    let mut seen_meanings = HashSet::new();
    for (i, pair) in topic.pairs.iter().enumerate() {
        if pair.english_word.trim().is_empty() || pair.vietnamese_meaning.trim().is_empty() {
            warn(format!("pair {} has an empty field", i + 1));
            continue;
        }
        if !seen_words.insert(pair.english_word.to_lowercase()) {
            warn(format!("duplicate English word: {}", pair.english_word));
        }
        // Identical meanings cannot serve as distractors for each other
        if !seen_meanings.insert(pair.vietnamese_meaning.as_str()) {
            warn(format!(
                "duplicate meaning '{}' (word: {})",
                pair.vietnamese_meaning, pair.english_word
            ));
        }
    }

    warnings
}

/// Validate a set of topics, including ID clashes between them.
pub fn validate_topics(topics: &[Topic]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen_ids = HashSet::new();
    for topic in topics {
        if !seen_ids.insert(topic.id.as_str()) {
            warnings.push(ValidationWarning {
                topic_id: topic.id.clone(),
                message: format!("duplicate topic ID: {}", topic.id),
            });
        }
        warnings.extend(validate_topic(topic));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[topic]
id = "animals"
name = "Animals"
description = "Common animals"

[[pairs]]
english_word = "cat"
vietnamese_meaning = "con mèo"
phonetic = "/kæt/"
part_of_speech = "noun"
examples = ["The cat sleeps."]

[[pairs]]
english_word = "dog"
vietnamese_meaning = "con chó"

[[pairs]]
english_word = "bird"
vietnamese_meaning = "con chim"

[[pairs]]
english_word = "fish"
vietnamese_meaning = "con cá"
"#;

    #[test]
    fn custom_list_keeps_well_formed_lines() {
        let text = "cat - con mèo\n\ndog-con chó\nwell-known - nổi tiếng\nno separator\n - empty word\nrun -   \n  jump  -  nhảy  ";
        let pairs = parse_custom_list(text);
        let words: Vec<&str> = pairs.iter().map(|p| p.english_word.as_str()).collect();
        assert_eq!(words, vec!["cat", "dog", "jump"]);
        assert_eq!(pairs[2].vietnamese_meaning, "nhảy");
        assert!(pairs.iter().all(|p| p.phonetic.is_none()));
    }

    #[test]
    fn custom_list_of_empty_text() {
        assert!(parse_custom_list("").is_empty());
    }

    #[test]
    fn keywords_one_per_line() {
        let keywords = parse_keywords("  deploy \n\nrollback\n   \ncanary release\n");
        assert_eq!(keywords, vec!["deploy", "rollback", "canary release"]);
    }

    #[test]
    fn parse_valid_toml() {
        let topic = parse_topic_str(VALID_TOML, &PathBuf::from("animals.toml")).unwrap();
        assert_eq!(topic.id, "animals");
        assert_eq!(topic.name, "Animals");
        assert_eq!(topic.pairs.len(), 4);
        assert_eq!(topic.pairs[0].phonetic.as_deref(), Some("/kæt/"));
        assert_eq!(topic.pairs[0].examples, vec!["The cat sleeps."]);
        assert!(topic.pairs[1].part_of_speech.is_none());
        assert!(validate_topic(&topic).is_empty());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_topic_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_missing_header() {
        let toml = r#"
[[pairs]]
english_word = "cat"
vietnamese_meaning = "con mèo"
"#;
        assert!(parse_topic_str(toml, &PathBuf::from("headless.toml")).is_err());
    }

    #[test]
    fn validate_reports_small_and_duplicate_entries() {
        let toml = r#"
[topic]
id = "tiny"
name = "Tiny"

[[pairs]]
english_word = "run"
vietnamese_meaning = "chạy"

[[pairs]]
english_word = "Run"
vietnamese_meaning = "chạy"

[[pairs]]
english_word = "walk"
vietnamese_meaning = " "
"#;
        let topic = parse_topic_str(toml, &PathBuf::from("tiny.toml")).unwrap();
        let warnings = validate_topic(&topic);
        assert!(warnings.iter().any(|w| w.message.contains("at least 4")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate English word")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate meaning")));
        assert!(warnings.iter().any(|w| w.message.contains("empty field")));
    }

    #[test]
    fn validate_topics_detects_id_clash() {
        let topic = parse_topic_str(VALID_TOML, &PathBuf::from("a.toml")).unwrap();
        let warnings = validate_topics(&[topic.clone(), topic]);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate topic ID")));
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("animals.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let topics = load_topic_directory(dir.path()).unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].id, "animals");
    }

    #[test]
    fn load_directory_rejects_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(load_topic_directory(file.path()).is_err());
    }
}

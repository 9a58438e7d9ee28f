//! The `vocabquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use vocabquiz_core::parser;

pub fn execute(topics_path: PathBuf) -> Result<()> {
    let topics = if topics_path.is_dir() {
        parser::load_topic_directory(&topics_path)?
    } else {
        vec![parser::parse_topic_file(&topics_path)?]
    };

    if topics.is_empty() {
        println!("No topic files found in {}.", topics_path.display());
        return Ok(());
    }

    for topic in &topics {
        println!("Topic: {} [{}] ({} pairs)", topic.name, topic.id, topic.pairs.len());
    }

    let warnings = parser::validate_topics(&topics);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.topic_id, w.message);
    }

    if warnings.is_empty() {
        println!("All topics valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}

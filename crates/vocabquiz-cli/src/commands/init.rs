//! The `vocabquiz init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("vocabquiz.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("topics").context("failed to create topics directory")?;
    write_if_missing(Path::new("topics/example.toml"), EXAMPLE_TOPIC)?;

    println!("\nNext steps:");
    println!("  1. Put your Gemini API key in GEMINI_API_KEY (or edit vocabquiz.toml)");
    println!("  2. Run: vocabquiz validate --topics topics");
    println!("  3. Run: vocabquiz play");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# vocabquiz configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
loading_delay_ms = 500
default_quiz_length = 10
topics_dir = "topics"
export_dir = "./vocabquiz-reports"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

[providers.mock]
type = "mock"
"#;

const EXAMPLE_TOPIC: &str = r#"[topic]
id = "travel"
name = "Travel"
description = "Words for airports, hotels and getting around"

[[pairs]]
english_word = "luggage"
vietnamese_meaning = "hành lý"
part_of_speech = "noun"

[[pairs]]
english_word = "passport"
vietnamese_meaning = "hộ chiếu"
part_of_speech = "noun"

[[pairs]]
english_word = "boarding pass"
vietnamese_meaning = "thẻ lên máy bay"
part_of_speech = "noun"

[[pairs]]
english_word = "delay"
vietnamese_meaning = "sự trì hoãn"
part_of_speech = "noun"

[[pairs]]
english_word = "check in"
vietnamese_meaning = "làm thủ tục nhận phòng hoặc lên máy bay"
part_of_speech = "verb"

[[pairs]]
english_word = "itinerary"
vietnamese_meaning = "A planned route or journey, listing places to visit."
english_description = "A planned route or journey, listing places to visit."
part_of_speech = "noun"
"#;

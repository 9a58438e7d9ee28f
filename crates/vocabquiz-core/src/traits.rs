//! Collaborator traits for AI augmentation and topic persistence.
//!
//! These are implemented by the `vocabquiz-providers` and `vocabquiz-store`
//! crates respectively.

use async_trait::async_trait;

use crate::error::{AugmentError, StoreError};
use crate::model::{SavedTopic, VocabularyPair};

// ---------------------------------------------------------------------------
// AI augmentation
// ---------------------------------------------------------------------------

/// Backend that fills in vocabulary metadata using a text-generation service.
#[async_trait]
pub trait VocabularyAugmenter: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Return the pairs with `phonetic` and `part_of_speech` filled in.
    ///
    /// The output has the same length and order as the input.
    async fn augment_with_phonetics(
        &self,
        pairs: &[VocabularyPair],
    ) -> Result<Vec<VocabularyPair>, AugmentError>;

    /// Produce Vietnamese meanings for English words, optionally steered by a
    /// free-form context hint.
    async fn augment_with_meanings(
        &self,
        words: &[String],
        context: Option<&str>,
    ) -> Result<Vec<VocabularyPair>, AugmentError>;
}

// ---------------------------------------------------------------------------
// Topic store
// ---------------------------------------------------------------------------

/// Key-value store of named vocabulary lists.
pub trait TopicStore: Send + Sync {
    /// All saved topics, ordered by name.
    fn list_saved(&self) -> Result<Vec<SavedTopic>, StoreError>;

    /// Insert or replace the topic called `name`.
    fn save(&self, name: &str, pairs: &[VocabularyPair]) -> Result<(), StoreError>;

    /// Remove the topic called `name`. Removing a missing topic is not an error.
    fn delete(&self, name: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON payload from a possibly markdown-formatted model reply.
///
/// Handles:
/// - A ```json``` block (preferred)
/// - A generic ``` block (if no json-specific block is found)
/// - Raw JSON with no markdown (returned trimmed)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_block = None;
    let mut generic_block = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_block.get_or_insert_with(|| current_block.clone());
            } else {
                generic_block.get_or_insert_with(|| current_block.clone());
            }
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // A truncated reply may leave the block unclosed
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_block.get_or_insert(current_block);
        } else {
            generic_block.get_or_insert(current_block);
        }
    }

    json_block
        .or(generic_block)
        .unwrap_or_else(|| response.trim().to_string())
}

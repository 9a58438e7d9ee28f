//! Offline augmenter for tests and sessions without network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vocabquiz_core::error::AugmentError;
use vocabquiz_core::model::VocabularyPair;
use vocabquiz_core::traits::VocabularyAugmenter;

/// A deterministic augmenter that never leaves the process.
///
/// Phonetics are placeholders (`/word/`, part of speech `noun`). Meanings
/// come from a lookup table, falling back to `nghĩa của <word>`.
pub struct MockAugmenter {
    meanings: HashMap<String, String>,
    failure: Option<AugmentError>,
    call_count: AtomicU32,
    last_context: Mutex<Option<String>>,
}

impl MockAugmenter {
    pub fn new() -> Self {
        Self::with_meanings(HashMap::new())
    }

    /// Create a mock that answers meanings from `meanings` (keyed by
    /// lowercase English word).
    pub fn with_meanings(meanings: HashMap<String, String>) -> Self {
        Self {
            meanings: meanings
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_context: Mutex::new(None),
        }
    }

    /// Create a mock whose every call fails with `error`.
    pub fn failing(error: AugmentError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    /// Number of augmentation calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Context hint passed to the most recent meanings call.
    pub fn last_context(&self) -> Option<String> {
        self.last_context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record_call(&self) -> Result<(), AugmentError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockAugmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VocabularyAugmenter for MockAugmenter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn augment_with_phonetics(
        &self,
        pairs: &[VocabularyPair],
    ) -> Result<Vec<VocabularyPair>, AugmentError> {
        self.record_call()?;
        Ok(pairs
            .iter()
            .map(|pair| VocabularyPair {
                phonetic: Some(format!("/{}/", pair.english_word.to_lowercase())),
                part_of_speech: Some("noun".to_string()),
                ..pair.clone()
            })
            .collect())
    }

    async fn augment_with_meanings(
        &self,
        words: &[String],
        context: Option<&str>,
    ) -> Result<Vec<VocabularyPair>, AugmentError> {
        self.record_call()?;
        *self
            .last_context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = context.map(str::to_string);

        Ok(words
            .iter()
            .map(|word| {
                let meaning = self
                    .meanings
                    .get(&word.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| format!("nghĩa của {word}"));
                let mut pair = VocabularyPair::new(word.as_str(), meaning);
                pair.part_of_speech = Some("noun".to_string());
                pair
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn phonetics_are_placeholders() {
        let mock = MockAugmenter::new();
        let out = mock
            .augment_with_phonetics(&[VocabularyPair::new("Cat", "con mèo")])
            .await
            .unwrap();
        assert_eq!(out[0].phonetic.as_deref(), Some("/cat/"));
        assert_eq!(out[0].part_of_speech.as_deref(), Some("noun"));
        assert_eq!(out[0].vietnamese_meaning, "con mèo");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn meanings_use_table_then_fallback() {
        let mut table = HashMap::new();
        table.insert("Dog".to_string(), "con chó".to_string());
        let mock = MockAugmenter::with_meanings(table);

        let words = vec!["dog".to_string(), "ledger".to_string()];
        let out = mock
            .augment_with_meanings(&words, Some("pets"))
            .await
            .unwrap();
        assert_eq!(out[0].vietnamese_meaning, "con chó");
        assert_eq!(out[1].vietnamese_meaning, "nghĩa của ledger");
        assert_eq!(mock.last_context().as_deref(), Some("pets"));
    }

    #[tokio::test]
    async fn failing_mock_counts_calls() {
        let mock = MockAugmenter::failing(AugmentError::NetworkError("offline".into()));
        let err = mock.augment_with_phonetics(&[]).await.unwrap_err();
        assert_eq!(err, AugmentError::NetworkError("offline".into()));
        assert_eq!(mock.call_count(), 1);
    }
}

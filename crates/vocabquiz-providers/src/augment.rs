//! Prompt construction and reply handling shared by every network backend.
//!
//! A backend only has to turn a [`CompletionRequest`] into the raw text the
//! model answered with. [`LlmAugmenter`] does the rest: it builds the prompt,
//! parses the JSON reply and merges it back into vocabulary pairs.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use vocabquiz_core::error::AugmentError;
use vocabquiz_core::model::VocabularyPair;
use vocabquiz_core::traits::{extract_json_from_markdown, VocabularyAugmenter};

/// Parts of speech the models are asked to choose from.
pub const PARTS_OF_SPEECH: &[&str] = &[
    "noun",
    "verb",
    "adjective",
    "adverb",
    "pronoun",
    "preposition",
    "conjunction",
    "interjection",
];

/// System message for chat-style backends.
pub const SYSTEM_PROMPT: &str = "You are a bilingual English-Vietnamese lexicographer. \
    Respond ONLY with a JSON object. Do not add explanations.";

/// What shape of JSON the request expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Phonetics,
    Meanings,
}

impl ResponseKind {
    /// JSON schema for the reply, in the OpenAPI subset structured-output
    /// APIs accept.
    pub fn schema(self) -> serde_json::Value {
        let (field, description) = match self {
            ResponseKind::Phonetics => (
                "phonetic",
                "The American English (AmE) IPA transcription, e.g. /həˈloʊ/.",
            ),
            ResponseKind::Meanings => (
                "vietnameseMeaning",
                "The Vietnamese translation of the English word.",
            ),
        };
        let mut properties = serde_json::Map::new();
        properties.insert(
            "englishWord".into(),
            serde_json::json!({ "type": "STRING", "description": "The original English word." }),
        );
        properties.insert(
            field.into(),
            serde_json::json!({ "type": "STRING", "description": description }),
        );
        properties.insert(
            "partOfSpeech".into(),
            serde_json::json!({
                "type": "STRING",
                "description": "The part of speech of the English word."
            }),
        );
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "items": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": properties,
                        "required": ["englishWord", field, "partOfSpeech"]
                    }
                }
            },
            "required": ["items"]
        })
    }
}

/// A single structured-output request to a text-generation backend.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub kind: ResponseKind,
}

/// A text-generation backend able to answer with JSON.
#[async_trait]
pub trait JsonCompletion: Send + Sync {
    /// Backend name used in logs and the CLI (e.g. "openai").
    fn name(&self) -> &str;

    /// Run the request and return the raw reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AugmentError>;
}

/// Build the phonetics prompt for a list of English words.
pub fn phonetics_prompt(words: &[String]) -> String {
    format!(
        "Provide the American English (AmE) International Phonetic Alphabet (IPA) transcription \
         and part of speech for the following list of English words: {}. \
         Please use a standard American English pronunciation guide.\n\n\
         Return JSON of the form {{\"items\": [{{\"englishWord\": \"hello\", \"phonetic\": \"/həˈloʊ/\", \
         \"partOfSpeech\": \"interjection\"}}]}} with partOfSpeech as one of: {}",
        words.join(", "),
        PARTS_OF_SPEECH.join(", ")
    )
}

/// Build the meanings prompt, with an optional usage context.
pub fn meanings_prompt(words: &[String], context: Option<&str>) -> String {
    let mut prompt = format!(
        "Give the Vietnamese meaning and part of speech of each of these English words. \
         Return JSON of the form {{\"items\": [\
         {{\"englishWord\": \"run\", \"vietnameseMeaning\": \"chạy\", \"partOfSpeech\": \"verb\"}}, \
         {{\"englishWord\": \"beautiful\", \"vietnameseMeaning\": \"đẹp\", \"partOfSpeech\": \"adjective\"}}]}}\n\n\
         partOfSpeech must be one of: {}",
        PARTS_OF_SPEECH.join(", ")
    );
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("\n\nUsage context: {context}"));
    }
    prompt.push_str(&format!("\n\nWords: {}", words.join(", ")));
    prompt
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhoneticEntry {
    english_word: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    part_of_speech: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeaningEntry {
    english_word: String,
    #[serde(default)]
    vietnamese_meaning: String,
    #[serde(default)]
    part_of_speech: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    List(Vec<T>),
    Wrapped { items: Vec<T> },
}

/// Parse a model reply into entries, accepting a bare array, an `items`
/// wrapper, or either inside a fenced block.
fn parse_entries<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, AugmentError> {
    let json = extract_json_from_markdown(raw);
    match serde_json::from_str::<Reply<T>>(&json) {
        Ok(Reply::List(items)) | Ok(Reply::Wrapped { items }) => Ok(items),
        Err(e) => Err(AugmentError::InvalidResponse(format!(
            "expected a JSON array of entries: {e}"
        ))),
    }
}

/// Overwrite phonetic metadata on each pair from the model's entries,
/// matching by case-insensitive English word. Pairs the model skipped end up
/// with no phonetic data.
fn merge_phonetics(pairs: &[VocabularyPair], entries: Vec<PhoneticEntry>) -> Vec<VocabularyPair> {
    let by_word: HashMap<String, PhoneticEntry> = entries
        .into_iter()
        .map(|e| (e.english_word.trim().to_lowercase(), e))
        .collect();

    pairs
        .iter()
        .map(|pair| {
            let entry = by_word.get(&pair.english_word.trim().to_lowercase());
            VocabularyPair {
                phonetic: entry.and_then(|e| e.phonetic.clone()),
                part_of_speech: entry.and_then(|e| e.part_of_speech.clone()),
                ..pair.clone()
            }
        })
        .collect()
}

/// [`VocabularyAugmenter`] on top of any [`JsonCompletion`] backend.
pub struct LlmAugmenter<C> {
    backend: C,
    model: String,
}

impl<C: JsonCompletion> LlmAugmenter<C> {
    pub fn new(backend: C, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: String, kind: ResponseKind) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt,
            kind,
        }
    }
}

#[async_trait]
impl<C: JsonCompletion> VocabularyAugmenter for LlmAugmenter<C> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn augment_with_phonetics(
        &self,
        pairs: &[VocabularyPair],
    ) -> Result<Vec<VocabularyPair>, AugmentError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let words: Vec<String> = pairs.iter().map(|p| p.english_word.clone()).collect();
        let request = self.request(phonetics_prompt(&words), ResponseKind::Phonetics);

        let raw = self.backend.complete(&request).await?;
        let entries: Vec<PhoneticEntry> = parse_entries(&raw)?;
        debug!(
            backend = self.backend.name(),
            requested = pairs.len(),
            received = entries.len(),
            "phonetics reply parsed"
        );
        Ok(merge_phonetics(pairs, entries))
    }

    async fn augment_with_meanings(
        &self,
        words: &[String],
        context: Option<&str>,
    ) -> Result<Vec<VocabularyPair>, AugmentError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.request(meanings_prompt(words, context), ResponseKind::Meanings);

        let raw = self.backend.complete(&request).await?;
        let entries: Vec<MeaningEntry> = parse_entries(&raw)?;

        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            let word = entry.english_word.trim();
            let meaning = entry.vietnamese_meaning.trim();
            if word.is_empty() || meaning.is_empty() {
                warn!(word, "skipping generated entry without a meaning");
                continue;
            }
            let mut pair = VocabularyPair::new(word, meaning);
            pair.part_of_speech = entry.part_of_speech;
            pairs.push(pair);
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, AugmentError>,
        prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JsonCompletion for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, AugmentError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.reply.clone()
        }
    }

    fn pairs() -> Vec<VocabularyPair> {
        vec![
            VocabularyPair::new("Hello", "xin chào"),
            VocabularyPair::new("run", "chạy"),
        ]
    }

    #[tokio::test]
    async fn phonetics_merge_case_insensitively() {
        let reply = r#"[
            {"englishWord": "hello", "phonetic": "/həˈloʊ/", "partOfSpeech": "interjection"},
            {"englishWord": "RUN", "phonetic": "/rʌn/", "partOfSpeech": "verb"}
        ]"#;
        let augmenter = LlmAugmenter::new(Canned::ok(reply), "test-model");
        let out = augmenter.augment_with_phonetics(&pairs()).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].english_word, "Hello");
        assert_eq!(out[0].phonetic.as_deref(), Some("/həˈloʊ/"));
        assert_eq!(out[1].part_of_speech.as_deref(), Some("verb"));
        assert_eq!(out[1].vietnamese_meaning, "chạy");
    }

    #[tokio::test]
    async fn phonetics_clear_unmatched_pairs() {
        let mut input = pairs();
        input[1].phonetic = Some("/stale/".into());
        let reply = r#"{"items": [{"englishWord": "hello", "phonetic": "/h/", "partOfSpeech": "noun"}]}"#;
        let augmenter = LlmAugmenter::new(Canned::ok(reply), "m");
        let out = augmenter.augment_with_phonetics(&input).await.unwrap();

        assert_eq!(out[0].phonetic.as_deref(), Some("/h/"));
        assert!(out[1].phonetic.is_none());
        assert!(out[1].part_of_speech.is_none());
    }

    #[tokio::test]
    async fn empty_input_makes_no_call() {
        let backend = Canned::ok("not json");
        let augmenter = LlmAugmenter::new(backend, "m");
        assert!(augmenter.augment_with_phonetics(&[]).await.unwrap().is_empty());
        assert!(augmenter
            .augment_with_meanings(&[], None)
            .await
            .unwrap()
            .is_empty());
        assert!(augmenter.backend.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn meanings_accept_fenced_reply_and_skip_blank_entries() {
        let reply = "Here you go:\n```json\n{\"items\": [\
            {\"englishWord\": \"ledger\", \"vietnameseMeaning\": \"sổ cái\", \"partOfSpeech\": \"noun\"},\
            {\"englishWord\": \"audit\", \"vietnameseMeaning\": \"  \", \"partOfSpeech\": \"verb\"}\
            ]}\n```";
        let augmenter = LlmAugmenter::new(Canned::ok(reply), "m");
        let words = vec!["ledger".to_string(), "audit".to_string()];
        let out = augmenter
            .augment_with_meanings(&words, Some("banking"))
            .await
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].english_word, "ledger");
        assert_eq!(out[0].vietnamese_meaning, "sổ cái");
        assert_eq!(out[0].part_of_speech.as_deref(), Some("noun"));

        let prompts = augmenter.backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("Usage context: banking"));
        assert!(prompts[0].contains("ledger, audit"));
    }

    #[tokio::test]
    async fn unexpected_shape_is_invalid_response() {
        let augmenter = LlmAugmenter::new(Canned::ok(r#"{"words": []}"#), "m");
        let err = augmenter.augment_with_phonetics(&pairs()).await.unwrap_err();
        assert!(matches!(err, AugmentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let backend = Canned {
            reply: Err(AugmentError::Timeout(30)),
            prompts: Mutex::new(Vec::new()),
        };
        let augmenter = LlmAugmenter::new(backend, "m");
        let err = augmenter.augment_with_phonetics(&pairs()).await.unwrap_err();
        assert_eq!(err, AugmentError::Timeout(30));
    }

    #[test]
    fn meanings_prompt_omits_blank_context() {
        let words = vec!["cat".to_string()];
        assert!(!meanings_prompt(&words, Some("   ")).contains("Usage context"));
        assert!(phonetics_prompt(&words).contains("cat"));
    }

    #[test]
    fn schema_names_kind_specific_field() {
        let schema = ResponseKind::Meanings.schema();
        let required = &schema["properties"]["items"]["items"]["required"];
        assert_eq!(required[1], "vietnameseMeaning");
        let schema = ResponseKind::Phonetics.schema();
        assert!(schema["properties"]["items"]["items"]["properties"]
            .get("phonetic")
            .is_some());
    }
}

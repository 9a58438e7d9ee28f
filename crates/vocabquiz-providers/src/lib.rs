//! vocabquiz-providers — AI vocabulary augmentation backends.
//!
//! Implements the core `VocabularyAugmenter` trait on top of Gemini, OpenAI
//! and Ollama, plus an offline mock, and loads the TOML configuration that
//! selects between them.

pub mod augment;
pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use augment::{CompletionRequest, JsonCompletion, LlmAugmenter, ResponseKind};
pub use config::{create_augmenter, load_config, load_config_from, ProviderConfig, VocabquizConfig};
pub use mock::MockAugmenter;

//! Configuration loading and augmenter factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vocabquiz_core::driver::DriverConfig;
use vocabquiz_core::error::AugmentError;
use vocabquiz_core::traits::VocabularyAugmenter;

use crate::augment::LlmAugmenter;
use crate::gemini::GeminiBackend;
use crate::mock::MockAugmenter;
use crate::ollama::OllamaBackend;
use crate::openai::OpenAiBackend;

/// Configuration for a single augmentation backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    Mock {
        /// Meanings returned for known words, keyed by English word.
        #[serde(default)]
        meanings: HashMap<String, String>,
        /// When set, every call fails with this network error message.
        #[serde(default)]
        fail_with: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock {
                meanings,
                fail_with,
            } => f
                .debug_struct("Mock")
                .field("meanings", &meanings.len())
                .field("fail_with", fail_with)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level vocabquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabquizConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is named on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// How long the quiz-building screen stays up, in milliseconds.
    #[serde(default = "default_loading_delay")]
    pub loading_delay_ms: u64,
    #[serde(default = "default_quiz_length")]
    pub default_quiz_length: usize,
    /// Retries on transient augmentation errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Extra directory of predefined topic files.
    #[serde(default)]
    pub topics_dir: Option<PathBuf>,
    /// Saved-topics file. Defaults to a file under the user data directory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Where quiz reports are written.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_loading_delay() -> u64 {
    500
}
fn default_quiz_length() -> usize {
    vocabquiz_core::model::DEFAULT_QUIZ_LENGTH
}
fn default_retries() -> u32 {
    2
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_export_dir() -> PathBuf {
    PathBuf::from("./vocabquiz-reports")
}

impl Default for VocabquizConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            loading_delay_ms: default_loading_delay(),
            default_quiz_length: default_quiz_length(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            topics_dir: None,
            store_path: None,
            export_dir: default_export_dir(),
        }
    }
}

impl VocabquizConfig {
    /// Timing knobs for the session driver.
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            loading_delay: Duration::from_millis(self.loading_delay_ms),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// The saved-topics file, falling back to the user data directory.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("vocabquiz")
                .join("topics.json"),
            Err(_) => PathBuf::from("vocabquiz-topics.json"),
        }
    }

    /// Build the augmenter named `provider`, or the default provider.
    ///
    /// `mock` is always available even when not configured.
    pub fn augmenter(&self, provider: Option<&str>) -> Result<Box<dyn VocabularyAugmenter>> {
        let name = provider.unwrap_or(self.default_provider.as_str());
        match self.providers.get(name) {
            Some(config) => create_augmenter(name, config, &self.default_model),
            None if name == "mock" => Ok(Box::new(MockAugmenter::new())),
            None => anyhow::bail!(
                "provider '{name}' is not configured (add [providers.{name}] to vocabquiz.toml, \
                 or use --provider mock)"
            ),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let resolve = |v: &Option<String>| v.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
            org_id: resolve(org_id),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
        mock @ ProviderConfig::Mock { .. } => mock.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `vocabquiz.toml` in the current directory
/// 2. `~/.config/vocabquiz/config.toml`
///
/// Environment variable overrides: `VOCABQUIZ_GEMINI_KEY`, `VOCABQUIZ_OPENAI_KEY`.
pub fn load_config() -> Result<VocabquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<VocabquizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => [Some(PathBuf::from("vocabquiz.toml")), global_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<VocabquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => VocabquizConfig::default(),
    };

    if let Ok(key) = std::env::var("VOCABQUIZ_GEMINI_KEY") {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("VOCABQUIZ_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("vocabquiz")
            .join("config.toml")
    })
}

/// Create an augmenter instance from its configuration.
pub fn create_augmenter(
    name: &str,
    config: &ProviderConfig,
    model: &str,
) -> Result<Box<dyn VocabularyAugmenter>> {
    debug!(provider = name, model, "creating augmenter");
    let augmenter: Box<dyn VocabularyAugmenter> = match config {
        ProviderConfig::Gemini { api_key, base_url } => Box::new(LlmAugmenter::new(
            GeminiBackend::new(api_key, base_url.clone())?,
            model,
        )),
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(LlmAugmenter::new(
            OpenAiBackend::new(api_key, base_url.clone(), org_id.clone())?,
            model,
        )),
        ProviderConfig::Ollama { base_url } => {
            Box::new(LlmAugmenter::new(OllamaBackend::new(base_url)?, model))
        }
        ProviderConfig::Mock {
            meanings,
            fail_with,
        } => match fail_with {
            Some(message) => Box::new(MockAugmenter::failing(AugmentError::NetworkError(
                message.clone(),
            ))),
            None => Box::new(MockAugmenter::with_meanings(meanings.clone())),
        },
    };
    Ok(augmenter)
}

pub mod init;
pub mod play;
pub mod topics;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use vocabquiz_core::catalog::TopicCatalog;
use vocabquiz_providers::VocabquizConfig;
use vocabquiz_store::JsonTopicStore;

/// Built-in topics, plus any found in the command-line or configured directory.
pub fn load_catalog(cli_dir: Option<&Path>, config: &VocabquizConfig) -> Result<TopicCatalog> {
    match cli_dir.or(config.topics_dir.as_deref()) {
        Some(dir) => TopicCatalog::with_directory(dir),
        None => TopicCatalog::builtin(),
    }
}

/// The saved-topics store at the command-line path or the configured one.
pub fn open_store(cli_path: Option<PathBuf>, config: &VocabquizConfig) -> JsonTopicStore {
    JsonTopicStore::new(cli_path.unwrap_or_else(|| config.store_path()))
}

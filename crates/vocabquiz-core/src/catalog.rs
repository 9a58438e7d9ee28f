//! Predefined topic catalog.
//!
//! Built-in topics are compiled into the binary from `topics/*.toml`; more can
//! be loaded from a directory at startup.

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Topic;
use crate::parser::{load_topic_directory, parse_topic_str};

const BUILTIN_TOPICS: &[(&str, &str)] = &[
    (
        "software_development.toml",
        include_str!("../topics/software_development.toml"),
    ),
    (
        "banking_fintech.toml",
        include_str!("../topics/banking_fintech.toml"),
    ),
];

/// Ordered collection of predefined topics, addressed by ID.
#[derive(Debug, Clone, Default)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    pub fn new(topics: Vec<Topic>) -> Self {
        let mut catalog = Self::default();
        catalog.extend(topics);
        catalog
    }

    /// The topics shipped with vocabquiz.
    pub fn builtin() -> Result<Self> {
        let topics = BUILTIN_TOPICS
            .iter()
            .map(|(file, content)| {
                parse_topic_str(content, Path::new(file))
                    .with_context(|| format!("built-in topic {file} is invalid"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(topics))
    }

    /// Built-in topics plus every topic file found under `dir`.
    pub fn with_directory(dir: &Path) -> Result<Self> {
        let mut catalog = Self::builtin()?;
        catalog.extend(load_topic_directory(dir)?);
        Ok(catalog)
    }

    /// Add topics. A topic whose ID is already present replaces the old one.
    pub fn extend(&mut self, topics: impl IntoIterator<Item = Topic>) {
        for topic in topics {
            match self.topics.iter_mut().find(|t| t.id == topic.id) {
                Some(existing) => {
                    tracing::debug!(id = %topic.id, "replacing predefined topic");
                    *existing = topic;
                }
                None => self.topics.push(topic),
            }
        }
    }

    /// Look a topic up by ID.
    pub fn resolve(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn list(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

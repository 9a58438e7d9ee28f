//! Single-file JSON topic store.
//!
//! The file holds one object mapping topic name to its list of pairs:
//!
//! ```json
//! { "Travel": [ { "englishWord": "luggage", "vietnameseMeaning": "hành lý" } ] }
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use vocabquiz_core::error::StoreError;
use vocabquiz_core::model::{SavedTopic, VocabularyPair};
use vocabquiz_core::traits::TopicStore;

type TopicMap = BTreeMap<String, Vec<VocabularyPair>>;

/// Topic store backed by a JSON file on disk.
///
/// Writes go to a temporary file in the same directory which then replaces
/// the original, so a crash mid-write never leaves a truncated file.
pub struct JsonTopicStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonTopicStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<TopicMap, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TopicMap::new()),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        Ok(parse_topic_map(&content, &self.path))
    }

    fn write_map(&self, map: &TopicMap) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        let json =
            serde_json::to_string_pretty(map).map_err(|e| StoreError::Serialize(e.to_string()))?;

        let unavailable = |e: std::io::Error| {
            StoreError::Unavailable(format!("cannot write {}: {e}", self.path.display()))
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(unavailable)?;
        tmp.write_all(json.as_bytes()).map_err(unavailable)?;
        tmp.as_file().sync_all().map_err(unavailable)?;
        tmp.persist(&self.path).map_err(|e| unavailable(e.error))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut TopicMap)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut map = self.read_map()?;
        apply(&mut map);
        self.write_map(&map)
    }
}

/// Parse the store file leniently. An unparsable file reads as empty, and
/// entries that are not lists of pairs are skipped.
fn parse_topic_map(content: &str, path: &Path) -> TopicMap {
    if content.trim().is_empty() {
        return TopicMap::new();
    }
    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(content) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "saved topics file is unreadable, ignoring it"
            );
            return TopicMap::new();
        }
    };

    raw.into_iter()
        .filter_map(
            |(name, value)| match serde_json::from_value::<Vec<VocabularyPair>>(value) {
                Ok(pairs) => Some((name, pairs)),
                Err(e) => {
                    warn!(topic = %name, error = %e, "skipping malformed saved topic");
                    None
                }
            },
        )
        .collect()
}

impl TopicStore for JsonTopicStore {
    fn list_saved(&self) -> Result<Vec<SavedTopic>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let map = self.read_map()?;
        debug!(count = map.len(), path = %self.path.display(), "listed saved topics");
        Ok(map
            .into_iter()
            .map(|(name, pairs)| SavedTopic { name, pairs })
            .collect())
    }

    fn save(&self, name: &str, pairs: &[VocabularyPair]) -> Result<(), StoreError> {
        self.update(|map| {
            map.insert(name.to_string(), pairs.to_vec());
        })?;
        info!(topic = name, pairs = pairs.len(), "saved topic");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.update(|map| {
            map.remove(name);
        })?;
        info!(topic = name, "deleted topic");
        Ok(())
    }
}

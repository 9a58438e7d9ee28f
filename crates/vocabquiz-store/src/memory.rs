//! In-process topic store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use vocabquiz_core::error::StoreError;
use vocabquiz_core::model::{SavedTopic, VocabularyPair};
use vocabquiz_core::traits::TopicStore;

/// Topic store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryTopicStore {
    topics: Mutex<BTreeMap<String, Vec<VocabularyPair>>>,
    unavailable: AtomicBool,
}

impl MemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store.
    pub fn with_topics(topics: impl IntoIterator<Item = SavedTopic>) -> Self {
        let store = Self::new();
        store
            .topics()
            .extend(topics.into_iter().map(|t| (t.name, t.pairs)));
        store
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn topics(&self) -> MutexGuard<'_, BTreeMap<String, Vec<VocabularyPair>>> {
        self.topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            Err(StoreError::Unavailable("in-memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TopicStore for MemoryTopicStore {
    fn list_saved(&self) -> Result<Vec<SavedTopic>, StoreError> {
        self.check()?;
        Ok(self
            .topics()
            .iter()
            .map(|(name, pairs)| SavedTopic {
                name: name.clone(),
                pairs: pairs.clone(),
            })
            .collect())
    }

    fn save(&self, name: &str, pairs: &[VocabularyPair]) -> Result<(), StoreError> {
        self.check()?;
        self.topics().insert(name.to_string(), pairs.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.check()?;
        self.topics().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_in_name_order() {
        let store = MemoryTopicStore::new();
        store
            .save("b", &[VocabularyPair::new("x", "y")])
            .unwrap();
        store
            .save("a", &[VocabularyPair::new("p", "q")])
            .unwrap();
        let names: Vec<String> = store
            .list_saved()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        store.delete("a").unwrap();
        assert_eq!(store.list_saved().unwrap().len(), 1);
    }

    #[test]
    fn forced_unavailability() {
        let store = MemoryTopicStore::with_topics([SavedTopic {
            name: "kept".into(),
            pairs: vec![],
        }]);
        store.set_unavailable(true);
        assert!(matches!(
            store.list_saved(),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.save("x", &[]).is_err());

        store.set_unavailable(false);
        assert_eq!(store.list_saved().unwrap()[0].name, "kept");
    }
}

//! vocabquiz-store — Persistent storage for user-saved topics.
//!
//! Both stores implement the core `TopicStore` trait: [`JsonTopicStore`]
//! keeps every saved topic in one JSON file, [`MemoryTopicStore`] keeps them
//! in process for tests and throwaway sessions.

pub mod json;
pub mod memory;

pub use json::JsonTopicStore;
pub use memory::MemoryTopicStore;

//! Answer ledger: the selected option text per question index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from question index to the text of the option the user picked.
///
/// Answers are stored by value rather than by option position, so scoring is
/// a plain string comparison against the question's correct answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerLedger {
    answers: BTreeMap<usize, String>,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for `index`.
    pub fn set(&mut self, index: usize, option: impl Into<String>) {
        self.answers.insert(index, option.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.answers.contains_key(&index)
    }

    /// Number of distinct questions that have an answer.
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Iterate answers in question order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.answers.iter().map(|(i, a)| (*i, a.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_one_entry_per_question() {
        let mut ledger = AnswerLedger::new();
        ledger.set(0, "con mèo");
        ledger.set(2, "chạy");
        ledger.set(0, "con chó");

        assert_eq!(ledger.answered_count(), 2);
        assert_eq!(ledger.get(0), Some("con chó"));
        assert!(ledger.is_answered(2));
        assert!(!ledger.is_answered(1));
        assert_eq!(ledger.get(1), None);
    }

    #[test]
    fn clear_empties_the_ledger() {
        let mut ledger = AnswerLedger::new();
        ledger.set(3, "nhảy");
        ledger.clear();
        assert_eq!(ledger.answered_count(), 0);
        assert_eq!(ledger.iter().count(), 0);
    }

    #[test]
    fn iterates_in_question_order() {
        let mut ledger = AnswerLedger::new();
        ledger.set(4, "d");
        ledger.set(1, "a");
        ledger.set(2, "b");
        let order: Vec<usize> = ledger.iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![1, 2, 4]);
    }
}

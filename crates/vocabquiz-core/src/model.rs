//! Core data model types for vocabquiz.
//!
//! These are the fundamental types that the entire vocabquiz system uses
//! to represent vocabulary pairs, quiz directions, questions, and topics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of usable pairs a quiz can be built from.
pub const MIN_QUIZ_PAIRS: usize = 4;

/// Number of questions offered by default when the source is large enough.
pub const DEFAULT_QUIZ_LENGTH: usize = 10;

/// Upper bound on the number of questions in one quiz.
pub const MAX_QUIZ_LENGTH: usize = 200;

/// One vocabulary entry linking an English word to its Vietnamese meaning.
///
/// Identity is positional within a list. Neither the word nor the meaning is
/// guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyPair {
    pub english_word: String,
    pub vietnamese_meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_description: Option<String>,
    /// IPA transcription, e.g. `/həˈloʊ/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl VocabularyPair {
    /// A bare pair with no optional metadata.
    pub fn new(english_word: impl Into<String>, vietnamese_meaning: impl Into<String>) -> Self {
        Self {
            english_word: english_word.into(),
            vietnamese_meaning: vietnamese_meaning.into(),
            english_description: None,
            phonetic: None,
            part_of_speech: None,
            examples: Vec::new(),
        }
    }
}

/// Which side of a pair is shown as the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizDirection {
    /// English word shown, Vietnamese meaning expected.
    #[default]
    EnToMeaning,
    /// Vietnamese meaning shown, English word expected.
    MeaningToEn,
    /// Each question independently picks one of the two directions above.
    Mixed,
}

impl fmt::Display for QuizDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizDirection::EnToMeaning => write!(f, "en-to-meaning"),
            QuizDirection::MeaningToEn => write!(f, "meaning-to-en"),
            QuizDirection::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for QuizDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en-to-meaning" | "en" | "en-vi" => Ok(QuizDirection::EnToMeaning),
            "meaning-to-en" | "vi" | "vi-en" => Ok(QuizDirection::MeaningToEn),
            "mixed" | "mix" => Ok(QuizDirection::Mixed),
            other => Err(format!("unknown quiz direction: {other}")),
        }
    }
}

/// A single multiple-choice question produced by the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question_text: String,
    /// Always four entries, in presentation order.
    pub options: Vec<String>,
    pub correct_answer: String,
    pub english_word: String,
    pub vietnamese_meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

impl QuizQuestion {
    /// Whether the English word is the prompt (as opposed to the meaning).
    pub fn asks_english_word(&self) -> bool {
        self.question_text == self.english_word && self.correct_answer == self.vietnamese_meaning
    }

    /// Whether the options had to be padded with placeholders.
    pub fn is_padded(&self) -> bool {
        self.options
            .iter()
            .any(|o| o == crate::synthesis::NO_OTHER_ANSWER || o == crate::synthesis::ELLIPSIS)
    }
}

/// A predefined topic: an identified, named vocabulary list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Stable identifier used for selection (e.g. `software_development`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pairs: Vec<VocabularyPair>,
}

/// A user-saved topic as held by the persistent topic store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTopic {
    pub name: String,
    pub pairs: Vec<VocabularyPair>,
}

/// Where a quiz's vocabulary came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceOrigin {
    Predefined { id: String },
    Saved,
    Custom,
    Generated,
}

/// A resolved vocabulary source ready for quiz setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSource {
    pub name: String,
    pub origin: SourceOrigin,
    pub pairs: Vec<VocabularyPair>,
}

impl QuizSource {
    /// Number of pairs available for a quiz from this source.
    pub fn available(&self) -> usize {
        self.pairs.len()
    }

    /// Default quiz length offered for this source.
    pub fn default_length(&self) -> usize {
        DEFAULT_QUIZ_LENGTH.min(self.max_length())
    }

    /// Longest quiz this source supports.
    pub fn max_length(&self) -> usize {
        self.available().min(MAX_QUIZ_LENGTH)
    }
}

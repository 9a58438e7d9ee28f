//! Flashcard study decks.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::VocabularyPair;

/// Which side of the pair is printed on the front of each card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlashcardMode {
    #[default]
    EnToMeaning,
    MeaningToEn,
}

impl fmt::Display for FlashcardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashcardMode::EnToMeaning => write!(f, "en-to-meaning"),
            FlashcardMode::MeaningToEn => write!(f, "meaning-to-en"),
        }
    }
}

impl FromStr for FlashcardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en-to-meaning" | "en" | "en-vi" => Ok(FlashcardMode::EnToMeaning),
            "meaning-to-en" | "vi" | "vi-en" => Ok(FlashcardMode::MeaningToEn),
            other => Err(format!("unknown flashcard mode: {other}")),
        }
    }
}

/// A shuffled selection of pairs studied one card at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDeck {
    cards: Vec<VocabularyPair>,
    mode: FlashcardMode,
    index: usize,
    flipped: bool,
}

impl FlashcardDeck {
    /// Shuffle `pairs` and keep `count` of them, clamped to `1..=pairs.len()`.
    ///
    /// Returns `None` when there is nothing to study.
    pub fn deal<R: Rng + ?Sized>(
        pairs: &[VocabularyPair],
        count: usize,
        mode: FlashcardMode,
        rng: &mut R,
    ) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let mut cards = pairs.to_vec();
        cards.shuffle(rng);
        cards.truncate(count.clamp(1, pairs.len()));
        Some(Self {
            cards,
            mode,
            index: 0,
            flipped: false,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> FlashcardMode {
        self.mode
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn current(&self) -> &VocabularyPair {
        &self.cards[self.index]
    }

    pub fn cards(&self) -> &[VocabularyPair] {
        &self.cards
    }

    /// Text on the front of the current card.
    pub fn front(&self) -> &str {
        let card = self.current();
        match self.mode {
            FlashcardMode::EnToMeaning => &card.english_word,
            FlashcardMode::MeaningToEn => &card.vietnamese_meaning,
        }
    }

    /// Text on the back of the current card.
    pub fn back(&self) -> &str {
        let card = self.current();
        match self.mode {
            FlashcardMode::EnToMeaning => &card.vietnamese_meaning,
            FlashcardMode::MeaningToEn => &card.english_word,
        }
    }

    /// The side currently facing the learner.
    pub fn visible(&self) -> &str {
        if self.flipped {
            self.back()
        } else {
            self.front()
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Move forward one card. Returns `false` on the last card.
    pub fn next(&mut self) -> bool {
        self.jump(self.index + 1)
    }

    /// Move back one card. Returns `false` on the first card.
    pub fn previous(&mut self) -> bool {
        match self.index.checked_sub(1) {
            Some(i) => self.jump(i),
            None => false,
        }
    }

    /// Go to card `index`, face up. Out-of-range jumps are ignored.
    pub fn jump(&mut self, index: usize) -> bool {
        if index >= self.cards.len() {
            return false;
        }
        self.index = index;
        self.flipped = false;
        true
    }

    /// `(index + 1) / len * 100`.
    pub fn progress_percent(&self) -> f64 {
        (self.index + 1) as f64 / self.cards.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pairs(n: usize) -> Vec<VocabularyPair> {
        (0..n)
            .map(|i| VocabularyPair::new(format!("word{i}"), format!("nghĩa {i}")))
            .collect()
    }

    #[test]
    fn count_is_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        let source = pairs(5);
        assert_eq!(
            FlashcardDeck::deal(&source, 0, FlashcardMode::EnToMeaning, &mut rng)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            FlashcardDeck::deal(&source, 99, FlashcardMode::EnToMeaning, &mut rng)
                .unwrap()
                .len(),
            5
        );
        assert!(FlashcardDeck::deal(&[], 3, FlashcardMode::EnToMeaning, &mut rng).is_none());
    }

    #[test]
    fn deal_draws_from_the_source() {
        let mut rng = StdRng::seed_from_u64(2);
        let source = pairs(8);
        let deck = FlashcardDeck::deal(&source, 4, FlashcardMode::EnToMeaning, &mut rng).unwrap();
        assert_eq!(deck.len(), 4);
        assert!(deck.cards().iter().all(|c| source.contains(c)));
    }

    #[test]
    fn sides_follow_mode() {
        let mut rng = StdRng::seed_from_u64(3);
        let source = pairs(1);
        let mut deck =
            FlashcardDeck::deal(&source, 1, FlashcardMode::MeaningToEn, &mut rng).unwrap();
        assert_eq!(deck.front(), "nghĩa 0");
        assert_eq!(deck.back(), "word0");
        assert_eq!(deck.visible(), "nghĩa 0");
        deck.flip();
        assert_eq!(deck.visible(), "word0");
    }

    #[test]
    fn navigation_is_bounded_and_unflips() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut deck =
            FlashcardDeck::deal(&pairs(3), 3, FlashcardMode::EnToMeaning, &mut rng).unwrap();

        assert!(!deck.previous());
        deck.flip();
        assert!(deck.next());
        assert_eq!(deck.index(), 1);
        assert!(!deck.is_flipped());
        assert!(deck.next());
        assert!(!deck.next());
        assert_eq!(deck.index(), 2);
        assert!((deck.progress_percent() - 100.0).abs() < f64::EPSILON);

        assert!(deck.jump(0));
        assert!(!deck.jump(3));
        assert_eq!(deck.index(), 0);
        assert!((deck.progress_percent() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn mode_parse() {
        assert_eq!("vi-en".parse::<FlashcardMode>().unwrap(), FlashcardMode::MeaningToEn);
        assert_eq!("EN".parse::<FlashcardMode>().unwrap(), FlashcardMode::EnToMeaning);
        assert!("mixed".parse::<FlashcardMode>().is_err());
    }
}

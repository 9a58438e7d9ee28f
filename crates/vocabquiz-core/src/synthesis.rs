//! Quiz synthesis engine.
//!
//! Turns vocabulary pairs into multiple-choice questions. The engine is
//! stateless: every call is independent and deterministic given its random
//! source, and it never fails. Inputs that are too small to supply three
//! distinct distractors are padded with fixed placeholders instead.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{QuizDirection, QuizQuestion, VocabularyPair};

/// Placeholder appended when a question has no distractor at all.
pub const NO_OTHER_ANSWER: &str = "No other answer available";

/// Placeholder used to fill the remaining option slots.
pub const ELLIPSIS: &str = "...";

/// Number of options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Shape of a meaning, used to keep distractors comparable to the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// A sentence-like explanation: more than four space-separated tokens,
    /// or containing a period or comma.
    Definition,
    /// A short translation of one or a few words.
    Gloss,
}

impl Register {
    pub fn classify(text: &str) -> Self {
        if text.split(' ').count() > 4 || text.contains('.') || text.contains(',') {
            Register::Definition
        } else {
            Register::Gloss
        }
    }
}

/// Direction of a single question after `Mixed` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveDirection {
    EnToMeaning,
    MeaningToEn,
}

/// Resolve the direction for one question. `Mixed` flips a fair coin.
pub fn resolve_direction<R: Rng + ?Sized>(
    direction: QuizDirection,
    rng: &mut R,
) -> EffectiveDirection {
    match direction {
        QuizDirection::EnToMeaning => EffectiveDirection::EnToMeaning,
        QuizDirection::MeaningToEn => EffectiveDirection::MeaningToEn,
        QuizDirection::Mixed => {
            if rng.gen_bool(0.5) {
                EffectiveDirection::EnToMeaning
            } else {
                EffectiveDirection::MeaningToEn
            }
        }
    }
}

/// Distractor pools built once over the whole input set.
struct Pools<'a> {
    definitions: Vec<&'a str>,
    glosses: Vec<&'a str>,
    english_words: Vec<&'a str>,
}

impl<'a> Pools<'a> {
    fn build(pairs: &'a [VocabularyPair]) -> Self {
        let mut definitions = Vec::new();
        let mut glosses = Vec::new();
        for pair in pairs {
            let meaning = pair.vietnamese_meaning.as_str();
            match Register::classify(meaning) {
                Register::Definition => definitions.push(meaning),
                Register::Gloss => glosses.push(meaning),
            }
        }
        Self {
            definitions,
            glosses,
            english_words: pairs.iter().map(|p| p.english_word.as_str()).collect(),
        }
    }

    fn meanings_like(&self, meaning: &str) -> &[&'a str] {
        match Register::classify(meaning) {
            Register::Definition => &self.definitions,
            Register::Gloss => &self.glosses,
        }
    }
}

/// Build one question per pair, in input order.
///
/// Shuffling the pairs themselves is the caller's job.
pub fn synthesize<R: Rng + ?Sized>(
    pairs: &[VocabularyPair],
    direction: QuizDirection,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let pools = Pools::build(pairs);

    let questions: Vec<QuizQuestion> = pairs
        .iter()
        .map(|pair| {
            let effective = resolve_direction(direction, rng);
            build_question(pair, effective, &pools, rng)
        })
        .collect();

    let padded = questions.iter().filter(|q| q.is_padded()).count();
    if padded > 0 {
        tracing::warn!(
            padded,
            total = questions.len(),
            "distractor pool exhausted, options padded with placeholders"
        );
    }

    questions
}

fn build_question<R: Rng + ?Sized>(
    pair: &VocabularyPair,
    direction: EffectiveDirection,
    pools: &Pools<'_>,
    rng: &mut R,
) -> QuizQuestion {
    let (question_text, correct_answer, pool) = match direction {
        EffectiveDirection::EnToMeaning => (
            &pair.english_word,
            &pair.vietnamese_meaning,
            pools.meanings_like(&pair.vietnamese_meaning),
        ),
        EffectiveDirection::MeaningToEn => (
            &pair.vietnamese_meaning,
            &pair.english_word,
            pools.english_words.as_slice(),
        ),
    };

    let mut options = Vec::with_capacity(OPTIONS_PER_QUESTION);
    options.push(correct_answer.clone());
    options.extend(draw_distractors(
        pool,
        correct_answer,
        OPTIONS_PER_QUESTION - 1,
        rng,
    ));
    pad_options(&mut options);
    options.shuffle(rng);

    QuizQuestion {
        question_text: question_text.clone(),
        options,
        correct_answer: correct_answer.clone(),
        english_word: pair.english_word.clone(),
        vietnamese_meaning: pair.vietnamese_meaning.clone(),
        phonetic: pair.phonetic.clone(),
        part_of_speech: pair.part_of_speech.clone(),
    }
}

/// Sample up to `count` distinct values from `pool`, never the correct answer.
pub fn draw_distractors<R: Rng + ?Sized>(
    pool: &[&str],
    correct_answer: &str,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = pool
        .iter()
        .copied()
        .filter(|c| *c != correct_answer && seen.insert(*c))
        .collect();

    candidates
        .choose_multiple(rng, count)
        .map(|c| (*c).to_string())
        .collect()
}

fn pad_options(options: &mut Vec<String>) {
    if options.len() < 2 {
        options.push(NO_OTHER_ANSWER.to_string());
    }
    while options.len() < OPTIONS_PER_QUESTION {
        options.push(ELLIPSIS.to_string());
    }
}

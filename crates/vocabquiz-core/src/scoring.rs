//! Scoring, feedback tiers, and per-question review.
//!
//! Everything here is a derived view over a list of questions and an
//! [`AnswerLedger`]. Nothing is cached: recompute whenever the inputs change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::AnswerLedger;
use crate::model::QuizQuestion;

/// Coarse feedback bucket for a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl FeedbackTier {
    /// Pick the tier for a percentage. Thresholds are evaluated top-down.
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            p if p >= 100 => FeedbackTier::Excellent,
            p if p >= 80 => FeedbackTier::Good,
            p if p >= 50 => FeedbackTier::Fair,
            _ => FeedbackTier::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "excellent",
            FeedbackTier::Good => "good",
            FeedbackTier::Fair => "fair",
            FeedbackTier::NeedsImprovement => "needs improvement",
        }
    }

    /// Short encouragement shown on the results screen.
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Perfect score! You know these words by heart.",
            FeedbackTier::Good => "Great job! Just a few words left to polish.",
            FeedbackTier::Fair => "Not bad. Review the missed words and try again.",
            FeedbackTier::NeedsImprovement => {
                "Keep practicing. Flashcards may help before the next try."
            }
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final score of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub tier: FeedbackTier,
}

impl QuizScore {
    pub fn compute(questions: &[QuizQuestion], ledger: &AnswerLedger) -> Self {
        let score = questions
            .iter()
            .enumerate()
            .filter(|(i, q)| ledger.get(*i) == Some(q.correct_answer.as_str()))
            .count();
        let total = questions.len();
        let percentage = percentage(score, total);

        Self {
            score,
            total,
            percentage,
            tier: FeedbackTier::for_percentage(percentage),
        }
    }
}

/// `round(100 * score / total)`, or 0 for an empty quiz.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * score as f64 / total as f64).round() as u32
}

/// Outcome of one question once the quiz has been submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Skipped,
}

/// Status of one question while the quiz is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Answered,
    Unanswered,
}

pub fn answer_status(ledger: &AnswerLedger, index: usize) -> AnswerStatus {
    if ledger.is_answered(index) {
        AnswerStatus::Answered
    } else {
        AnswerStatus::Unanswered
    }
}

/// One line of the results review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub index: usize,
    pub question_text: String,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen: Option<String>,
    pub outcome: AnswerOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
}

/// Build the per-question review for a submitted quiz.
pub fn review(questions: &[QuizQuestion], ledger: &AnswerLedger) -> Vec<ReviewItem> {
    questions
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let chosen = ledger.get(index);
            let outcome = match chosen {
                None => AnswerOutcome::Skipped,
                Some(c) if c == q.correct_answer => AnswerOutcome::Correct,
                Some(_) => AnswerOutcome::Incorrect,
            };
            ReviewItem {
                index,
                question_text: q.question_text.clone(),
                correct_answer: q.correct_answer.clone(),
                chosen: chosen.map(str::to_string),
                outcome,
                phonetic: q.phonetic.clone(),
            }
        })
        .collect()
}

//! Quiz report types with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::AnswerLedger;
use crate::model::{QuizDirection, QuizQuestion};
use crate::scoring::{review, QuizScore, ReviewItem};

/// A finished quiz, exported on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Topic the quiz was built from.
    pub topic: String,
    /// Direction the quiz was requested with.
    pub direction: QuizDirection,
    pub summary: QuizScore,
    /// One entry per question, in quiz order.
    pub review: Vec<ReviewItem>,
}

impl QuizReport {
    pub fn new(
        topic: impl Into<String>,
        direction: QuizDirection,
        questions: &[QuizQuestion],
        ledger: &AnswerLedger,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            topic: topic.into(),
            direction,
            summary: QuizScore::compute(questions, ledger),
            review: review(questions, ledger),
        }
    }

    /// Default file name: `quiz-<timestamp>-<first 8 hex digits of the id>.json`.
    pub fn file_name(&self) -> String {
        let id = self.id.simple().to_string();
        format!(
            "quiz-{}-{}.json",
            self.created_at.format("%Y%m%d-%H%M%S"),
            &id[..8]
        )
    }

    /// Save into `dir` under [`file_name`](Self::file_name), returning the path.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save_json(&path)?;
        Ok(path)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "quiz report saved");
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VocabularyPair;
    use crate::scoring::{AnswerOutcome, FeedbackTier};
    use crate::synthesis::synthesize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn finished_quiz() -> (Vec<QuizQuestion>, AnswerLedger) {
        let pairs = vec![
            VocabularyPair::new("cat", "con mèo"),
            VocabularyPair::new("dog", "con chó"),
            VocabularyPair::new("run", "chạy"),
            VocabularyPair::new("jump", "nhảy"),
        ];
        let mut rng = StdRng::seed_from_u64(8);
        let questions = synthesize(&pairs, QuizDirection::EnToMeaning, &mut rng);
        let mut ledger = AnswerLedger::new();
        ledger.set(0, questions[0].correct_answer.clone());
        ledger.set(1, questions[1].correct_answer.clone());
        ledger.set(2, questions[2].correct_answer.clone());
        (questions, ledger)
    }

    #[test]
    fn report_summarizes_attempt() {
        let (questions, ledger) = finished_quiz();
        let report = QuizReport::new("Animals", QuizDirection::EnToMeaning, &questions, &ledger);

        assert_eq!(report.summary.score, 3);
        assert_eq!(report.summary.percentage, 75);
        assert_eq!(report.summary.tier, FeedbackTier::Fair);
        assert_eq!(report.review.len(), 4);
        assert_eq!(report.review[3].outcome, AnswerOutcome::Skipped);
        assert!(report.file_name().starts_with("quiz-"));
        assert!(report.file_name().ends_with(".json"));
    }

    #[test]
    fn json_roundtrip() {
        let (questions, ledger) = finished_quiz();
        let report = QuizReport::new("Animals", QuizDirection::Mixed, &questions, &ledger);

        let dir = tempfile::tempdir().unwrap();
        let path = report.save_in(dir.path()).unwrap();
        let loaded = QuizReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.topic, "Animals");
        assert_eq!(loaded.direction, QuizDirection::Mixed);
        assert_eq!(loaded.summary, report.summary);
        assert_eq!(loaded.review, report.review);
    }

    #[test]
    fn exports_in_the_same_second_do_not_collide() {
        let (questions, ledger) = finished_quiz();
        let first = QuizReport::new("Animals", QuizDirection::Mixed, &questions, &ledger);
        let mut second = QuizReport::new("Animals", QuizDirection::Mixed, &questions, &ledger);
        second.created_at = first.created_at;

        let dir = tempfile::tempdir().unwrap();
        let a = first.save_in(dir.path()).unwrap();
        let b = second.save_in(dir.path()).unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(QuizReport::load_json(&a).unwrap().id, first.id);
        assert_eq!(QuizReport::load_json(&b).unwrap().id, second.id);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(QuizReport::load_json(&dir.path().join("nope.json")).is_err());
    }
}

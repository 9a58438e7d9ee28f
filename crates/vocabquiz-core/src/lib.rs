//! vocabquiz-core — Quiz synthesis, session state machine, and scoring.
//!
//! This crate defines the vocabulary data model, the multiple-choice quiz
//! engine, the session state machine that drives a learner through a quiz,
//! and the collaborator traits the other vocabquiz crates implement.

pub mod catalog;
pub mod driver;
pub mod error;
pub mod flashcard;
pub mod ledger;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod synthesis;
pub mod traits;

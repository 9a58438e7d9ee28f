//! End-to-end session tests: the real driver, the offline augmenter, and
//! both topic stores wired together the way `vocabquiz play` wires them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use vocabquiz_core::catalog::TopicCatalog;
use vocabquiz_core::driver::{DriverConfig, SessionDriver};
use vocabquiz_core::error::AugmentError;
use vocabquiz_core::flashcard::FlashcardMode;
use vocabquiz_core::model::{QuizDirection, SavedTopic, VocabularyPair};
use vocabquiz_core::scoring::FeedbackTier;
use vocabquiz_core::session::{Event, Session, SessionState, TopicChoice};
use vocabquiz_core::traits::TopicStore;
use vocabquiz_providers::MockAugmenter;
use vocabquiz_store::{JsonTopicStore, MemoryTopicStore};

fn fast() -> DriverConfig {
    DriverConfig {
        loading_delay: Duration::ZERO,
        max_retries: 0,
        retry_delay: Duration::ZERO,
    }
}

fn driver(augmenter: MockAugmenter, store: Arc<dyn TopicStore>) -> SessionDriver {
    let session = Session::with_seed(TopicCatalog::builtin().unwrap(), 42);
    SessionDriver::new(session, Arc::new(augmenter), store, fast())
}

fn pets() -> SavedTopic {
    SavedTopic {
        name: "Pets".into(),
        pairs: vec![
            VocabularyPair::new("cat", "con mèo"),
            VocabularyPair::new("dog", "con chó"),
            VocabularyPair::new("fish", "con cá"),
            VocabularyPair::new("bird", "con chim"),
            VocabularyPair::new("rabbit", "con thỏ"),
        ],
    }
}

async fn send(driver: &mut SessionDriver, event: Event) {
    driver.dispatch(event);
    driver.settle().await;
}

/// Answer every question correctly, then submit.
async fn answer_all(driver: &mut SessionDriver) {
    let SessionState::Quiz(attempt) = driver.state().clone() else {
        panic!("expected quiz, got {}", driver.state().name());
    };
    for (i, question) in attempt.questions.iter().enumerate() {
        let option = question
            .options
            .iter()
            .position(|o| *o == question.correct_answer)
            .unwrap();
        send(driver, Event::Navigate(i)).await;
        send(driver, Event::Answer { option }).await;
    }
    send(driver, Event::Submit).await;
}

#[tokio::test]
async fn e2e_predefined_topic_perfect_score() {
    let mut d = driver(MockAugmenter::new(), Arc::new(MemoryTopicStore::new()));

    send(
        &mut d,
        Event::ChooseTopic(TopicChoice::Predefined("software_development".into())),
    )
    .await;
    send(
        &mut d,
        Event::StartQuiz {
            direction: QuizDirection::EnToMeaning,
            length: 5,
        },
    )
    .await;
    answer_all(&mut d).await;

    let SessionState::Results(attempt) = d.state() else {
        panic!("expected results, got {}", d.state().name());
    };
    let score = attempt.score();
    assert_eq!(score.score, 5);
    assert_eq!(score.total, 5);
    assert_eq!(score.percentage, 100);
    assert_eq!(score.tier, FeedbackTier::Excellent);
    assert!(d.is_idle());
}

#[tokio::test]
async fn e2e_retry_rebuilds_with_mixed_directions() {
    let mut d = driver(MockAugmenter::new(), Arc::new(MemoryTopicStore::new()));

    send(
        &mut d,
        Event::ChooseTopic(TopicChoice::Predefined("banking_fintech".into())),
    )
    .await;
    send(
        &mut d,
        Event::StartQuiz {
            direction: QuizDirection::MeaningToEn,
            length: 4,
        },
    )
    .await;
    send(&mut d, Event::Submit).await;
    send(&mut d, Event::ConfirmSubmit).await;
    assert!(matches!(d.state(), SessionState::Results(_)));

    send(&mut d, Event::Retry).await;
    match d.state() {
        SessionState::Quiz(attempt) => {
            assert_eq!(attempt.direction, QuizDirection::Mixed);
            assert_eq!(attempt.questions.len(), 4);
            assert_eq!(attempt.unanswered_count(), 4);
        }
        other => panic!("unexpected state {}", other.name()),
    }
}

#[tokio::test]
async fn e2e_custom_list_gets_phonetics() {
    let augmenter = MockAugmenter::new();
    let mut d = driver(augmenter, Arc::new(MemoryTopicStore::new()));

    send(&mut d, Event::ChooseTopic(TopicChoice::Custom)).await;
    send(
        &mut d,
        Event::SubmitCustomTopic {
            name: "Verbs".into(),
            text: "run - chạy\njump - nhảy\nswim - bơi\nread - đọc\n".into(),
        },
    )
    .await;

    match d.state() {
        SessionState::QuizSetup { source } => {
            assert_eq!(source.name, "Verbs");
            assert_eq!(source.available(), 4);
            assert_eq!(source.pairs[0].phonetic.as_deref(), Some("/run/"));
        }
        other => panic!("unexpected state {}", other.name()),
    }
}

#[tokio::test]
async fn e2e_augmenter_failure_returns_to_setup() {
    let augmenter = MockAugmenter::failing(AugmentError::AuthenticationFailed("bad key".into()));
    let mut d = driver(augmenter, Arc::new(MemoryTopicStore::new()));

    send(&mut d, Event::ChooseTopic(TopicChoice::Custom)).await;
    send(
        &mut d,
        Event::SubmitCustomTopic {
            name: "Verbs".into(),
            text: "run - chạy\njump - nhảy\nswim - bơi\nread - đọc\n".into(),
        },
    )
    .await;

    assert!(matches!(d.state(), SessionState::CustomTopicSetup { .. }));
    assert!(d.state().error().is_some());
}

#[tokio::test]
async fn e2e_generate_save_and_quiz_from_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topics.json");
    let store: Arc<dyn TopicStore> = Arc::new(JsonTopicStore::new(&path));

    let mut table = HashMap::new();
    table.insert("knife".to_string(), "con dao".to_string());
    let mut d = driver(MockAugmenter::with_meanings(table), store);

    send(&mut d, Event::ChooseTopic(TopicChoice::KeywordGenerator)).await;
    send(
        &mut d,
        Event::GenerateMeanings {
            name: "Kitchen".into(),
            keywords: "knife\npan\nbowl\nspoon\n".into(),
            context: Some("cooking".into()),
        },
    )
    .await;
    match d.state() {
        SessionState::KeywordGeneratorSetup { generated, .. } => {
            assert_eq!(generated.len(), 4);
            assert_eq!(generated[0].vietnamese_meaning, "con dao");
            assert_eq!(generated[1].vietnamese_meaning, "nghĩa của pan");
        }
        other => panic!("unexpected state {}", other.name()),
    }

    send(&mut d, Event::SaveGenerated).await;
    match d.state() {
        SessionState::SavedTopicsManager { topics, .. } => {
            assert_eq!(topics.len(), 1);
            assert_eq!(topics[0].name, "Kitchen");
        }
        other => panic!("unexpected state {}", other.name()),
    }

    // A fresh store sees the same file.
    let reopened = JsonTopicStore::new(&path).list_saved().unwrap();
    assert_eq!(reopened[0].pairs.len(), 4);

    send(&mut d, Event::UseSaved("Kitchen".into())).await;
    send(
        &mut d,
        Event::StartQuiz {
            direction: QuizDirection::Mixed,
            length: 4,
        },
    )
    .await;
    answer_all(&mut d).await;
    let SessionState::Results(attempt) = d.state() else {
        panic!("expected results, got {}", d.state().name());
    };
    assert_eq!(attempt.score().percentage, 100);
}

#[tokio::test]
async fn e2e_edit_renames_saved_topic() {
    let store = Arc::new(MemoryTopicStore::with_topics([pets()]));
    let mut d = driver(MockAugmenter::new(), store.clone());

    send(&mut d, Event::ChooseTopic(TopicChoice::SavedTopics)).await;
    send(&mut d, Event::EditSaved("Pets".into())).await;
    send(
        &mut d,
        Event::GenerateEdited {
            name: "Animals".into(),
            words: "cat\ndog\nhorse\ncow\n".into(),
        },
    )
    .await;
    send(
        &mut d,
        Event::SaveEdited {
            name: "Animals".into(),
        },
    )
    .await;

    assert!(matches!(d.state(), SessionState::SavedTopicsManager { .. }));
    let names: Vec<String> = store
        .list_saved()
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Animals"]);
}

#[tokio::test]
async fn e2e_delete_requires_confirmation() {
    let store = Arc::new(MemoryTopicStore::with_topics([pets()]));
    let mut d = driver(MockAugmenter::new(), store.clone());

    send(&mut d, Event::ChooseTopic(TopicChoice::SavedTopics)).await;
    send(&mut d, Event::RequestDelete("Pets".into())).await;
    send(&mut d, Event::CancelDelete).await;
    assert_eq!(store.list_saved().unwrap().len(), 1);

    send(&mut d, Event::RequestDelete("Pets".into())).await;
    send(&mut d, Event::ConfirmDelete).await;
    assert!(store.list_saved().unwrap().is_empty());
    match d.state() {
        SessionState::SavedTopicsManager { topics, .. } => assert!(topics.is_empty()),
        other => panic!("unexpected state {}", other.name()),
    }
}

#[tokio::test]
async fn e2e_flashcards_from_saved_topic() {
    let store = Arc::new(MemoryTopicStore::with_topics([pets()]));
    let mut d = driver(MockAugmenter::new(), store);

    send(&mut d, Event::ChooseTopic(TopicChoice::SavedTopics)).await;
    send(&mut d, Event::FlashcardsFor("Pets".into())).await;
    send(
        &mut d,
        Event::StartFlashcards {
            count: 3,
            mode: FlashcardMode::MeaningToEn,
        },
    )
    .await;
    send(&mut d, Event::FlipCard).await;
    send(&mut d, Event::NextCard).await;

    match d.state() {
        SessionState::Flashcard { topic_name, deck } => {
            assert_eq!(topic_name, "Pets");
            assert_eq!(deck.len(), 3);
            assert_eq!(deck.index(), 1);
            assert!(!deck.is_flipped());
        }
        other => panic!("unexpected state {}", other.name()),
    }

    send(&mut d, Event::Back).await;
    assert!(matches!(d.state(), SessionState::SavedTopicsManager { .. }));
}

#[tokio::test]
async fn e2e_unavailable_store_reports_on_home() {
    let store = Arc::new(MemoryTopicStore::new());
    store.set_unavailable(true);
    let mut d = driver(MockAugmenter::new(), store);

    send(&mut d, Event::ChooseTopic(TopicChoice::SavedTopics)).await;
    assert!(matches!(d.state(), SessionState::TopicSelection { .. }));
    assert!(d.state().error().is_some());
}

//! Session state machine.
//!
//! A [`Session`] owns the current [`SessionState`] and advances it one
//! [`Event`] at a time through [`Session::dispatch`]. The session never
//! performs I/O itself: whenever a collaborator is needed it enters
//! [`SessionState::Loading`] and hands back a [`Command`] tagged with a fresh
//! ticket. The matching completion event must carry the same ticket; anything
//! else is stale and dropped.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use uuid::Uuid;

use crate::catalog::TopicCatalog;
use crate::error::{AugmentError, QuizError, StoreError};
use crate::flashcard::{FlashcardDeck, FlashcardMode};
use crate::ledger::AnswerLedger;
use crate::model::{
    QuizDirection, QuizQuestion, QuizSource, SavedTopic, SourceOrigin, VocabularyPair,
    MAX_QUIZ_LENGTH, MIN_QUIZ_PAIRS,
};
use crate::parser::{parse_custom_list, parse_keywords};
use crate::report::QuizReport;
use crate::scoring::{answer_status, review, AnswerStatus, QuizScore, ReviewItem};
use crate::synthesis::synthesize;

/// Identifies one outstanding collaborator request.
pub type Ticket = Uuid;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One quiz in progress (or just finished).
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    pub topic_name: String,
    pub direction: QuizDirection,
    /// The shuffled, truncated pairs the questions were built from. Retry
    /// rebuilds from exactly these.
    pub pairs: Vec<VocabularyPair>,
    pub questions: Vec<QuizQuestion>,
    pub current: usize,
    pub ledger: AnswerLedger,
    /// Set while the learner is asked to confirm submitting with gaps.
    pub confirming_submit: bool,
}

impl QuizAttempt {
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    pub fn all_answered(&self) -> bool {
        (0..self.questions.len()).all(|i| self.ledger.is_answered(i))
    }

    pub fn unanswered_count(&self) -> usize {
        (0..self.questions.len())
            .filter(|i| !self.ledger.is_answered(*i))
            .count()
    }

    pub fn status(&self, index: usize) -> AnswerStatus {
        answer_status(&self.ledger, index)
    }

    pub fn score(&self) -> QuizScore {
        QuizScore::compute(&self.questions, &self.ledger)
    }

    pub fn review(&self) -> Vec<ReviewItem> {
        review(&self.questions, &self.ledger)
    }

    pub fn report(&self) -> QuizReport {
        QuizReport::new(
            self.topic_name.clone(),
            self.direction,
            &self.questions,
            &self.ledger,
        )
    }
}

/// Editable copy of a saved topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDraft {
    pub original_name: String,
    pub name: String,
    pub words: Vec<String>,
    /// Pairs produced by the last successful generation. Saving requires it.
    pub generated: Vec<VocabularyPair>,
    pub error: Option<String>,
}

/// What a [`SessionState::Loading`] state is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp {
    /// Build a quiz once the presentation delay has elapsed. `length` is
    /// `None` on retry, where the pairs are already truncated.
    BuildQuiz {
        topic_name: String,
        pairs: Vec<VocabularyPair>,
        direction: QuizDirection,
        length: Option<usize>,
    },
    Phonetics { topic_name: String },
    Meanings,
    LoadSavedTopics,
    SaveTopic { name: String },
    DeleteTopic { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    TopicSelection {
        error: Option<String>,
    },
    CustomTopicSetup {
        error: Option<String>,
    },
    KeywordGeneratorSetup {
        name: String,
        context: Option<String>,
        generated: Vec<VocabularyPair>,
        error: Option<String>,
    },
    QuizSetup {
        source: QuizSource,
    },
    Loading {
        message: String,
        ticket: Ticket,
        op: PendingOp,
        /// The screen that started the request, restored on failure.
        origin: Box<SessionState>,
    },
    Quiz(QuizAttempt),
    Results(QuizAttempt),
    SavedTopicsManager {
        topics: Vec<SavedTopic>,
        confirm_delete: Option<String>,
        error: Option<String>,
    },
    EditTopic(TopicDraft),
    FlashcardSetup {
        topic_name: String,
        pairs: Vec<VocabularyPair>,
    },
    Flashcard {
        topic_name: String,
        deck: FlashcardDeck,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::home()
    }
}

impl SessionState {
    pub fn home() -> Self {
        SessionState::TopicSelection { error: None }
    }

    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::TopicSelection { .. } => "topic_selection",
            SessionState::CustomTopicSetup { .. } => "custom_topic_setup",
            SessionState::KeywordGeneratorSetup { .. } => "keyword_generator_setup",
            SessionState::QuizSetup { .. } => "quiz_setup",
            SessionState::Loading { .. } => "loading",
            SessionState::Quiz(_) => "quiz",
            SessionState::Results(_) => "results",
            SessionState::SavedTopicsManager { .. } => "saved_topics_manager",
            SessionState::EditTopic(_) => "edit_topic",
            SessionState::FlashcardSetup { .. } => "flashcard_setup",
            SessionState::Flashcard { .. } => "flashcard",
        }
    }

    /// The error message shown on this screen, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::TopicSelection { error }
            | SessionState::CustomTopicSetup { error }
            | SessionState::KeywordGeneratorSetup { error, .. }
            | SessionState::SavedTopicsManager { error, .. } => error.as_deref(),
            SessionState::EditTopic(draft) => draft.error.as_deref(),
            _ => None,
        }
    }

    /// The same screen carrying `message`. Screens without an error slot fall
    /// back to topic selection.
    fn with_error(self, message: impl Into<String>) -> Self {
        let error = Some(message.into());
        match self {
            SessionState::CustomTopicSetup { .. } => SessionState::CustomTopicSetup { error },
            SessionState::KeywordGeneratorSetup {
                name,
                context,
                generated,
                ..
            } => SessionState::KeywordGeneratorSetup {
                name,
                context,
                generated,
                error,
            },
            SessionState::SavedTopicsManager { topics, .. } => SessionState::SavedTopicsManager {
                topics,
                confirm_delete: None,
                error,
            },
            SessionState::EditTopic(mut draft) => {
                draft.error = error;
                SessionState::EditTopic(draft)
            }
            _ => SessionState::TopicSelection { error },
        }
    }

    fn without_error(self) -> Self {
        match self {
            SessionState::TopicSelection { .. } => SessionState::home(),
            SessionState::CustomTopicSetup { .. } => SessionState::CustomTopicSetup { error: None },
            SessionState::KeywordGeneratorSetup {
                name,
                context,
                generated,
                ..
            } => SessionState::KeywordGeneratorSetup {
                name,
                context,
                generated,
                error: None,
            },
            SessionState::SavedTopicsManager {
                topics,
                confirm_delete,
                ..
            } => SessionState::SavedTopicsManager {
                topics,
                confirm_delete,
                error: None,
            },
            SessionState::EditTopic(mut draft) => {
                draft.error = None;
                SessionState::EditTopic(draft)
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Events and commands
// ---------------------------------------------------------------------------

/// Entry chosen on the topic selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicChoice {
    Predefined(String),
    Custom,
    KeywordGenerator,
    SavedTopics,
}

/// Everything that can happen to a session: learner input and collaborator
/// completions.
#[derive(Debug, Clone)]
pub enum Event {
    Home,
    Back,
    ChooseTopic(TopicChoice),

    SubmitCustomTopic {
        name: String,
        text: String,
    },
    GenerateMeanings {
        name: String,
        keywords: String,
        context: Option<String>,
    },
    UseGenerated,
    SaveGenerated,

    StartQuiz {
        direction: QuizDirection,
        length: usize,
    },
    Navigate(usize),
    /// Select option `option` (0-based) of the current question.
    Answer {
        option: usize,
    },
    Submit,
    ConfirmSubmit,
    CancelSubmit,
    Retry,

    UseSaved(String),
    FlashcardsFor(String),
    EditSaved(String),
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,

    GenerateEdited {
        name: String,
        words: String,
    },
    SaveEdited {
        name: String,
    },

    StartFlashcards {
        count: usize,
        mode: FlashcardMode,
    },
    FlipCard,
    NextCard,
    PreviousCard,
    JumpToCard(usize),

    VocabularyReady {
        ticket: Ticket,
    },
    PhoneticsReady {
        ticket: Ticket,
        result: Result<Vec<VocabularyPair>, AugmentError>,
    },
    MeaningsReady {
        ticket: Ticket,
        result: Result<Vec<VocabularyPair>, AugmentError>,
    },
    SavedTopicsLoaded {
        ticket: Ticket,
        result: Result<Vec<SavedTopic>, StoreError>,
    },
    TopicSaved {
        ticket: Ticket,
        result: Result<(), StoreError>,
    },
    TopicDeleted {
        ticket: Ticket,
        result: Result<(), StoreError>,
    },
}

impl Event {
    /// The ticket of a completion event, `None` for learner input.
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Event::VocabularyReady { ticket }
            | Event::PhoneticsReady { ticket, .. }
            | Event::MeaningsReady { ticket, .. }
            | Event::SavedTopicsLoaded { ticket, .. }
            | Event::TopicSaved { ticket, .. }
            | Event::TopicDeleted { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

/// A collaborator request emitted by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Wait out the loading delay, then answer with [`Event::VocabularyReady`].
    PrepareQuiz { ticket: Ticket },
    AugmentPhonetics {
        ticket: Ticket,
        pairs: Vec<VocabularyPair>,
    },
    AugmentMeanings {
        ticket: Ticket,
        words: Vec<String>,
        context: Option<String>,
    },
    LoadSavedTopics { ticket: Ticket },
    /// Save `pairs` under `name`; when `replacing` is set, delete that topic
    /// afterwards.
    SaveTopic {
        ticket: Ticket,
        name: String,
        pairs: Vec<VocabularyPair>,
        replacing: Option<String>,
    },
    DeleteTopic { ticket: Ticket, name: String },
}

impl Command {
    pub fn ticket(&self) -> Ticket {
        match self {
            Command::PrepareQuiz { ticket }
            | Command::AugmentPhonetics { ticket, .. }
            | Command::AugmentMeanings { ticket, .. }
            | Command::LoadSavedTopics { ticket }
            | Command::SaveTopic { ticket, .. }
            | Command::DeleteTopic { ticket, .. } => *ticket,
        }
    }
}

type Step = (SessionState, Option<Command>);

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The state machine driving one learner through topic selection, quizzes,
/// results and the topic management screens.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    catalog: TopicCatalog,
    rng: StdRng,
}

impl Session {
    pub fn new(catalog: TopicCatalog, rng: StdRng) -> Self {
        Self {
            state: SessionState::home(),
            catalog,
            rng,
        }
    }

    /// A session with a reproducible random source.
    pub fn with_seed(catalog: TopicCatalog, seed: u64) -> Self {
        Self::new(catalog, StdRng::seed_from_u64(seed))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    /// Ticket of the collaborator request the session is waiting on.
    pub fn pending_ticket(&self) -> Option<Ticket> {
        match &self.state {
            SessionState::Loading { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// Apply one event. Returns the collaborator request to run next, if any.
    pub fn dispatch(&mut self, event: Event) -> Option<Command> {
        let current = std::mem::take(&mut self.state);
        let from = current.name();
        let (next, command) = self.step(current, event);
        tracing::debug!(from, to = next.name(), "session transition");
        self.state = next;
        command
    }

    fn step(&mut self, state: SessionState, event: Event) -> Step {
        if let Event::Home = event {
            return (SessionState::home(), None);
        }

        match state {
            SessionState::Loading {
                message,
                ticket,
                op,
                origin,
            } => match event.ticket() {
                Some(t) if t == ticket => self.complete(message, ticket, op, *origin, event),
                Some(t) => {
                    tracing::warn!(ticket = %t, "dropping stale completion");
                    (
                        SessionState::Loading {
                            message,
                            ticket,
                            op,
                            origin,
                        },
                        None,
                    )
                }
                None => {
                    tracing::debug!(?event, "input ignored while loading");
                    (
                        SessionState::Loading {
                            message,
                            ticket,
                            op,
                            origin,
                        },
                        None,
                    )
                }
            },
            state if event.ticket().is_some() => {
                tracing::warn!(state = state.name(), "dropping completion with no pending request");
                (state, None)
            }
            SessionState::TopicSelection { error } => self.on_topic_selection(error, event),
            SessionState::CustomTopicSetup { error } => self.on_custom_setup(error, event),
            SessionState::KeywordGeneratorSetup {
                name,
                context,
                generated,
                error,
            } => self.on_keyword_setup(name, context, generated, error, event),
            SessionState::QuizSetup { source } => self.on_quiz_setup(source, event),
            SessionState::Quiz(attempt) => self.on_quiz(attempt, event),
            SessionState::Results(attempt) => self.on_results(attempt, event),
            SessionState::SavedTopicsManager {
                topics,
                confirm_delete,
                error,
            } => self.on_saved_topics(topics, confirm_delete, error, event),
            SessionState::EditTopic(draft) => self.on_edit(draft, event),
            SessionState::FlashcardSetup { topic_name, pairs } => {
                self.on_flashcard_setup(topic_name, pairs, event)
            }
            SessionState::Flashcard { topic_name, deck } => {
                self.on_flashcard(topic_name, deck, event)
            }
        }
    }

    /// Enter `Loading` and emit the command built for the new ticket.
    fn begin(
        &mut self,
        message: impl Into<String>,
        op: PendingOp,
        origin: SessionState,
        command: impl FnOnce(Ticket) -> Command,
    ) -> Step {
        let ticket = Uuid::new_v4();
        let state = SessionState::Loading {
            message: message.into(),
            ticket,
            op,
            origin: Box::new(origin.without_error()),
        };
        (state, Some(command(ticket)))
    }

    fn reload_saved_topics(&mut self) -> Step {
        self.begin(
            "Loading saved topics...",
            PendingOp::LoadSavedTopics,
            SessionState::home(),
            |ticket| Command::LoadSavedTopics { ticket },
        )
    }

    // -- screens ------------------------------------------------------------

    fn on_topic_selection(&mut self, error: Option<String>, event: Event) -> Step {
        let Event::ChooseTopic(choice) = event else {
            return (SessionState::TopicSelection { error }, None);
        };
        match choice {
            TopicChoice::Predefined(id) => match self.catalog.resolve(&id) {
                Some(topic) => {
                    let source = QuizSource {
                        name: topic.name.clone(),
                        origin: SourceOrigin::Predefined { id },
                        pairs: topic.pairs.clone(),
                    };
                    (SessionState::QuizSetup { source }, None)
                }
                None => (
                    SessionState::home().with_error(QuizError::TopicNotFound(id).to_string()),
                    None,
                ),
            },
            TopicChoice::Custom => (SessionState::CustomTopicSetup { error: None }, None),
            TopicChoice::KeywordGenerator => (
                SessionState::KeywordGeneratorSetup {
                    name: String::new(),
                    context: None,
                    generated: Vec::new(),
                    error: None,
                },
                None,
            ),
            TopicChoice::SavedTopics => self.reload_saved_topics(),
        }
    }

    fn on_custom_setup(&mut self, error: Option<String>, event: Event) -> Step {
        match event {
            Event::Back => (SessionState::home(), None),
            Event::SubmitCustomTopic { name, text } => {
                let origin = SessionState::CustomTopicSetup { error: None };
                let name = name.trim().to_string();
                if name.is_empty() {
                    return (origin.with_error(QuizError::MissingTopicName.to_string()), None);
                }
                let pairs = parse_custom_list(&text);
                if pairs.is_empty() {
                    return (origin.with_error(QuizError::NoValidPairs.to_string()), None);
                }
                if pairs.len() < MIN_QUIZ_PAIRS {
                    let err = QuizError::InsufficientVocabulary {
                        available: pairs.len(),
                        required: MIN_QUIZ_PAIRS,
                    };
                    return (origin.with_error(err.to_string()), None);
                }
                self.begin(
                    "Generating phonetics for your vocabulary...",
                    PendingOp::Phonetics { topic_name: name },
                    origin,
                    |ticket| Command::AugmentPhonetics { ticket, pairs },
                )
            }
            _ => (SessionState::CustomTopicSetup { error }, None),
        }
    }

    fn on_keyword_setup(
        &mut self,
        name: String,
        context: Option<String>,
        generated: Vec<VocabularyPair>,
        error: Option<String>,
        event: Event,
    ) -> Step {
        let state = SessionState::KeywordGeneratorSetup {
            name,
            context,
            generated,
            error,
        };
        match (state, event) {
            (_, Event::Back) => (SessionState::home(), None),
            (
                SessionState::KeywordGeneratorSetup { generated, .. },
                Event::GenerateMeanings {
                    name,
                    keywords,
                    context,
                },
            ) => {
                let name = name.trim().to_string();
                let context = context
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty());
                let origin = SessionState::KeywordGeneratorSetup {
                    name: name.clone(),
                    context: context.clone(),
                    generated,
                    error: None,
                };
                if name.is_empty() {
                    return (origin.with_error(QuizError::MissingTopicName.to_string()), None);
                }
                let words = parse_keywords(&keywords);
                if words.len() < MIN_QUIZ_PAIRS {
                    let err = QuizError::NotEnoughKeywords {
                        available: words.len(),
                        required: MIN_QUIZ_PAIRS,
                    };
                    return (origin.with_error(err.to_string()), None);
                }
                self.begin(
                    "Generating Vietnamese meanings...",
                    PendingOp::Meanings,
                    origin,
                    |ticket| Command::AugmentMeanings {
                        ticket,
                        words,
                        context,
                    },
                )
            }
            (
                SessionState::KeywordGeneratorSetup {
                    name,
                    context,
                    generated,
                    ..
                },
                Event::UseGenerated,
            ) => {
                let state = SessionState::KeywordGeneratorSetup {
                    name: name.clone(),
                    context,
                    generated: generated.clone(),
                    error: None,
                };
                if generated.is_empty() {
                    return (state.with_error(QuizError::NothingGenerated.to_string()), None);
                }
                if generated.len() < MIN_QUIZ_PAIRS {
                    let err = QuizError::InsufficientVocabulary {
                        available: generated.len(),
                        required: MIN_QUIZ_PAIRS,
                    };
                    return (state.with_error(err.to_string()), None);
                }
                let source = QuizSource {
                    name,
                    origin: SourceOrigin::Generated,
                    pairs: generated,
                };
                (SessionState::QuizSetup { source }, None)
            }
            (
                SessionState::KeywordGeneratorSetup {
                    name,
                    context,
                    generated,
                    ..
                },
                Event::SaveGenerated,
            ) => {
                let origin = SessionState::KeywordGeneratorSetup {
                    name: name.clone(),
                    context,
                    generated: generated.clone(),
                    error: None,
                };
                if generated.is_empty() {
                    return (origin.with_error(QuizError::NothingGenerated.to_string()), None);
                }
                if name.is_empty() {
                    return (origin.with_error(QuizError::MissingTopicName.to_string()), None);
                }
                self.begin(
                    format!("Saving topic '{name}'..."),
                    PendingOp::SaveTopic { name: name.clone() },
                    origin,
                    |ticket| Command::SaveTopic {
                        ticket,
                        name,
                        pairs: generated,
                        replacing: None,
                    },
                )
            }
            (state, _) => (state, None),
        }
    }

    fn on_quiz_setup(&mut self, source: QuizSource, event: Event) -> Step {
        match event {
            Event::Back => (SessionState::home(), None),
            Event::StartQuiz { direction, length } => {
                let op = PendingOp::BuildQuiz {
                    topic_name: source.name.clone(),
                    pairs: source.pairs.clone(),
                    direction,
                    length: Some(length),
                };
                let message = format!("Building questions for '{}'...", source.name);
                self.begin(message, op, SessionState::QuizSetup { source }, |ticket| {
                    Command::PrepareQuiz { ticket }
                })
            }
            _ => (SessionState::QuizSetup { source }, None),
        }
    }

    fn on_quiz(&mut self, mut attempt: QuizAttempt, event: Event) -> Step {
        if attempt.confirming_submit {
            match event {
                Event::ConfirmSubmit => {
                    attempt.confirming_submit = false;
                    return (SessionState::Results(attempt), None);
                }
                Event::CancelSubmit => attempt.confirming_submit = false,
                _ => {}
            }
            return (SessionState::Quiz(attempt), None);
        }

        match event {
            Event::Navigate(index) if index < attempt.questions.len() => {
                attempt.current = index;
            }
            Event::Answer { option } => {
                let chosen = attempt
                    .current_question()
                    .and_then(|q| q.options.get(option))
                    .cloned();
                if let Some(chosen) = chosen {
                    attempt.ledger.set(attempt.current, chosen);
                }
            }
            Event::Submit => {
                if attempt.all_answered() {
                    return (SessionState::Results(attempt), None);
                }
                attempt.confirming_submit = true;
            }
            _ => {}
        }
        (SessionState::Quiz(attempt), None)
    }

    fn on_results(&mut self, mut attempt: QuizAttempt, event: Event) -> Step {
        match event {
            Event::Retry => {
                let op = PendingOp::BuildQuiz {
                    topic_name: attempt.topic_name.clone(),
                    pairs: attempt.pairs.clone(),
                    direction: QuizDirection::Mixed,
                    length: None,
                };
                let message = format!("Rebuilding questions for '{}'...", attempt.topic_name);
                self.begin(message, op, SessionState::Results(attempt), |ticket| {
                    Command::PrepareQuiz { ticket }
                })
            }
            Event::Navigate(index) if index < attempt.questions.len() => {
                attempt.current = index;
                (SessionState::Results(attempt), None)
            }
            _ => (SessionState::Results(attempt), None),
        }
    }

    fn on_saved_topics(
        &mut self,
        topics: Vec<SavedTopic>,
        confirm_delete: Option<String>,
        error: Option<String>,
        event: Event,
    ) -> Step {
        let find = |name: &str| topics.iter().find(|t| t.name == name).cloned();
        let unavailable = |name: String| QuizError::TopicUnavailable(name).to_string();

        match event {
            Event::Back => (SessionState::home(), None),
            Event::UseSaved(name) => match find(&name) {
                Some(topic) => {
                    let source = QuizSource {
                        name: topic.name,
                        origin: SourceOrigin::Saved,
                        pairs: topic.pairs,
                    };
                    (SessionState::QuizSetup { source }, None)
                }
                None => (manager(topics).with_error(unavailable(name)), None),
            },
            Event::FlashcardsFor(name) => match find(&name) {
                Some(topic) if !topic.pairs.is_empty() => (
                    SessionState::FlashcardSetup {
                        topic_name: topic.name,
                        pairs: topic.pairs,
                    },
                    None,
                ),
                _ => (manager(topics).with_error(unavailable(name)), None),
            },
            Event::EditSaved(name) => match find(&name) {
                Some(topic) => (
                    SessionState::EditTopic(TopicDraft {
                        original_name: topic.name.clone(),
                        name: topic.name,
                        words: topic.pairs.into_iter().map(|p| p.english_word).collect(),
                        generated: Vec::new(),
                        error: None,
                    }),
                    None,
                ),
                None => (manager(topics).with_error(unavailable(name)), None),
            },
            Event::RequestDelete(name) if find(&name).is_some() => (
                SessionState::SavedTopicsManager {
                    topics,
                    confirm_delete: Some(name),
                    error: None,
                },
                None,
            ),
            Event::CancelDelete => (manager(topics), None),
            Event::ConfirmDelete => match confirm_delete {
                Some(name) => self.begin(
                    format!("Deleting topic '{name}'..."),
                    PendingOp::DeleteTopic { name: name.clone() },
                    manager(topics),
                    |ticket| Command::DeleteTopic { ticket, name },
                ),
                None => (manager(topics), None),
            },
            _ => (
                SessionState::SavedTopicsManager {
                    topics,
                    confirm_delete,
                    error,
                },
                None,
            ),
        }
    }

    fn on_edit(&mut self, mut draft: TopicDraft, event: Event) -> Step {
        match event {
            Event::Back => self.reload_saved_topics(),
            Event::GenerateEdited { name, words } => {
                draft.name = name.trim().to_string();
                draft.words = parse_keywords(&words);
                draft.error = None;
                if draft.name.is_empty() {
                    let state = SessionState::EditTopic(draft);
                    return (state.with_error(QuizError::MissingTopicName.to_string()), None);
                }
                if draft.words.is_empty() {
                    let state = SessionState::EditTopic(draft);
                    return (state.with_error(QuizError::NoWords.to_string()), None);
                }
                let words = draft.words.clone();
                self.begin(
                    "Generating Vietnamese meanings...",
                    PendingOp::Meanings,
                    SessionState::EditTopic(draft),
                    |ticket| Command::AugmentMeanings {
                        ticket,
                        words,
                        context: None,
                    },
                )
            }
            Event::SaveEdited { name } => {
                draft.name = name.trim().to_string();
                draft.error = None;
                if draft.name.is_empty() {
                    let state = SessionState::EditTopic(draft);
                    return (state.with_error(QuizError::MissingTopicName.to_string()), None);
                }
                if draft.generated.is_empty() {
                    let state = SessionState::EditTopic(draft);
                    return (state.with_error(QuizError::NothingGenerated.to_string()), None);
                }
                let name = draft.name.clone();
                let pairs = draft.generated.clone();
                let replacing = (draft.original_name != name).then(|| draft.original_name.clone());
                self.begin(
                    format!("Saving topic '{name}'..."),
                    PendingOp::SaveTopic { name: name.clone() },
                    SessionState::EditTopic(draft),
                    |ticket| Command::SaveTopic {
                        ticket,
                        name,
                        pairs,
                        replacing,
                    },
                )
            }
            _ => (SessionState::EditTopic(draft), None),
        }
    }

    fn on_flashcard_setup(
        &mut self,
        topic_name: String,
        pairs: Vec<VocabularyPair>,
        event: Event,
    ) -> Step {
        match event {
            Event::Back => self.reload_saved_topics(),
            Event::StartFlashcards { count, mode } => {
                match FlashcardDeck::deal(&pairs, count, mode, &mut self.rng) {
                    Some(deck) => (SessionState::Flashcard { topic_name, deck }, None),
                    None => (
                        SessionState::home()
                            .with_error(QuizError::TopicUnavailable(topic_name).to_string()),
                        None,
                    ),
                }
            }
            _ => (SessionState::FlashcardSetup { topic_name, pairs }, None),
        }
    }

    fn on_flashcard(&mut self, topic_name: String, mut deck: FlashcardDeck, event: Event) -> Step {
        match event {
            Event::Back => return self.reload_saved_topics(),
            Event::FlipCard => deck.flip(),
            Event::NextCard => {
                deck.next();
            }
            Event::PreviousCard => {
                deck.previous();
            }
            Event::JumpToCard(index) => {
                deck.jump(index);
            }
            _ => {}
        }
        (SessionState::Flashcard { topic_name, deck }, None)
    }

    // -- completions --------------------------------------------------------

    fn complete(
        &mut self,
        message: String,
        ticket: Ticket,
        op: PendingOp,
        origin: SessionState,
        event: Event,
    ) -> Step {
        match (op, event) {
            (
                PendingOp::BuildQuiz {
                    topic_name,
                    pairs,
                    direction,
                    length,
                },
                Event::VocabularyReady { .. },
            ) => (self.build_quiz(topic_name, pairs, direction, length), None),

            (PendingOp::Phonetics { topic_name }, Event::PhoneticsReady { result, .. }) => {
                match result {
                    Ok(pairs) => {
                        let source = QuizSource {
                            name: topic_name,
                            origin: SourceOrigin::Custom,
                            pairs,
                        };
                        (SessionState::QuizSetup { source }, None)
                    }
                    Err(e) => {
                        tracing::error!("phonetics generation failed: {e}");
                        (origin.with_error(format!("Error: {e}")), None)
                    }
                }
            }

            (PendingOp::Meanings, Event::MeaningsReady { result, .. }) => match result {
                Ok(pairs) => (with_generated(origin, pairs), None),
                Err(e) => {
                    tracing::error!("meaning generation failed: {e}");
                    (origin.with_error(e.to_string()), None)
                }
            },

            (PendingOp::LoadSavedTopics, Event::SavedTopicsLoaded { result, .. }) => match result
            {
                Ok(topics) => (manager(topics), None),
                Err(e) => {
                    tracing::error!("loading saved topics failed: {e}");
                    (SessionState::home().with_error(e.to_string()), None)
                }
            },

            (PendingOp::SaveTopic { name }, Event::TopicSaved { result, .. }) => match result {
                Ok(()) => {
                    tracing::info!(topic = %name, "topic saved");
                    self.reload_saved_topics()
                }
                Err(e) => {
                    tracing::error!("saving topic '{name}' failed: {e}");
                    (origin.with_error(e.to_string()), None)
                }
            },

            (PendingOp::DeleteTopic { name }, Event::TopicDeleted { result, .. }) => match result {
                Ok(()) => {
                    tracing::info!(topic = %name, "topic deleted");
                    self.reload_saved_topics()
                }
                Err(e) => {
                    tracing::error!("deleting topic '{name}' failed: {e}");
                    (origin.with_error(e.to_string()), None)
                }
            },

            (op, event) => {
                tracing::warn!(?op, ?event, "completion does not match pending request");
                (
                    SessionState::Loading {
                        message,
                        ticket,
                        op,
                        origin: Box::new(origin),
                    },
                    None,
                )
            }
        }
    }

    fn build_quiz(
        &mut self,
        topic_name: String,
        mut pairs: Vec<VocabularyPair>,
        direction: QuizDirection,
        length: Option<usize>,
    ) -> SessionState {
        pairs.shuffle(&mut self.rng);
        if let Some(length) = length {
            pairs.truncate(length.min(MAX_QUIZ_LENGTH));
        }

        if pairs.len() < MIN_QUIZ_PAIRS {
            let err = QuizError::InsufficientVocabulary {
                available: pairs.len(),
                required: MIN_QUIZ_PAIRS,
            };
            tracing::warn!(topic = %topic_name, "{err}");
            return SessionState::home().with_error(err.to_string());
        }

        let questions = synthesize(&pairs, direction, &mut self.rng);
        tracing::info!(
            topic = %topic_name,
            %direction,
            questions = questions.len(),
            "quiz built"
        );

        SessionState::Quiz(QuizAttempt {
            topic_name,
            direction,
            pairs,
            questions,
            current: 0,
            ledger: AnswerLedger::new(),
            confirming_submit: false,
        })
    }
}

fn manager(topics: Vec<SavedTopic>) -> SessionState {
    SessionState::SavedTopicsManager {
        topics,
        confirm_delete: None,
        error: None,
    }
}

/// Put freshly generated pairs onto the screen that asked for them.
fn with_generated(origin: SessionState, pairs: Vec<VocabularyPair>) -> SessionState {
    match origin {
        SessionState::KeywordGeneratorSetup { name, context, .. } => {
            SessionState::KeywordGeneratorSetup {
                name,
                context,
                generated: pairs,
                error: None,
            }
        }
        SessionState::EditTopic(mut draft) => {
            draft.generated = pairs;
            draft.error = None;
            SessionState::EditTopic(draft)
        }
        other => other,
    }
}

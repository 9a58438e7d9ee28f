//! The `vocabquiz play` command: an interactive session on stdin/stdout.
//!
//! Each turn renders the current screen, reads one answer (or a block of
//! lines for list entry) and turns it into session events. While the session
//! is loading, the driver is stepped until the pending request completes.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use vocabquiz_core::catalog::TopicCatalog;
use vocabquiz_core::driver::SessionDriver;
use vocabquiz_core::flashcard::{FlashcardDeck, FlashcardMode};
use vocabquiz_core::model::{QuizDirection, QuizSource, SavedTopic};
use vocabquiz_core::scoring::{AnswerOutcome, AnswerStatus};
use vocabquiz_core::session::{Event, QuizAttempt, Session, SessionState, TopicChoice, TopicDraft};
use vocabquiz_core::traits::{TopicStore, VocabularyAugmenter};
use vocabquiz_providers::load_config_from;

pub struct PlayOptions {
    pub config: Option<PathBuf>,
    pub topics: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub provider: Option<String>,
    pub seed: Option<u64>,
    pub export: Option<PathBuf>,
}

pub async fn execute(opts: PlayOptions) -> Result<()> {
    let config = load_config_from(opts.config.as_deref())?;
    let catalog = super::load_catalog(opts.topics.as_deref(), &config)?;
    let store: Arc<dyn TopicStore> = Arc::new(super::open_store(opts.store, &config));
    let augmenter: Arc<dyn VocabularyAugmenter> =
        Arc::from(config.augmenter(opts.provider.as_deref())?);

    tracing::info!(
        provider = augmenter.name(),
        topics = catalog.len(),
        "starting session"
    );

    let session = match opts.seed {
        Some(seed) => Session::with_seed(catalog, seed),
        None => Session::new(catalog, StdRng::from_entropy()),
    };

    let mut play = Play {
        driver: SessionDriver::new(session, augmenter, store, config.driver_config()),
        prompter: Prompter::new(),
        export_dir: opts.export.unwrap_or_else(|| config.export_dir.clone()),
        default_length: config.default_quiz_length,
    };
    play.run().await
}

/// What one line of input asks for.
enum Action {
    Events(Vec<Event>),
    Export,
    Notice(String),
    Quit,
}

impl Action {
    fn event(event: Event) -> Self {
        Action::Events(vec![event])
    }
}

struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        let line = self
            .lines
            .next_line()
            .await
            .context("failed to read from stdin")?;
        Ok(line.map(|l| l.trim_end_matches('\r').to_string()))
    }

    /// Print `prompt` and read one line. `None` means end of input.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if prompt.is_empty() {
            print!("> ");
        } else {
            print!("{prompt}\n> ");
        }
        std::io::stdout().flush().context("failed to write to stdout")?;
        self.read_line().await
    }

    /// Read lines until an empty one. `None` means input ended first.
    async fn ask_block(&mut self, prompt: &str) -> Result<Option<String>> {
        println!("{prompt}");
        let mut lines = Vec::new();
        loop {
            match self.read_line().await? {
                Some(line) if line.trim().is_empty() => break,
                Some(line) => lines.push(line),
                None if lines.is_empty() => return Ok(None),
                None => break,
            }
        }
        Ok(Some(lines.join("\n")))
    }
}

struct Play {
    driver: SessionDriver,
    prompter: Prompter,
    export_dir: PathBuf,
    default_length: usize,
}

impl Play {
    async fn run(&mut self) -> Result<()> {
        loop {
            let state = self.driver.state().clone();
            if let SessionState::Loading { message, .. } = &state {
                println!("{message}");
                if !self.driver.step().await {
                    anyhow::bail!("session is waiting on a request that is not running");
                }
                continue;
            }

            render(&state, self.driver.session().catalog());

            let Some(action) = self.read_action(&state).await? else {
                break;
            };
            match action {
                Action::Events(events) => {
                    for event in events {
                        self.driver.dispatch(event);
                    }
                }
                Action::Export => self.export(&state),
                Action::Notice(message) => println!("{message}"),
                Action::Quit => break,
            }
        }
        println!("Goodbye!");
        Ok(())
    }

    fn export(&self, state: &SessionState) {
        let SessionState::Results(attempt) = state else {
            return;
        };
        match attempt.report().save_in(&self.export_dir) {
            Ok(path) => println!("Report saved to {}", path.display()),
            Err(e) => println!("Could not save the report: {e:#}"),
        }
    }

    async fn read_action(&mut self, state: &SessionState) -> Result<Option<Action>> {
        match state {
            SessionState::TopicSelection { .. } => self.on_topic_selection().await,
            SessionState::CustomTopicSetup { .. } => self.on_custom_setup().await,
            SessionState::KeywordGeneratorSetup { generated, .. } => {
                if generated.is_empty() {
                    self.ask_keywords().await
                } else {
                    self.on_generated().await
                }
            }
            SessionState::QuizSetup { source } => self.on_quiz_setup(source).await,
            SessionState::Quiz(attempt) => self.on_quiz(attempt).await,
            SessionState::Results(_) => self.on_results().await,
            SessionState::SavedTopicsManager {
                topics,
                confirm_delete,
                ..
            } => self.on_saved_topics(topics, confirm_delete.as_deref()).await,
            SessionState::EditTopic(draft) => self.on_edit(draft).await,
            SessionState::FlashcardSetup { pairs, .. } => {
                self.on_flashcard_setup(pairs.len()).await
            }
            SessionState::Flashcard { .. } => self.on_flashcard().await,
            SessionState::Loading { .. } => Ok(Some(Action::Events(Vec::new()))),
        }
    }

    async fn on_topic_selection(&mut self) -> Result<Option<Action>> {
        let ids: Vec<String> = self
            .driver
            .session()
            .catalog()
            .list()
            .iter()
            .map(|t| t.id.clone())
            .collect();
        let Some(input) = self.prompter.ask("").await? else {
            return Ok(None);
        };
        let action = match input.trim() {
            "q" => Action::Quit,
            "c" => Action::event(Event::ChooseTopic(TopicChoice::Custom)),
            "g" => Action::event(Event::ChooseTopic(TopicChoice::KeywordGenerator)),
            "s" => Action::event(Event::ChooseTopic(TopicChoice::SavedTopics)),
            other => match pick(other, ids.len()) {
                Some(i) => Action::event(Event::ChooseTopic(TopicChoice::Predefined(
                    ids[i].clone(),
                ))),
                None => Action::Notice(format!("Unknown choice '{other}'.")),
            },
        };
        Ok(Some(action))
    }

    async fn on_custom_setup(&mut self) -> Result<Option<Action>> {
        let Some(name) = self.prompter.ask("Topic name (empty to go back)").await? else {
            return Ok(None);
        };
        if name.trim().is_empty() {
            return Ok(Some(Action::event(Event::Back)));
        }
        let Some(text) = self
            .prompter
            .ask_block("Enter one `word - meaning` pair per line, then an empty line:")
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Action::event(Event::SubmitCustomTopic { name, text })))
    }

    async fn ask_keywords(&mut self) -> Result<Option<Action>> {
        let Some(name) = self.prompter.ask("Topic name (empty to go back)").await? else {
            return Ok(None);
        };
        if name.trim().is_empty() {
            return Ok(Some(Action::event(Event::Back)));
        }
        let Some(context) = self.prompter.ask("Usage context (optional)").await? else {
            return Ok(None);
        };
        let Some(keywords) = self
            .prompter
            .ask_block("English keywords, one per line, then an empty line:")
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Action::event(Event::GenerateMeanings {
            name,
            keywords,
            context: Some(context),
        })))
    }

    async fn on_generated(&mut self) -> Result<Option<Action>> {
        let Some(input) = self
            .prompter
            .ask("u = use for a quiz, s = save as topic, r = regenerate, b = back")
            .await?
        else {
            return Ok(None);
        };
        let action = match input.trim() {
            "u" => Action::event(Event::UseGenerated),
            "s" => Action::event(Event::SaveGenerated),
            "r" => return self.ask_keywords().await,
            "b" => Action::event(Event::Back),
            "h" => Action::event(Event::Home),
            "q" => Action::Quit,
            other => Action::Notice(format!("Unknown choice '{other}'.")),
        };
        Ok(Some(action))
    }

    async fn on_quiz_setup(&mut self, source: &QuizSource) -> Result<Option<Action>> {
        let default_length = self.default_length.min(source.max_length());
        let prompt = format!(
            "Direction [en|vi|mixed] and number of questions (default: en {default_length}), b = back"
        );
        let Some(input) = self.prompter.ask(&prompt).await? else {
            return Ok(None);
        };
        let input = input.trim();
        if input == "b" {
            return Ok(Some(Action::event(Event::Back)));
        }
        if input == "h" {
            return Ok(Some(Action::event(Event::Home)));
        }

        let mut direction = QuizDirection::default();
        let mut length = default_length;
        for token in input.split_whitespace() {
            if let Ok(n) = token.parse::<usize>() {
                length = n.min(source.max_length());
            } else {
                match token.parse::<QuizDirection>() {
                    Ok(d) => direction = d,
                    Err(e) => return Ok(Some(Action::Notice(e))),
                }
            }
        }
        Ok(Some(Action::event(Event::StartQuiz { direction, length })))
    }

    async fn on_quiz(&mut self, attempt: &QuizAttempt) -> Result<Option<Action>> {
        if attempt.confirming_submit {
            let Some(input) = self.prompter.ask("Submit anyway? [y/n]").await? else {
                return Ok(None);
            };
            let event = if input.trim().eq_ignore_ascii_case("y") {
                Event::ConfirmSubmit
            } else {
                Event::CancelSubmit
            };
            return Ok(Some(Action::event(event)));
        }

        let Some(input) = self.prompter.ask("").await? else {
            return Ok(None);
        };
        let options = attempt.current_question().map_or(0, |q| q.options.len());
        let next = attempt.current + 1;
        let action = match command(&input) {
            ("n", _) => Action::event(Event::Navigate(next)),
            ("p", _) => Action::event(Event::Navigate(attempt.current.saturating_sub(1))),
            ("g", Some(arg)) => match pick(arg, attempt.questions.len()) {
                Some(i) => Action::event(Event::Navigate(i)),
                None => Action::Notice(format!("No question '{arg}'.")),
            },
            ("s", _) => Action::event(Event::Submit),
            ("h", _) => Action::event(Event::Home),
            ("q", _) => Action::Quit,
            (other, None) => match pick(other, options) {
                Some(option) => {
                    Action::Events(vec![Event::Answer { option }, Event::Navigate(next)])
                }
                None => Action::Notice(format!("Unknown choice '{other}'.")),
            },
            (other, Some(_)) => Action::Notice(format!("Unknown choice '{other}'.")),
        };
        Ok(Some(action))
    }

    async fn on_results(&mut self) -> Result<Option<Action>> {
        let Some(input) = self.prompter.ask("").await? else {
            return Ok(None);
        };
        let action = match input.trim() {
            "r" => Action::event(Event::Retry),
            "x" => Action::Export,
            "h" => Action::event(Event::Home),
            "q" => Action::Quit,
            other => Action::Notice(format!("Unknown choice '{other}'.")),
        };
        Ok(Some(action))
    }

    async fn on_saved_topics(
        &mut self,
        topics: &[SavedTopic],
        confirm_delete: Option<&str>,
    ) -> Result<Option<Action>> {
        if let Some(name) = confirm_delete {
            let prompt = format!("Delete '{name}'? [y/n]");
            let Some(input) = self.prompter.ask(&prompt).await? else {
                return Ok(None);
            };
            let event = if input.trim().eq_ignore_ascii_case("y") {
                Event::ConfirmDelete
            } else {
                Event::CancelDelete
            };
            return Ok(Some(Action::event(event)));
        }

        let Some(input) = self.prompter.ask("").await? else {
            return Ok(None);
        };
        let named = |arg: Option<&str>| {
            arg.and_then(|a| pick(a, topics.len()))
                .map(|i| topics[i].name.clone())
        };
        let action = match command(&input) {
            ("b", _) => Action::event(Event::Back),
            ("h", _) => Action::event(Event::Home),
            ("q", _) => Action::Quit,
            (verb @ ("u" | "f" | "e" | "d"), arg) => match named(arg) {
                Some(name) => Action::event(match verb {
                    "u" => Event::UseSaved(name),
                    "f" => Event::FlashcardsFor(name),
                    "e" => Event::EditSaved(name),
                    _ => Event::RequestDelete(name),
                }),
                None => Action::Notice("Pick a topic by number, e.g. `u 1`.".to_string()),
            },
            (other, _) => Action::Notice(format!("Unknown choice '{other}'.")),
        };
        Ok(Some(action))
    }

    async fn on_edit(&mut self, draft: &TopicDraft) -> Result<Option<Action>> {
        let Some(input) = self
            .prompter
            .ask("g = generate meanings, s = save, b = back")
            .await?
        else {
            return Ok(None);
        };
        let action = match input.trim() {
            "g" => {
                let Some(name) = self
                    .prompter
                    .ask(&format!("Topic name [{}]", draft.name))
                    .await?
                else {
                    return Ok(None);
                };
                let Some(words) = self
                    .prompter
                    .ask_block("English words, one per line (empty line keeps the list):")
                    .await?
                else {
                    return Ok(None);
                };
                Action::event(Event::GenerateEdited {
                    name: or_default(name, &draft.name),
                    words: or_default(words, &draft.words.join("\n")),
                })
            }
            "s" => {
                let Some(name) = self
                    .prompter
                    .ask(&format!("Save as [{}]", draft.name))
                    .await?
                else {
                    return Ok(None);
                };
                Action::event(Event::SaveEdited {
                    name: or_default(name, &draft.name),
                })
            }
            "b" => Action::event(Event::Back),
            "h" => Action::event(Event::Home),
            "q" => Action::Quit,
            other => Action::Notice(format!("Unknown choice '{other}'.")),
        };
        Ok(Some(action))
    }

    async fn on_flashcard_setup(&mut self, available: usize) -> Result<Option<Action>> {
        let prompt = format!(
            "Cards to study (1-{available}, default {available}) and front side [en|vi], b = back"
        );
        let Some(input) = self.prompter.ask(&prompt).await? else {
            return Ok(None);
        };
        let input = input.trim();
        if input == "b" {
            return Ok(Some(Action::event(Event::Back)));
        }
        if input == "h" {
            return Ok(Some(Action::event(Event::Home)));
        }

        let mut count = available;
        let mut mode = FlashcardMode::default();
        for token in input.split_whitespace() {
            if let Ok(n) = token.parse::<usize>() {
                count = n;
            } else {
                match token.parse::<FlashcardMode>() {
                    Ok(m) => mode = m,
                    Err(e) => return Ok(Some(Action::Notice(e))),
                }
            }
        }
        Ok(Some(Action::event(Event::StartFlashcards { count, mode })))
    }

    async fn on_flashcard(&mut self) -> Result<Option<Action>> {
        let Some(input) = self.prompter.ask("").await? else {
            return Ok(None);
        };
        let action = match command(&input) {
            ("" | "f", _) => Action::event(Event::FlipCard),
            ("n", _) => Action::event(Event::NextCard),
            ("p", _) => Action::event(Event::PreviousCard),
            ("g", Some(arg)) => match arg.parse::<usize>() {
                Ok(n) if n > 0 => Action::event(Event::JumpToCard(n - 1)),
                _ => Action::Notice(format!("No card '{arg}'.")),
            },
            ("b", _) => Action::event(Event::Back),
            ("h", _) => Action::event(Event::Home),
            ("q", _) => Action::Quit,
            (other, _) => Action::Notice(format!("Unknown choice '{other}'.")),
        };
        Ok(Some(action))
    }
}

/// Split `g 3` into `("g", Some("3"))`.
fn command(input: &str) -> (&str, Option<&str>) {
    let mut parts = input.split_whitespace();
    let verb = parts.next().unwrap_or("");
    (verb, parts.next())
}

/// Parse a 1-based menu number into a 0-based index below `len`.
fn pick(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => None,
    }
}

fn or_default(input: String, current: &str) -> String {
    if input.trim().is_empty() {
        current.to_string()
    } else {
        input
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(state: &SessionState, catalog: &TopicCatalog) {
    println!();
    match state {
        SessionState::TopicSelection { .. } => render_home(catalog),
        SessionState::CustomTopicSetup { .. } => println!("== Custom word list =="),
        SessionState::KeywordGeneratorSetup {
            name,
            context,
            generated,
            ..
        } => {
            println!("== Generate meanings from keywords ==");
            if !generated.is_empty() {
                println!("Topic: {name}");
                if let Some(context) = context {
                    println!("Context: {context}");
                }
                for pair in generated {
                    println!("  {} - {}", pair.english_word, pair.vietnamese_meaning);
                }
            }
        }
        SessionState::QuizSetup { source } => {
            println!("== {} ==", source.name);
            println!("{} words available.", source.available());
        }
        SessionState::Loading { message, .. } => println!("{message}"),
        SessionState::Quiz(attempt) => render_quiz(attempt),
        SessionState::Results(attempt) => render_results(attempt),
        SessionState::SavedTopicsManager { topics, .. } => render_saved(topics),
        SessionState::EditTopic(draft) => {
            println!("== Edit topic: {} ==", draft.original_name);
            println!("Words: {}", draft.words.join(", "));
            if !draft.generated.is_empty() {
                println!("Generated:");
                for pair in &draft.generated {
                    println!("  {} - {}", pair.english_word, pair.vietnamese_meaning);
                }
            }
        }
        SessionState::FlashcardSetup { topic_name, pairs } => {
            println!("== Flashcards: {topic_name} ==");
            println!("{} cards available.", pairs.len());
        }
        SessionState::Flashcard { topic_name, deck } => render_card(topic_name, deck),
    }
    if let Some(error) = state.error() {
        println!("! {error}");
    }
}

fn render_home(catalog: &TopicCatalog) {
    println!("== vocabquiz ==");
    println!("Predefined topics:");
    for (i, topic) in catalog.list().iter().enumerate() {
        println!("  {}. {} ({} words)", i + 1, topic.name, topic.pairs.len());
    }
    println!("  c. Custom word list");
    println!("  g. Generate meanings from keywords");
    println!("  s. Saved topics");
    println!("  q. Quit");
}

fn render_quiz(attempt: &QuizAttempt) {
    let total = attempt.questions.len();
    let answered = total - attempt.unanswered_count();
    let strip: String = (0..total)
        .map(|i| {
            let mark = match attempt.status(i) {
                AnswerStatus::Answered => '#',
                AnswerStatus::Unanswered => '.',
            };
            if i == attempt.current {
                format!("[{mark}]")
            } else {
                mark.to_string()
            }
        })
        .collect();

    println!("== Quiz: {} ({}) ==", attempt.topic_name, attempt.direction);
    println!(
        "Question {}/{total}   answered {answered}/{total}   {strip}",
        attempt.current + 1
    );

    if attempt.confirming_submit {
        println!(
            "You have {} unanswered question(s).",
            attempt.unanswered_count()
        );
        return;
    }

    let Some(question) = attempt.current_question() else {
        return;
    };
    let mut heading = question.question_text.clone();
    if question.asks_english_word() {
        if let Some(phonetic) = &question.phonetic {
            heading.push_str(&format!("  {phonetic}"));
        }
        if let Some(pos) = &question.part_of_speech {
            heading.push_str(&format!(" ({pos})"));
        }
    }
    println!("  {heading}");

    let chosen = attempt.ledger.get(attempt.current);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if chosen == Some(option.as_str()) { "*" } else { " " };
        println!("  {marker}{}) {option}", i + 1);
    }
    println!("1-4 answer, n next, p previous, g <n> go to, s submit, h home");
}

fn render_results(attempt: &QuizAttempt) {
    let score = attempt.score();
    println!("== Results: {} ==", attempt.topic_name);
    println!(
        "Score: {}/{} ({}%) - {}",
        score.score, score.total, score.percentage, score.tier
    );
    println!("{}", score.tier.message());
    println!("Review:");
    for item in attempt.review() {
        let line = format!(
            "{}. {} -> {}",
            item.index + 1,
            item.question_text,
            item.correct_answer
        );
        match (item.outcome, item.chosen) {
            (AnswerOutcome::Correct, _) => println!("  ✓ {line}"),
            (AnswerOutcome::Incorrect, Some(chosen)) => {
                println!("  ✗ {line} (you chose: {chosen})")
            }
            (_, _) => println!("  - {line} (skipped)"),
        }
    }
    println!("r retry with mixed directions, x export report, h home, q quit");
}

fn render_saved(topics: &[SavedTopic]) {
    println!("== Saved topics ==");
    if topics.is_empty() {
        println!("  (no saved topics yet)");
    }
    for (i, topic) in topics.iter().enumerate() {
        println!("  {}. {} ({} words)", i + 1, topic.name, topic.pairs.len());
    }
    println!("u <n> quiz, f <n> flashcards, e <n> edit, d <n> delete, b back");
}

fn render_card(topic_name: &str, deck: &FlashcardDeck) {
    println!("== Flashcards: {topic_name} ({}) ==", deck.mode());
    println!(
        "Card {}/{} ({:.0}%){}",
        deck.index() + 1,
        deck.len(),
        deck.progress_percent(),
        if deck.is_flipped() { "  [back]" } else { "" }
    );
    println!("    {}", deck.visible());
    if deck.is_flipped() {
        let card = deck.current();
        if let Some(phonetic) = &card.phonetic {
            println!("    {phonetic}");
        }
        for example in &card.examples {
            println!("    e.g. {example}");
        }
    }
    println!("Enter or f flip, n next, p previous, g <n> go to, b back");
}

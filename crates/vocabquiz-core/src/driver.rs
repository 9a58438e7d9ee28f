//! Async session driver.
//!
//! Connects a [`Session`] to its collaborators: every [`Command`] the session
//! emits becomes a future in a [`FuturesUnordered`] set, and every finished
//! future is fed back as a completion [`Event`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

use crate::error::AugmentError;
use crate::session::{Command, Event, Session, SessionState};
use crate::traits::{TopicStore, VocabularyAugmenter};

/// Configuration for the session driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// How long the quiz-building `Loading` screen stays up.
    pub loading_delay: Duration,
    /// Retries on transient augmentation errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further attempt.
    pub retry_delay: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            loading_delay: Duration::from_millis(500),
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Runs a [`Session`] against real collaborators.
pub struct SessionDriver {
    session: Session,
    augmenter: Arc<dyn VocabularyAugmenter>,
    store: Arc<dyn TopicStore>,
    config: DriverConfig,
    in_flight: FuturesUnordered<BoxFuture<'static, Event>>,
}

impl SessionDriver {
    pub fn new(
        session: Session,
        augmenter: Arc<dyn VocabularyAugmenter>,
        store: Arc<dyn TopicStore>,
        config: DriverConfig,
    ) -> Self {
        Self {
            session,
            augmenter,
            store,
            config,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// `true` when no collaborator request is running.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Apply one event and start whatever request it produces.
    pub fn dispatch(&mut self, event: Event) {
        if let Some(command) = self.session.dispatch(event) {
            self.schedule(command);
        }
    }

    /// Wait for the next in-flight request and apply its completion.
    ///
    /// Returns `false` when nothing was in flight.
    pub async fn step(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Drain in-flight work, including requests chained by completions.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn schedule(&mut self, command: Command) {
        tracing::debug!(ticket = %command.ticket(), "scheduling request");

        let future = match command {
            Command::PrepareQuiz { ticket } => {
                let delay = self.config.loading_delay;
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Event::VocabularyReady { ticket }
                }
                .boxed()
            }
            Command::AugmentPhonetics { ticket, pairs } => {
                let augmenter = Arc::clone(&self.augmenter);
                let config = self.config.clone();
                async move {
                    let result =
                        with_retries(&config, || augmenter.augment_with_phonetics(&pairs)).await;
                    Event::PhoneticsReady { ticket, result }
                }
                .boxed()
            }
            Command::AugmentMeanings {
                ticket,
                words,
                context,
            } => {
                let augmenter = Arc::clone(&self.augmenter);
                let config = self.config.clone();
                async move {
                    let result = with_retries(&config, || {
                        augmenter.augment_with_meanings(&words, context.as_deref())
                    })
                    .await;
                    Event::MeaningsReady { ticket, result }
                }
                .boxed()
            }
            Command::LoadSavedTopics { ticket } => {
                let store = Arc::clone(&self.store);
                async move {
                    Event::SavedTopicsLoaded {
                        ticket,
                        result: store.list_saved(),
                    }
                }
                .boxed()
            }
            Command::SaveTopic {
                ticket,
                name,
                pairs,
                replacing,
            } => {
                let store = Arc::clone(&self.store);
                async move {
                    let result = store.save(&name, &pairs).and_then(|()| match replacing {
                        Some(old) if old != name => store.delete(&old),
                        _ => Ok(()),
                    });
                    Event::TopicSaved { ticket, result }
                }
                .boxed()
            }
            Command::DeleteTopic { ticket, name } => {
                let store = Arc::clone(&self.store);
                async move {
                    Event::TopicDeleted {
                        ticket,
                        result: store.delete(&name),
                    }
                }
                .boxed()
            }
        };

        self.in_flight.push(future);
    }
}

/// Upper bound on any single wait between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Run `call`, retrying transient failures with exponential backoff.
///
/// Permanent errors are returned immediately. A rate limit's retry-after hint
/// replaces the current backoff delay; a hint longer than [`MAX_BACKOFF`]
/// ends the retries with the rate-limit error.
async fn with_retries<T, F, Fut>(config: &DriverConfig, mut call: F) -> Result<T, AugmentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AugmentError>>,
{
    let mut retry_delay = config.retry_delay;
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_permanent() || attempt >= config.max_retries => return Err(e),
            Err(e) => {
                attempt += 1;
                if let Some(ms) = e.retry_after_ms() {
                    let hinted = Duration::from_millis(ms);
                    if hinted > MAX_BACKOFF {
                        tracing::warn!(
                            retry_after_ms = ms,
                            "rate limit outlasts backoff cap, giving up"
                        );
                        return Err(e);
                    }
                    retry_delay = hinted;
                }
                retry_delay = retry_delay.min(MAX_BACKOFF);
                tracing::warn!(attempt, "augmentation failed, retrying: {e}");
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_BACKOFF);
            }
        }
    }
}

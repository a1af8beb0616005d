//! Unattended processing of the draft queue.
//!
//! While running, the [`Autopilot`] wakes up on a fixed period, takes the
//! oldest eligible draft from the [`ContentStore`], has the
//! [`ContentGenerator`] write its copy and publishes the result. Every step
//! leaves a line in the shared [`SharedActivityLog`] so the operator can follow
//! along. Failures end the current attempt only; the next tick retries.

mod activity_log;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ai::ContentGenerator;
use crate::db::ContentStore;
use crate::models::NewsItem;

pub use activity_log::{SharedActivityLog, DEFAULT_CAPACITY};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

const TITLE_PREVIEW_CHARS: usize = 30;

const IDLE_POLL: Duration = Duration::from_millis(50);

/// How a single attempt ended. None of these stop the autopilot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The autopilot was switched off before the attempt began.
    Disabled,
    /// Another attempt was still in flight.
    Skipped,
    QueueEmpty,
    Published { id: i64 },
    StoreQueryFailed(String),
    GenerationFailed(String),
    StoreUpdateFailed(String),
}

enum State {
    Stopped,
    Running { ticker: JoinHandle<()> },
}

pub struct Autopilot {
    worker: Arc<Worker>,
    state: State,
}

impl Autopilot {
    pub fn new(
        store: Arc<dyn ContentStore>,
        generator: Arc<dyn ContentGenerator>,
        log: SharedActivityLog,
        interval: Duration,
    ) -> Self {
        let (items_tx, _) = watch::channel(Vec::new());
        Self {
            worker: Arc::new(Worker {
                store,
                generator,
                log,
                items_tx,
                enabled: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                interval,
            }),
            state: State::Stopped,
        }
    }

    /// Item list republished after every successful publish.
    pub fn subscribe(&self) -> watch::Receiver<Vec<NewsItem>> {
        self.worker.items_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    pub fn interval(&self) -> Duration {
        self.worker.interval
    }

    /// Run one attempt right away, then one per interval until [`stop`](Self::stop).
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        self.worker.enabled.store(true, Ordering::SeqCst);
        self.worker.log.record("Autopilot enabled");
        tracing::info!(
            interval_secs = self.worker.interval.as_secs(),
            "autopilot started"
        );

        let worker = Arc::clone(&self.worker);
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(worker.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately
                interval.tick().await;
                // Attempts run detached so stopping never cuts one short
                let worker = Arc::clone(&worker);
                tokio::spawn(async move {
                    let outcome = worker.run_attempt().await;
                    tracing::debug!(?outcome, "autopilot attempt finished");
                });
            }
        });

        self.state = State::Running { ticker };
    }

    /// Cancel future ticks. An attempt already in flight runs to completion.
    pub fn stop(&mut self) {
        self.worker.enabled.store(false, Ordering::SeqCst);
        if let State::Running { ticker } = std::mem::replace(&mut self.state, State::Stopped) {
            ticker.abort();
            self.worker.log.record("Autopilot disabled");
            tracing::info!("autopilot stopped");
        }
    }

    /// Resolve once no attempt holds the in-flight slot.
    ///
    /// After [`stop`](Self::stop) no new attempt can take the slot, so this
    /// waits for the last detached attempt to finish its write.
    pub async fn wait_idle(&self) {
        while self.worker.in_flight.load(Ordering::SeqCst) {
            tokio::time::sleep(IDLE_POLL).await;
        }
    }

    /// Flip between running and stopped, returning whether it now runs.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }
}

impl Drop for Autopilot {
    fn drop(&mut self) {
        if let State::Running { ticker } = &self.state {
            ticker.abort();
        }
    }
}

struct Worker {
    store: Arc<dyn ContentStore>,
    generator: Arc<dyn ContentGenerator>,
    log: SharedActivityLog,
    items_tx: watch::Sender<Vec<NewsItem>>,
    enabled: AtomicBool,
    in_flight: AtomicBool,
    interval: Duration,
}

impl Worker {
    async fn run_attempt(&self) -> AttemptOutcome {
        // Read the flag now, not when the tick was scheduled
        if !self.enabled.load(Ordering::SeqCst) {
            return AttemptOutcome::Disabled;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            self.log
                .record("Previous attempt still running, skipping this tick");
            tracing::debug!("autopilot tick skipped, attempt in flight");
            return AttemptOutcome::Skipped;
        };
        // A stop may have landed while the slot was being taken
        if !self.enabled.load(Ordering::SeqCst) {
            return AttemptOutcome::Disabled;
        }

        self.log.record("Checking draft queue...");

        let item = match self.store.next_pending_item().await {
            Ok(Some(item)) => item,
            Ok(None) => {
                self.log.record("Queue empty, waiting for new drafts");
                return AttemptOutcome::QueueEmpty;
            }
            Err(e) => {
                self.log.record(format!("Store query failed: {e}"));
                tracing::warn!("Autopilot could not query the store: {}", e);
                return AttemptOutcome::StoreQueryFailed(e.to_string());
            }
        };

        self.log.record(format!(
            "Processing: \"{}\"",
            item.title_preview(TITLE_PREVIEW_CHARS)
        ));

        let raw_draft = item.raw_draft.as_deref().unwrap_or_default();
        let content = match self.generator.generate(&item.title, raw_draft).await {
            Ok(content) => content,
            Err(e) => {
                self.log.record(format!("Generation failed: {e}"));
                tracing::warn!(id = item.id, "Autopilot generation failed: {}", e);
                return AttemptOutcome::GenerationFailed(e.to_string());
            }
        };

        if let Err(e) = self.store.update_content(item.id, &content).await {
            self.log.record(format!("Publish failed: {e}"));
            tracing::warn!(id = item.id, "Autopilot could not save content: {}", e);
            return AttemptOutcome::StoreUpdateFailed(e.to_string());
        }

        self.log.record(format!("Published: {}", item.title));
        tracing::info!(id = item.id, title = %item.title, "autopilot published item");

        self.refresh_items().await;

        AttemptOutcome::Published { id: item.id }
    }

    async fn refresh_items(&self) {
        match self.store.list_items().await {
            Ok(items) => {
                self.items_tx.send_replace(items);
            }
            Err(e) => tracing::warn!("Failed to reload items after publish: {}", e),
        }
    }
}

/// Holds the single in-flight slot until dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(slot: &'a AtomicBool) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(slot))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

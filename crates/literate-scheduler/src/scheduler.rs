//! Owner task for debounced extraction
//!
//! One task owns the text snapshot, the quiet-period timer, the sequence
//! counters and the collection. Extraction calls run as separate tasks and
//! report back over a channel; only the completion for the newest request is
//! ever merged.

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::metrics::SchedulerMetrics;
use crate::state::{CollectionSnapshot, RequestState, SchedulerEvent};
use literate_domain::{
    now_millis, reconcile_with, replace_object, ExtractedObject, ExtractionClient,
    ExtractionError, ExtractionResult, Merge, MergeSummary, ObjectCollection, Timestamp,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// Source of timestamps stamped onto merged objects
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Requests from the handle to the owner task
enum Command {
    TextChanged(String),
    Retry,
    Correct(String),
    Shutdown,
}

/// What a request task brings back
enum Outcome {
    Extracted(Result<ExtractionResult, ExtractionError>),
    Corrected {
        target: String,
        result: Result<Option<ExtractedObject>, ExtractionError>,
    },
}

struct Completion {
    sequence: u64,
    text: String,
    outcome: Outcome,
}

/// Builder for the scheduler's owner task
///
/// # Examples
///
/// ```no_run
/// use literate_extractor::{Extractor, ExtractorConfig};
/// use literate_llm::OllamaProvider;
/// use literate_scheduler::{Scheduler, SchedulerConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let llm = OllamaProvider::default_endpoint("gemma3:1b")?;
/// let extractor = Extractor::new(llm, ExtractorConfig::default());
///
/// let (handle, mut events) = Scheduler::new(extractor, SchedulerConfig::default()).spawn()?;
/// handle.notify_text_changed("Alice met Bob at the castle.");
///
/// while let Some(event) = events.recv().await {
///     println!("{:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Scheduler<C> {
    client: Arc<C>,
    config: SchedulerConfig,
    clock: Clock,
}

impl<C> Scheduler<C>
where
    C: ExtractionClient + 'static,
{
    /// Create a scheduler around an extraction client
    pub fn new(client: C, config: SchedulerConfig) -> Self {
        Self::from_arc(Arc::new(client), config)
    }

    /// Create a scheduler sharing an existing client
    pub fn from_arc(client: Arc<C>, config: SchedulerConfig) -> Self {
        Self {
            client,
            config,
            clock: Arc::new(now_millis),
        }
    }

    /// Replace the wall clock used for `created_at` / `updated_at`
    pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Start the owner task
    ///
    /// Must be called inside a tokio runtime. Returns the handle and the
    /// event stream.
    pub fn spawn(
        self,
    ) -> Result<(SchedulerHandle, mpsc::UnboundedReceiver<SchedulerEvent>), SchedulerError> {
        self.config.validate().map_err(SchedulerError::Config)?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(CollectionSnapshot::default());

        let owner = Owner {
            client: self.client,
            config: self.config,
            clock: self.clock,
            collection: ObjectCollection::new(),
            latest_text: String::new(),
            last_applied_text: None,
            deadline: None,
            latest_issued: 0,
            latest_applied: 0,
            in_flight: None,
            extraction_pending: false,
            last_error: None,
            metrics: SchedulerMetrics::new(),
            completion_tx,
            event_tx,
            snapshot_tx,
        };
        let task = tokio::spawn(owner.run(command_rx, completion_rx));

        let handle = SchedulerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        };
        Ok((handle, event_rx))
    }
}

/// Caller-side handle to a running scheduler
///
/// Dropping the handle stops the owner task.
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<CollectionSnapshot>,
    task: JoinHandle<ObjectCollection>,
}

impl SchedulerHandle {
    /// Record the latest full text and restart the quiet period
    ///
    /// Never blocks.
    pub fn notify_text_changed(&self, text: impl Into<String>) {
        if self.commands.send(Command::TextChanged(text.into())).is_err() {
            debug!("Scheduler stopped, dropping text change");
        }
    }

    /// Extract the latest text now, skipping the quiet period
    pub fn retry(&self) -> Result<(), SchedulerError> {
        self.send(Command::Retry)
    }

    /// Ask the client to re-derive the object called `name`
    pub fn correct(&self, name: impl Into<String>) -> Result<(), SchedulerError> {
        self.send(Command::Correct(name.into()))
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes on every published change
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot> {
        self.snapshots.clone()
    }

    /// True until the owner task exits
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the owner task and return the final collection
    ///
    /// Requests still in flight are left to finish; their completions are
    /// dropped.
    pub async fn shutdown(self) -> Result<ObjectCollection, SchedulerError> {
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| SchedulerError::Worker(e.to_string()))
    }

    fn send(&self, command: Command) -> Result<(), SchedulerError> {
        self.commands
            .send(command)
            .map_err(|_| SchedulerError::Stopped)
    }
}

/// State owned by the scheduler task
struct Owner<C> {
    client: Arc<C>,
    config: SchedulerConfig,
    clock: Clock,
    collection: ObjectCollection,
    latest_text: String,
    last_applied_text: Option<String>,
    deadline: Option<Instant>,
    latest_issued: u64,
    latest_applied: u64,
    in_flight: Option<u64>,
    /// The newest extraction has been issued but not yet merged or failed
    extraction_pending: bool,
    last_error: Option<ExtractionError>,
    metrics: SchedulerMetrics,
    completion_tx: mpsc::UnboundedSender<Completion>,
    event_tx: mpsc::UnboundedSender<SchedulerEvent>,
    snapshot_tx: watch::Sender<CollectionSnapshot>,
}

impl<C> Owner<C>
where
    C: ExtractionClient + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) -> ObjectCollection {
        info!(
            "Scheduler started (debounce: {:?}, deletion: {:?})",
            self.config.debounce(),
            self.config.deletion_policy
        );

        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::TextChanged(text)) => self.on_text_changed(text),
                    Some(Command::Retry) => self.on_retry(),
                    Some(Command::Correct(name)) => self.dispatch_correction(name),
                    Some(Command::Shutdown) | None => break,
                },
                Some(completion) = completions.recv() => self.on_complete(completion),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_timer();
                }
            }
            self.publish();
        }

        info!("Scheduler stopped. Final metrics:\n{}", self.metrics.summary());
        self.collection
    }

    fn on_text_changed(&mut self, text: String) {
        if self.deadline.is_some() {
            self.metrics.record_timer_restart();
        }
        self.latest_text = text;
        self.deadline = Some(Instant::now() + self.config.debounce());
        debug!(len = self.latest_text.len(), "Text changed, quiet period restarted");
    }

    fn on_timer(&mut self) {
        self.deadline = None;
        if self.is_duplicate() {
            debug!("Text unchanged since last merge, skipping request");
            self.metrics.record_duplicate();
            self.emit(SchedulerEvent::DuplicateSkipped);
            return;
        }
        self.dispatch_extraction();
    }

    fn on_retry(&mut self) {
        self.deadline = None;
        info!("Manual retry");
        self.dispatch_extraction();
    }

    /// The collection already reflects the current text and nothing newer is pending
    fn is_duplicate(&self) -> bool {
        self.in_flight.is_none()
            && self.latest_applied == self.latest_issued
            && self.last_applied_text.as_deref() == Some(self.latest_text.as_str())
    }

    fn next_sequence(&mut self) -> u64 {
        self.latest_issued += 1;
        self.in_flight = Some(self.latest_issued);
        self.metrics.record_request();
        self.emit(SchedulerEvent::RequestIssued {
            sequence: self.latest_issued,
        });
        self.latest_issued
    }

    fn dispatch_extraction(&mut self) {
        let sequence = self.next_sequence();
        self.extraction_pending = true;
        let text = self.latest_text.clone();
        info!(sequence, len = text.len(), "Issuing extraction request");

        let client = Arc::clone(&self.client);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = Outcome::Extracted(client.extract(&text).await);
            let _ = completions.send(Completion {
                sequence,
                text,
                outcome,
            });
        });
    }

    fn dispatch_correction(&mut self, target: String) {
        let sequence = self.next_sequence();
        let text = self.latest_text.clone();
        info!(
            sequence,
            target = %target,
            superseded_extraction = self.extraction_pending,
            "Issuing correction request"
        );

        let client = Arc::clone(&self.client);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = client.correct(&target, &text).await;
            let _ = completions.send(Completion {
                sequence,
                text,
                outcome: Outcome::Corrected { target, result },
            });
        });
    }

    fn on_complete(&mut self, completion: Completion) {
        let Completion {
            sequence,
            text,
            outcome,
        } = completion;

        if self.in_flight == Some(sequence) {
            self.in_flight = None;
        }

        if sequence != self.latest_issued || sequence <= self.latest_applied {
            debug!(
                sequence,
                latest_issued = self.latest_issued,
                latest_applied = self.latest_applied,
                "Discarding stale completion"
            );
            self.metrics.record_stale();
            return;
        }

        let now = (self.clock)();
        let corrected = matches!(outcome, Outcome::Corrected { .. });
        if !corrected {
            self.extraction_pending = false;
        }

        match outcome {
            Outcome::Extracted(Ok(result)) => {
                let merge =
                    reconcile_with(&self.collection, &result, now, self.config.deletion_policy);
                info!(
                    sequence,
                    added = merge.summary.added.len(),
                    updated = merge.summary.updated.len(),
                    removed = merge.summary.removed.len(),
                    "Applied extraction result"
                );
                let summary = self.commit(sequence, merge);
                self.last_applied_text = Some(text);
                self.emit(SchedulerEvent::Applied { sequence, summary });
            }
            Outcome::Corrected {
                target,
                result: Ok(replacement),
            } => {
                let merge = replacement
                    .and_then(|object| replace_object(&self.collection, &target, &object, now));
                let summary = match merge {
                    Some(merge) => {
                        info!(sequence, target = %target, "Applied correction");
                        self.commit(sequence, merge)
                    }
                    None => {
                        warn!(sequence, target = %target, "Correction produced no replacement");
                        self.latest_applied = sequence;
                        self.last_error = None;
                        MergeSummary::default()
                    }
                };
                self.emit(SchedulerEvent::Corrected {
                    sequence,
                    target,
                    summary,
                });
            }
            Outcome::Extracted(Err(e)) | Outcome::Corrected { result: Err(e), .. } => {
                self.surface_error(sequence, e);
            }
        }

        // A correction issued over an unfinished extraction made it stale;
        // the text it carried still has to be merged.
        if corrected && self.extraction_pending && self.deadline.is_none() {
            info!(sequence, "Re-issuing extraction superseded by correction");
            self.dispatch_extraction();
        }
    }

    /// Install a merge. Only extractions record `last_applied_text`.
    fn commit(&mut self, sequence: u64, merge: Merge) -> MergeSummary {
        self.collection = merge.collection;
        self.latest_applied = sequence;
        self.last_error = None;
        self.metrics.record_applied();
        merge.summary
    }

    fn surface_error(&mut self, sequence: u64, e: ExtractionError) {
        error!(sequence, kind = %e.kind(), "Extraction failed: {}", e.message());
        self.metrics.record_error();
        self.emit(SchedulerEvent::Error {
            kind: e.kind(),
            message: e.message().to_string(),
            sequence,
        });
        self.last_error = Some(e);
    }

    fn emit(&self, event: SchedulerEvent) {
        let _ = self.event_tx.send(event);
    }

    fn publish(&self) {
        let next = CollectionSnapshot {
            objects: self.collection.clone(),
            request: RequestState {
                pending: self.deadline.is_some(),
                in_flight: self.in_flight,
                latest_issued: self.latest_issued,
                latest_applied: self.latest_applied,
                last_error: self.last_error.clone(),
            },
            metrics: self.metrics.clone(),
        };
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

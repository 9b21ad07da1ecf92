//! Orchestrator module for the search sync ingest.
//!
//! Coordinates the consumer and the dispatcher, and owns the delivery policy:
//! retries, which failures are committed past and which stop the pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, sleep, Duration};
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::{ChangeEvent, MessageOffset, SkipReason, StreamMessage};
use crate::errors::IngestError;
use crate::processor::{DispatchOutcome, Dispatcher};

/// Source of change events.
///
/// Implemented by the Kafka consumer; tests substitute their own.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Subscribe to the configured topics.
    fn subscribe(&self) -> Result<(), IngestError>;

    /// Forward messages to `sender` until the stream ends or `shutdown` fires,
    /// committing each offset acknowledged on `ack_receiver`.
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        ack_receiver: mpsc::Receiver<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
    /// Deliveries of one event to the dispatcher before giving up.
    pub max_delivery_attempts: u32,
    /// Wait before the first redelivery; doubled for each one after.
    pub retry_backoff: Duration,
    /// Upper bound on the wait between redeliveries.
    pub max_retry_backoff: Duration,
    /// Interval of the progress log line.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            max_delivery_attempts: 5,
            retry_backoff: Duration::from_millis(200),
            max_retry_backoff: Duration::from_secs(10),
            progress_interval: Duration::from_secs(10),
        }
    }
}

impl OrchestratorConfig {
    /// Wait before redelivery number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_backoff
            .saturating_mul(factor)
            .min(self.max_retry_backoff)
    }
}

/// Counters reported by the progress line and at shutdown.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub events_processed: AtomicU64,
    pub upserts: AtomicU64,
    pub deletes: AtomicU64,
    pub ignored: AtomicU64,
    pub skipped: AtomicU64,
    pub failures: AtomicU64,
}

impl PipelineStats {
    fn record(&self, outcome: DispatchOutcome) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DispatchOutcome::Upserted(_) => &self.upserts,
            DispatchOutcome::Deleted(_) => &self.deletes,
            DispatchOutcome::Ignored => &self.ignored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn documents_written(&self) -> u64 {
        self.upserts.load(Ordering::Relaxed) + self.deletes.load(Ordering::Relaxed)
    }
}

/// What to do with an offset once its message has been handled.
enum Verdict {
    Commit,
    Stop(IngestError),
}

/// Orchestrator that coordinates the ingest components.
///
/// Events are handled one at a time in arrival order. Offsets are committed
/// only once the dispatcher succeeded or the message was deliberately
/// skipped, so a restart resumes at the first unfinished event.
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    dispatcher: Dispatcher,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    stats: Arc<PipelineStats>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, dispatcher: Dispatcher) -> Self {
        Self::with_config(consumer, dispatcher, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        dispatcher: Dispatcher,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            dispatcher,
            config,
            shutdown_tx,
            stats: Arc::new(PipelineStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Run the orchestrator.
    ///
    /// Returns `Ok(())` when the stream ends or on Ctrl+C, and an error when
    /// an event could not be applied within the delivery budget.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        info!("Starting search sync orchestrator");

        self.consumer.subscribe()?;

        let (event_transmitter, mut event_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);
        let (ack_transmitter, ack_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);

        let consumer = Arc::clone(&self.consumer);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer
                .run(event_transmitter, ack_receiver, shutdown_rx)
                .await
            {
                error!(error = %e, "Consumer error");
            }
        });

        info!("Ready to process change events");

        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut prev_events: u64 = 0;
        let mut prev_docs: u64 = 0;
        let mut prev_time = Instant::now();

        let mut result = Ok(());

        loop {
            tokio::select! {
                msg = event_receiver.recv() => {
                    let (offset, verdict) = match msg {
                        Some(StreamMessage::Event { event, offset }) => {
                            let verdict = self.handle_event(&event, &offset).await;
                            (offset, verdict)
                        }
                        Some(StreamMessage::Skipped { reason, offset }) => {
                            self.handle_skip(&reason, &offset);
                            (offset, Verdict::Commit)
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                            continue;
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                        Some(StreamMessage::Acknowledgment { .. }) => {
                            warn!("Received acknowledgment on event channel (should be on ack channel)");
                            continue;
                        }
                    };

                    match verdict {
                        Verdict::Commit => {
                            let _ = ack_transmitter.send(StreamMessage::Acknowledgment {
                                offset,
                                commit: true,
                                error: None,
                            }).await;
                        }
                        Verdict::Stop(e) => {
                            let _ = ack_transmitter.send(StreamMessage::Acknowledgment {
                                offset,
                                commit: false,
                                error: Some(e.to_string()),
                            }).await;
                            let _ = self.shutdown_tx.send(());
                            result = Err(e);
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
                _ = progress_timer.tick() => {
                    let events = self.stats.events_processed.load(Ordering::Relaxed);
                    let docs = self.stats.documents_written();

                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(prev_time).as_secs_f64();
                    let rate = |current: u64, previous: u64| {
                        if elapsed_secs > 0.0 {
                            (current.saturating_sub(previous) as f64) / elapsed_secs
                        } else {
                            0.0
                        }
                    };

                    info!(
                        events_processed = events,
                        upserts = self.stats.upserts.load(Ordering::Relaxed),
                        deletes = self.stats.deletes.load(Ordering::Relaxed),
                        skipped = self.stats.skipped.load(Ordering::Relaxed),
                        failures = self.stats.failures.load(Ordering::Relaxed),
                        events_per_sec = format!("{:.2}", rate(events, prev_events)),
                        documents_per_sec = format!("{:.2}", rate(docs, prev_docs)),
                        "Processing progress"
                    );

                    prev_events = events;
                    prev_docs = docs;
                    prev_time = now;
                }
            }
        }

        // Closing both channels lets the consumer task finish.
        drop(event_receiver);
        drop(ack_transmitter);
        let _ = consumer_handle.await;

        info!(
            total_events_processed = self.stats.events_processed.load(Ordering::Relaxed),
            total_upserts = self.stats.upserts.load(Ordering::Relaxed),
            total_deletes = self.stats.deletes.load(Ordering::Relaxed),
            total_skipped = self.stats.skipped.load(Ordering::Relaxed),
            total_failures = self.stats.failures.load(Ordering::Relaxed),
            "Orchestrator shutdown complete"
        );
        result
    }

    async fn handle_event(&self, event: &ChangeEvent, offset: &MessageOffset) -> Verdict {
        match self.deliver(event, offset).await {
            Ok(outcome) => {
                self.stats.record(outcome);
                Verdict::Commit
            }
            Err(e) if e.is_decode() => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    topic = %offset.topic,
                    partition = offset.partition,
                    offset = offset.offset,
                    table = %event.source_table,
                    error = %e,
                    "Event cannot be decoded, committing past it"
                );
                Verdict::Commit
            }
            Err(e) if e.is_not_found() => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    topic = %offset.topic,
                    partition = offset.partition,
                    offset = offset.offset,
                    table = %event.source_table,
                    error = %e,
                    "Row no longer exists, skipping event"
                );
                Verdict::Commit
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    topic = %offset.topic,
                    partition = offset.partition,
                    offset = offset.offset,
                    table = %event.source_table,
                    error = %e,
                    "Delivery attempts exhausted, stopping without commit"
                );
                Verdict::Stop(e)
            }
        }
    }

    /// Hand `event` to the dispatcher, redelivering with backoff on failure.
    ///
    /// Decode errors are returned at once; no redelivery can fix them.
    async fn deliver(
        &self,
        event: &ChangeEvent,
        offset: &MessageOffset,
    ) -> Result<DispatchOutcome, IngestError> {
        let max_attempts = self.config.max_delivery_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.dispatcher.process(event).await {
                Ok(outcome) => {
                    debug!(
                        table = %event.source_table,
                        op = event.operation.code(),
                        committed_at = ?event.committed_at(),
                        outcome = ?outcome,
                        "Event applied"
                    );
                    return Ok(outcome);
                }
                Err(e) if e.is_decode() || attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let backoff = self.config.backoff_for(attempt);
                    warn!(
                        topic = %offset.topic,
                        partition = offset.partition,
                        offset = offset.offset,
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Event delivery failed, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    fn handle_skip(&self, reason: &SkipReason, offset: &MessageOffset) {
        match reason {
            SkipReason::Tombstone => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                debug!(
                    topic = %offset.topic,
                    partition = offset.partition,
                    offset = offset.offset,
                    "Skipping tombstone"
                );
            }
            SkipReason::Undecodable(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    topic = %offset.topic,
                    partition = offset.partition,
                    offset = offset.offset,
                    error = %e,
                    "Message cannot be decoded, committing past it"
                );
            }
        }
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// A handle that triggers shutdown without borrowing the orchestrator.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}

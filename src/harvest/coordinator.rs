//! Batch coordinator - concurrent fetch orchestration
//!
//! This module runs one batch of fetch-and-extract work:
//! - Bounding in-flight workers with a semaphore
//! - Isolating per-URL failures as recorded outcomes
//! - Writing each outcome back into the registry as soon as it is joined
//! - Streaming progress events to the caller
//! - Building the combined report in registry order once every URL is done

use crate::config::FetcherConfig;
use crate::extract::ExtractionMode;
use crate::harvest::fetcher::{build_http_client, run_worker};
use crate::harvest::progress::{ProgressEvent, ProgressPhase};
use crate::registry::{Outcome, UrlEntry, UrlRegistry};
use crate::report::build_report;
use crate::GatherError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Per-batch outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Distinct URLs submitted
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// URLs that never reached an outcome because the batch was cancelled
    pub cancelled: usize,

    /// Outcomes dropped because their URL left the registry mid-batch
    pub discarded: usize,
}

/// Terminal result of a batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Combined report over the whole registry, in registry order
    pub report: String,

    /// Registry snapshot the report was built from
    pub entries: Vec<UrlEntry>,

    pub summary: BatchSummary,
}

/// Runs batches of fetch workers against a shared registry
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    client: Client,
    registry: Arc<UrlRegistry>,
    concurrency: usize,
}

impl BatchCoordinator {
    /// Creates a coordinator with a client built from `config`
    ///
    /// # Returns
    ///
    /// * `Ok(BatchCoordinator)` - Ready to run batches
    /// * `Err(GatherError)` - The HTTP client could not be built
    pub fn new(config: &FetcherConfig, registry: Arc<UrlRegistry>) -> Result<Self, GatherError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            registry,
            config.max_concurrent_fetches,
        ))
    }

    /// Creates a coordinator around an existing client
    ///
    /// A concurrency of zero is raised to one.
    pub fn with_client(client: Client, registry: Arc<UrlRegistry>, concurrency: usize) -> Self {
        Self {
            client,
            registry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn registry(&self) -> &Arc<UrlRegistry> {
        &self.registry
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Starts a batch in the background and returns immediately
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, urls: Vec<String>, mode: ExtractionMode) -> BatchHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let coordinator = self.clone();
        let batch_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            coordinator
                .run_batch(urls, mode, events_tx, batch_cancel)
                .await
        });

        BatchHandle {
            events: events_rx,
            cancel,
            task,
        }
    }

    /// Runs one batch to completion
    ///
    /// # Flow
    ///
    /// 1. Drop repeated URLs, keeping the first occurrence
    /// 2. Spawn one task per URL; each waits for a semaphore permit
    /// 3. Record outcomes in the registry in completion order
    /// 4. Build the combined report from a registry snapshot
    ///
    /// Cancelling `cancel` stops queued workers from starting and drops
    /// in-flight fetches at their next suspension point; their URLs keep
    /// whatever the registry held before.
    pub async fn run_batch(
        &self,
        urls: Vec<String>,
        mode: ExtractionMode,
        events: mpsc::UnboundedSender<ProgressEvent>,
        cancel: CancellationToken,
    ) -> BatchReport {
        let urls = dedupe_preserving_order(urls);
        let total = urls.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        tracing::info!(
            "Starting batch of {} URLs ({} mode, concurrency {})",
            total,
            mode,
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();

        for (index, url) in urls.iter().cloned().enumerate() {
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let events = events.clone();
            let cancel = cancel.clone();

            workers.spawn(async move {
                let work = async move {
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    let _ = events.send(ProgressEvent {
                        index,
                        total,
                        url: url.clone(),
                        phase: ProgressPhase::Started,
                        completed: completed.load(Ordering::SeqCst),
                    });
                    Some(run_worker(&client, &url, mode).await)
                };

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    outcome = work => outcome,
                };

                (index, outcome)
            });
        }

        let mut unresolved: Vec<bool> = vec![true; total];

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Some(outcome))) => {
                    unresolved[index] = false;
                    self.record(&urls[index], index, outcome, &completed, &events, &mut summary);
                }
                Ok((index, None)) => {
                    unresolved[index] = false;
                    tracing::debug!("Skipped cancelled URL: {}", urls[index]);
                    summary.cancelled += 1;
                }
                Err(e) => {
                    tracing::error!("Worker task ended without an outcome: {}", e);
                }
            }
        }

        // A worker that died without reporting still owes its URL an outcome
        for (index, url) in urls.iter().enumerate() {
            if !unresolved[index] {
                continue;
            }
            if cancel.is_cancelled() {
                summary.cancelled += 1;
            } else {
                let outcome = Outcome::Error(format!("Error fetching {}: worker task failed", url));
                self.record(url, index, outcome, &completed, &events, &mut summary);
            }
        }

        let entries = self.registry.snapshot();
        let report = build_report(&entries);

        tracing::info!(
            "Batch finished: {} succeeded, {} failed, {} cancelled, {} discarded",
            summary.succeeded,
            summary.failed,
            summary.cancelled,
            summary.discarded
        );

        BatchReport {
            report,
            entries,
            summary,
        }
    }

    /// Writes one outcome to the registry and announces it
    ///
    /// An outcome for a URL that is no longer registered is not counted and
    /// produces no event.
    fn record(
        &self,
        url: &str,
        index: usize,
        outcome: Outcome,
        completed: &AtomicUsize,
        events: &mpsc::UnboundedSender<ProgressEvent>,
        summary: &mut BatchSummary,
    ) {
        let succeeded = outcome.is_success();
        if !self.registry.set_outcome(url, outcome) {
            summary.discarded += 1;
            return;
        }

        let phase = if succeeded {
            summary.succeeded += 1;
            ProgressPhase::Completed
        } else {
            summary.failed += 1;
            ProgressPhase::Failed
        };
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

        let _ = events.send(ProgressEvent {
            index,
            total: summary.total,
            url: url.to_string(),
            phase,
            completed: done,
        });
    }
}

/// Caller-side view of a running batch
///
/// Progress is read without blocking through [`BatchHandle::try_next_event`]
/// or awaited with [`BatchHandle::next_event`]; the terminal report comes
/// from [`BatchHandle::finish`].
#[derive(Debug)]
pub struct BatchHandle {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    cancel: CancellationToken,
    task: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Waits for the next progress event
    ///
    /// Returns `None` once the batch has finished and every event was read.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Returns a pending progress event without waiting
    pub fn try_next_event(&mut self) -> Option<ProgressEvent> {
        self.events.try_recv().ok()
    }

    /// Requests cancellation of the batch
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the batch and returns its report
    pub async fn finish(self) -> Result<BatchReport, GatherError> {
        self.task
            .await
            .map_err(|e| GatherError::Batch(e.to_string()))
    }
}

/// Drops repeated URLs while keeping first-seen order
fn dedupe_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

//! Queue Worker
//!
//! Single background consumer that drains the card queue in batches,
//! resolves uncached names through the fetcher, and stores every outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::SharedCache;
use crate::config::{FetcherConfig, WorkerConfig};
use crate::error::QueueError;
use crate::upstream::{Connector, Fetcher};
use crate::worker::queue::{CardQueue, Consumer, QueueItem};

// == Worker State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

// == Worker Counters ==
#[derive(Debug, Default)]
struct Counters {
    batches: AtomicU64,
    fetched: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time copy of the worker's lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerCounters {
    /// Non-empty batches processed
    pub batches: u64,
    /// Names resolved through the fetcher
    pub fetched: u64,
    /// Names skipped because they were already cached
    pub skipped: u64,
}

struct RunHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

// == Queue Worker ==
/// Owns the pending-name queue and the lifecycle of its background loop.
pub struct QueueWorker {
    queue: Arc<CardQueue>,
    cache: SharedCache,
    connector: Connector,
    fetcher_config: FetcherConfig,
    config: WorkerConfig,
    counters: Arc<Counters>,
    state: watch::Sender<WorkerState>,
    run: Mutex<Option<RunHandle>>,
}

impl QueueWorker {
    pub fn new(
        cache: SharedCache,
        connector: Connector,
        fetcher_config: FetcherConfig,
        config: WorkerConfig,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Stopped);
        Self {
            queue: Arc::new(CardQueue::new(config.max_queue_size, config.enqueue_timeout)),
            cache,
            connector,
            fetcher_config,
            config,
            counters: Arc::new(Counters::default()),
            state,
            run: Mutex::new(None),
        }
    }

    // == Lifecycle ==
    /// Launches the background loop. No-op if it is already running.
    pub async fn start(&self) {
        let mut run = self.run.lock().await;
        if run.is_some() {
            debug!("Queue worker already running");
            return;
        }

        self.state.send_replace(WorkerState::Starting);
        let shutdown = CancellationToken::new();
        let worker_loop = WorkerLoop {
            queue: Arc::clone(&self.queue),
            cache: Arc::clone(&self.cache),
            connector: Arc::clone(&self.connector),
            fetcher_config: self.fetcher_config.clone(),
            config: self.config.clone(),
            counters: Arc::clone(&self.counters),
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(worker_loop.run());

        *run = Some(RunHandle { shutdown, task });
        self.state.send_replace(WorkerState::Running);
        info!("Queue worker started");
    }

    /// Signals the loop to exit and waits for it, aborting the task once the
    /// grace period elapses. No-op if not running.
    pub async fn stop(&self) {
        let mut run = self.run.lock().await;
        let Some(RunHandle { shutdown, mut task }) = run.take() else {
            return;
        };

        self.state.send_replace(WorkerState::Stopping);
        shutdown.cancel();

        match tokio::time::timeout(self.config.stop_grace_period, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "Queue worker task ended abnormally"),
            Err(_) => {
                warn!("Queue worker did not stop gracefully, forcing stop");
                task.abort();
                let _ = task.await;
            }
        }

        self.state.send_replace(WorkerState::Stopped);
        info!("Queue worker stopped");
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    // == Queue Access ==
    /// Queues `name` for resolution. False if the queue stayed full for the
    /// whole enqueue timeout.
    pub async fn enqueue(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.try_enqueue(name.clone()).await {
            Ok(()) => true,
            Err(QueueError::Full) => {
                warn!(card = %name, "Queue full, unable to add");
                false
            }
            Err(e) => {
                error!(card = %name, error = %e, "Unexpected error adding card to queue");
                false
            }
        }
    }

    pub async fn try_enqueue(&self, name: String) -> Result<(), QueueError> {
        self.queue.push(name).await
    }

    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Enqueued names not yet completed.
    pub fn pending(&self) -> usize {
        self.queue.unfinished()
    }

    /// Waits until every enqueued name has been completed.
    pub async fn join(&self) {
        self.queue.join().await
    }

    pub fn counters(&self) -> WorkerCounters {
        WorkerCounters {
            batches: self.counters.batches.load(Ordering::Relaxed),
            fetched: self.counters.fetched.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }
}

// == Worker Loop ==
/// State moved into the spawned task for one active lifetime.
struct WorkerLoop {
    queue: Arc<CardQueue>,
    cache: SharedCache,
    connector: Connector,
    fetcher_config: FetcherConfig,
    config: WorkerConfig,
    counters: Arc<Counters>,
    shutdown: CancellationToken,
}

impl WorkerLoop {
    async fn run(self) {
        // The fetcher, and with it the upstream session, lives exactly as
        // long as this run.
        let Some(fetcher) = self.open_fetcher().await else {
            return;
        };
        let mut consumer = self.queue.consumer().await;

        while !self.shutdown.is_cancelled() {
            let batch = match self.collect_batch(&mut consumer).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!(error = %e, "Unexpected error in queue worker");
                    if self.pause(self.config.error_pause).await {
                        break;
                    }
                    continue;
                }
            };

            if batch.is_empty() {
                if self.pause(self.config.idle_pause).await {
                    break;
                }
                continue;
            }

            info!(batch_size = batch.len(), "Processing batch of cards");
            self.counters.batches.fetch_add(1, Ordering::Relaxed);
            for item in batch {
                self.process(&fetcher, item).await;
            }
        }

        info!("Queue worker loop exited");
    }

    /// Connects to the upstream, retrying after a pause until cancelled.
    async fn open_fetcher(&self) -> Option<Fetcher> {
        loop {
            match (self.connector)() {
                Ok(lookup) => return Some(Fetcher::new(lookup, self.fetcher_config.clone())),
                Err(e) => {
                    error!(error = %e, "Failed to open upstream session");
                    if self.pause(self.config.error_pause).await {
                        return None;
                    }
                }
            }
        }
    }

    /// Pulls up to `batch_size` names, stopping at the first empty wait or on
    /// cancellation. Names already received are always returned.
    async fn collect_batch(&self, consumer: &mut Consumer<'_>) -> Result<Vec<QueueItem>, QueueError> {
        let mut batch = Vec::with_capacity(self.config.batch_size);

        while batch.len() < self.config.batch_size {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = consumer.next(self.config.dequeue_timeout) => next?,
            };
            match next {
                Some(item) => batch.push(item),
                None => break,
            }
        }

        Ok(batch)
    }

    /// Resolves one name unless a live entry already exists. The item is
    /// completed when it goes out of scope.
    async fn process(&self, fetcher: &Fetcher, item: QueueItem) {
        let name = item.name();

        if self.cache.read().await.contains(name) {
            debug!(card = %name, "Card already cached");
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        info!(card = %name, "Fetching card");
        let record = fetcher.fetch(name).await;
        if record.is_found() {
            info!(card = %name, "Caching card");
        } else {
            info!(card = %name, "No data found, caching as not found");
        }

        self.cache.write().await.set(name, record);
        self.counters.fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Sleeps for `duration`; true if cancelled first.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}

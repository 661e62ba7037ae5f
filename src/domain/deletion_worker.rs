//! Batched soft-deletion pipeline.
//!
//! Delete requests are accepted by [`DeletionPipeline::enqueue`] into a bounded
//! channel and applied by a single background worker that groups them into
//! batches. The caller only waits when the channel is full.
//!
//! A batch is flushed when it holds `max_batch_size` codes or when
//! `flush_interval` passes since the previous flush, whichever comes first.
//! Each flush is split per owner because
//! [`LinkStore::mark_deleted_batch`] is owner-scoped.
//!
//! Delivery is at-most-once: a batch the store rejects is logged and dropped.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::domain::delete_request::DeleteRequest;
use crate::domain::repositories::LinkStore;

pub const DEFAULT_QUEUE_CAPACITY: usize = 20;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
/// Shortest flush timer the worker runs with.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

/// Tuning knobs of the deletion pipeline.
#[derive(Debug, Clone)]
pub struct DeletionConfig {
    /// Pending requests the queue holds before `enqueue` starts waiting.
    pub queue_capacity: usize,
    /// Buffered codes that trigger an immediate flush.
    pub max_batch_size: usize,
    /// Maximum time buffered codes wait for a flush.
    pub flush_interval: Duration,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Why a delete request was not accepted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("deletion queue is closed")]
    Closed,

    #[error("deletion queue stopped by shutdown signal")]
    Cancelled,

    #[error("deletion queue is full")]
    Busy,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    #[error("deletion worker is already started")]
    AlreadyStarted,
}

/// Handle to the deletion queue. Cheap to clone; all clones share one queue.
#[derive(Clone)]
pub struct DeletionPipeline {
    inner: Arc<Inner>,
}

struct Inner {
    tx: mpsc::Sender<DeleteRequest>,
    rx: Mutex<Option<mpsc::Receiver<DeleteRequest>>>,
    store: Arc<dyn LinkStore>,
    config: DeletionConfig,
    closing: CancellationToken,
    shutdown: OnceLock<CancellationToken>,
}

impl DeletionPipeline {
    /// Creates the queue. No worker runs until [`Self::start`] is called.
    pub fn new(store: Arc<dyn LinkStore>, config: DeletionConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                tx,
                rx: Mutex::new(Some(rx)),
                store,
                config,
                closing: CancellationToken::new(),
                shutdown: OnceLock::new(),
            }),
        }
    }

    /// Spawns the background worker.
    ///
    /// `shutdown` is the process-wide cancellation token: once cancelled the
    /// worker drains the queue, flushes what it holds and exits, and blocked
    /// [`Self::enqueue`] calls return [`EnqueueError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AlreadyStarted`] on a second call; there is
    /// exactly one worker per pipeline.
    pub fn start(&self, shutdown: CancellationToken) -> Result<JoinHandle<()>, PipelineError> {
        let rx = self
            .inner
            .rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PipelineError::AlreadyStarted)?;

        let _ = self.inner.shutdown.set(shutdown.clone());

        let worker = DeletionWorker {
            rx,
            store: Arc::clone(&self.inner.store),
            max_batch_size: self.inner.config.max_batch_size.max(1),
            flush_interval: self.inner.config.flush_interval.max(MIN_FLUSH_INTERVAL),
            closing: self.inner.closing.clone(),
            shutdown,
        };

        Ok(tokio::spawn(worker.run()))
    }

    /// Queues a delete request, waiting while the queue is full.
    ///
    /// Returns as soon as the request is queued; the store is updated later by
    /// the worker and its errors never come back here.
    ///
    /// # Errors
    ///
    /// - [`EnqueueError::Closed`] after [`Self::close`]
    /// - [`EnqueueError::Cancelled`] once the shutdown token fires
    pub async fn enqueue(&self, request: DeleteRequest) -> Result<(), EnqueueError> {
        if request.is_empty() {
            return Ok(());
        }
        if self.inner.closing.is_cancelled() {
            return Err(EnqueueError::Closed);
        }

        let permit = tokio::select! {
            biased;
            _ = self.halted() => {
                return Err(if self.inner.closing.is_cancelled() {
                    EnqueueError::Closed
                } else {
                    EnqueueError::Cancelled
                });
            }
            permit = self.inner.tx.reserve() => permit.map_err(|_| EnqueueError::Closed)?,
        };

        debug!(
            owner_id = %request.owner_id,
            codes = request.len(),
            "delete request queued"
        );
        permit.send(request);

        Ok(())
    }

    /// Like [`Self::enqueue`], but gives up after `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Busy`] if the queue stayed full for the whole deadline.
    pub async fn enqueue_within(
        &self,
        request: DeleteRequest,
        deadline: Duration,
    ) -> Result<(), EnqueueError> {
        tokio::time::timeout(deadline, self.enqueue(request))
            .await
            .map_err(|_| EnqueueError::Busy)?
    }

    /// Stops accepting requests. The worker flushes everything already queued
    /// and exits. Safe to call repeatedly and together with the shutdown token.
    pub fn close(&self) {
        if !self.inner.closing.is_cancelled() {
            info!("Closing deletion queue");
        }
        self.inner.closing.cancel();
    }

    /// Returns true once [`Self::close`] was called or the worker is gone.
    pub fn is_closed(&self) -> bool {
        self.inner.closing.is_cancelled() || self.inner.tx.is_closed()
    }

    /// Requests waiting in the queue.
    pub fn pending(&self) -> usize {
        self.inner.tx.max_capacity() - self.inner.tx.capacity()
    }

    /// Maximum number of queued requests.
    pub fn capacity(&self) -> usize {
        self.inner.tx.max_capacity()
    }

    async fn halted(&self) {
        match self.inner.shutdown.get() {
            Some(shutdown) => tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = self.inner.closing.cancelled() => {}
            },
            None => self.inner.closing.cancelled().await,
        }
    }
}

/// Codes waiting for the next flush, grouped by owner.
#[derive(Debug, Default)]
struct DeleteBatch {
    by_owner: HashMap<String, HashSet<String>>,
    len: usize,
}

impl DeleteBatch {
    fn push(&mut self, request: DeleteRequest) {
        let codes = self.by_owner.entry(request.owner_id).or_default();
        for code in request.codes {
            if codes.insert(code) {
                self.len += 1;
            }
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn take(&mut self) -> HashMap<String, HashSet<String>> {
        self.len = 0;
        std::mem::take(&mut self.by_owner)
    }
}

struct DeletionWorker {
    rx: mpsc::Receiver<DeleteRequest>,
    store: Arc<dyn LinkStore>,
    max_batch_size: usize,
    flush_interval: Duration,
    closing: CancellationToken,
    shutdown: CancellationToken,
}

impl DeletionWorker {
    async fn run(mut self) {
        info!(
            max_batch_size = self.max_batch_size,
            flush_interval_ms = self.flush_interval.as_millis() as u64,
            "Deletion worker started"
        );

        let mut batch = DeleteBatch::default();
        let mut ticker = tokio::time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received, draining deletion queue");
                    break;
                }
                _ = self.closing.cancelled() => {
                    info!("Deletion queue closed, draining");
                    break;
                }
                received = self.rx.recv() => {
                    let Some(request) = received else {
                        info!("All deletion queue handles dropped");
                        break;
                    };
                    batch.push(request);
                    if batch.len() >= self.max_batch_size {
                        self.flush(&mut batch).await;
                        ticker.reset();
                    }
                }
                _ = ticker.tick() => self.flush(&mut batch).await,
            }
        }

        self.rx.close();
        while let Some(request) = self.rx.recv().await {
            batch.push(request);
            if batch.len() >= self.max_batch_size {
                self.flush(&mut batch).await;
            }
        }
        self.flush(&mut batch).await;

        info!("Deletion worker stopped");
    }

    async fn flush(&self, batch: &mut DeleteBatch) {
        if batch.is_empty() {
            return;
        }

        for (owner_id, codes) in batch.take() {
            let mut codes: Vec<String> = codes.into_iter().collect();
            codes.sort_unstable();

            match self.store.mark_deleted_batch(&owner_id, &codes).await {
                Ok(()) => info!(
                    owner_id = %owner_id,
                    count = codes.len(),
                    "Links marked as deleted"
                ),
                Err(e) => error!(
                    error = %e,
                    owner_id = %owner_id,
                    count = codes.len(),
                    "Failed to mark links as deleted, batch dropped"
                ),
            }
        }
    }
}

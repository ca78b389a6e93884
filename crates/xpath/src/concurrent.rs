//! The concurrent axis: evaluates an inner axis on a worker thread and
//! hands its keys to the consumer through a bounded channel.
//!
//! # Architecture
//!
//! ```text
//! worker thread                      consumer (has_next / next)
//!   inner axis + cloned cursor  ->  bounded channel  ->  caller's cursor
//! ```
//!
//! The worker owns a clone of the caller's cursor, so the caller's cursor is
//! never moved by the producer. The channel bound is the only backpressure:
//! once it is full the worker blocks in `send_blocking` until the consumer
//! pulls. The stream always ends with exactly one terminal item, `End` or
//! `Failed`.
//!
//! Abandoning the axis (`reset` or drop) sets the cancellation flag, closes
//! the channel and joins the worker, which hands back the inner axis and its
//! cursor for the next run.

use crate::axis::{BoxedAxis, Traversal, TraversalAxis};
use crate::config::ConcurrencyConfig;
use crate::error::AxisError;
use log::{debug, trace, warn};
use std::any::Any;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use strata_cursor::NodeCursor;
use strata_types::NodeKey;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

static NEXT_WORKER_ID: AtomicUsize = AtomicUsize::new(0);

/// One item on the worker channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueueItem {
    Key(NodeKey),
    End,
    Failed(AxisError),
}

/// Caps the number of workers running at the same time. Clones share the
/// same permits, so one limiter can be spread over several queries.
#[derive(Debug, Clone)]
pub struct WorkerLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerLimiter {
    /// The largest cap a limiter can hold.
    pub const MAX_WORKERS: usize = Semaphore::MAX_PERMITS;

    /// Larger caps are clamped to [`WorkerLimiter::MAX_WORKERS`].
    pub fn new(max_workers: usize) -> Self {
        let capacity = max_workers.min(Self::MAX_WORKERS);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a running worker.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).try_acquire_owned().ok()
    }
}

/// What a worker owns while it runs, and returns when it is joined.
struct WorkerParts<C: NodeCursor> {
    axis: BoxedAxis<C>,
    cursor: C,
}

struct Worker<C: NodeCursor> {
    id: usize,
    receiver: async_channel::Receiver<QueueItem>,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<WorkerParts<C>>,
}

enum Stage<C: NodeCursor> {
    /// Not running. `finished` is false until the first run has started.
    Idle {
        parts: WorkerParts<C>,
        finished: bool,
    },
    Running(Worker<C>),
    /// No permit was available: the inner axis runs in the consumer's
    /// thread, still on the private cursor.
    Inline(WorkerParts<C>),
    /// The worker died and took the inner axis with it. The error is
    /// reported once.
    Broken(Option<AxisError>),
}

/// Traversal half of [`ConcurrentAxis`].
pub struct ConcurrentTraversal<C: NodeCursor> {
    stage: Stage<C>,
    buffer_size: usize,
    limiter: Option<WorkerLimiter>,
    produced: Arc<AtomicUsize>,
}

/// An axis whose inner axis is evaluated on a worker thread.
pub type ConcurrentAxis<C> = TraversalAxis<ConcurrentTraversal<C>>;

impl<C: NodeCursor> ConcurrentTraversal<C> {
    /// Wraps `inner`, cloning `cursor` for the worker.
    pub fn new(inner: BoxedAxis<C>, cursor: &C) -> Self {
        Self {
            stage: Stage::Idle {
                parts: WorkerParts {
                    axis: inner,
                    cursor: cursor.clone(),
                },
                finished: false,
            },
            buffer_size: ConcurrencyConfig::default().buffer_size,
            limiter: None,
            produced: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn with_limiter(mut self, limiter: WorkerLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn into_axis(self) -> ConcurrentAxis<C> {
        TraversalAxis::new(self)
    }

    /// Keys handed to the channel by the current run's worker so far.
    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::Acquire)
    }

    pub fn is_running_inline(&self) -> bool {
        matches!(self.stage, Stage::Inline(_))
    }

    pub fn has_worker(&self) -> bool {
        matches!(self.stage, Stage::Running(_))
    }

    fn launch(&mut self, start: NodeKey) {
        let parts = match mem::replace(&mut self.stage, Stage::Broken(None)) {
            Stage::Idle { parts, .. } | Stage::Inline(parts) => parts,
            Stage::Running(worker) => {
                self.stage = Stage::Running(worker);
                return;
            }
            Stage::Broken(_) => {
                self.stage = Stage::Broken(Some(AxisError::WorkerFailure(
                    "inner axis was lost with a failed worker".into(),
                )));
                return;
            }
        };
        self.produced.store(0, Ordering::Release);

        let permit = match &self.limiter {
            Some(limiter) => match limiter.try_acquire() {
                Some(permit) => Some(permit),
                None => {
                    warn!(
                        "No worker permit available ({} max), evaluating inline.",
                        limiter.capacity()
                    );
                    let mut parts = parts;
                    parts.axis.reset(start);
                    self.stage = Stage::Inline(parts);
                    return;
                }
            },
            None => None,
        };

        let id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = async_channel::bounded(self.buffer_size);
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);
        let produced = Arc::clone(&self.produced);

        let spawned = thread::Builder::new()
            .name(format!("strata-axis-worker-{}", id))
            .spawn(move || {
                let _permit = permit;
                let WorkerParts {
                    mut axis,
                    mut cursor,
                } = parts;
                debug!("[AXIS-WORKER-{}] Started from key {}.", id, start);
                axis.reset(start);
                match produce(&mut axis, &mut cursor, &sender, &worker_cancelled, &produced) {
                    Ok(count) => debug!("[AXIS-WORKER-{}] Finished after {} keys.", id, count),
                    Err(AxisError::Cancelled) => {
                        debug!("[AXIS-WORKER-{}] Cancelled by consumer.", id)
                    }
                    Err(e) => debug!("[AXIS-WORKER-{}] Forwarded failure: {}", id, e),
                }
                WorkerParts { axis, cursor }
            });

        self.stage = match spawned {
            Ok(handle) => Stage::Running(Worker {
                id,
                receiver,
                cancelled,
                handle,
            }),
            Err(e) => {
                warn!("[AXIS-WORKER-{}] Could not be spawned: {}", id, e);
                Stage::Broken(Some(AxisError::WorkerFailure(format!(
                    "failed to spawn worker thread: {}",
                    e
                ))))
            }
        };
    }

    /// Stops a running worker and takes its parts back. No-op otherwise.
    fn cancel(&mut self) {
        if !matches!(self.stage, Stage::Running(_)) {
            return;
        }
        if let Stage::Running(worker) = mem::replace(&mut self.stage, Stage::Broken(None)) {
            debug!("[AXIS-WORKER-{}] Cancelling.", worker.id);
            worker.cancelled.store(true, Ordering::Release);
            worker.receiver.close();
            self.stage = join(worker);
        }
    }

    /// Joins the worker after its terminal item and keeps its parts.
    fn finish(&mut self) {
        if let Stage::Running(worker) = mem::replace(&mut self.stage, Stage::Broken(None)) {
            self.stage = join(worker);
        }
    }

    fn settle_inline(&mut self) {
        if let Stage::Inline(parts) = mem::replace(&mut self.stage, Stage::Broken(None)) {
            self.stage = Stage::Idle {
                parts,
                finished: true,
            };
        }
    }
}

fn join<C: NodeCursor>(worker: Worker<C>) -> Stage<C> {
    let id = worker.id;
    drop(worker.receiver);
    match worker.handle.join() {
        Ok(parts) => Stage::Idle {
            parts,
            finished: true,
        },
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!("[AXIS-WORKER-{}] Terminated abnormally: {}", id, message);
            Stage::Broken(Some(AxisError::WorkerFailure(message)))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// The worker loop. Returns the number of keys sent on `End`, the failure
/// it forwarded, or `Cancelled` when the consumer went away.
fn produce<C: NodeCursor>(
    axis: &mut BoxedAxis<C>,
    cursor: &mut C,
    sender: &async_channel::Sender<QueueItem>,
    cancelled: &AtomicBool,
    produced: &AtomicUsize,
) -> Result<usize, AxisError> {
    let mut count = 0;
    loop {
        if cancelled.load(Ordering::Acquire) {
            return Err(AxisError::Cancelled);
        }
        let item = match axis.has_next(cursor) {
            Ok(true) => match axis.next(cursor) {
                Ok(key) => QueueItem::Key(key),
                Err(e) => QueueItem::Failed(e),
            },
            Ok(false) => QueueItem::End,
            Err(e) => QueueItem::Failed(e),
        };
        let outcome = match &item {
            QueueItem::Key(key) => {
                trace!("Producing key {}", key);
                None
            }
            QueueItem::End => Some(Ok(count)),
            QueueItem::Failed(e) => Some(Err(e.clone())),
        };
        if sender.send_blocking(item).is_err() {
            return Err(AxisError::Cancelled);
        }
        match outcome {
            None => {
                count += 1;
                produced.fetch_add(1, Ordering::Release);
            }
            Some(result) => return result,
        }
    }
}

impl<C: NodeCursor> Traversal<C> for ConcurrentTraversal<C> {
    fn restart(&mut self, start: NodeKey) {
        self.cancel();
        self.launch(start);
    }

    fn advance(
        &mut self,
        _cursor: &mut C,
        start: NodeKey,
        _previous: Option<NodeKey>,
    ) -> Result<Option<NodeKey>, AxisError> {
        if let Stage::Idle {
            finished: false, ..
        } = self.stage
        {
            self.launch(start);
        }

        let received = match &mut self.stage {
            Stage::Idle { .. } => return Ok(None),
            Stage::Broken(error) => return error.take().map_or(Ok(None), Err),
            Stage::Inline(parts) => {
                let result = match parts.axis.has_next(&mut parts.cursor) {
                    Ok(true) => parts.axis.next(&mut parts.cursor).map(Some),
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                };
                if !matches!(result, Ok(Some(_))) {
                    self.settle_inline();
                }
                return result;
            }
            Stage::Running(worker) => worker.receiver.recv_blocking(),
        };

        match received {
            Ok(QueueItem::Key(key)) => Ok(Some(key)),
            Ok(QueueItem::End) => {
                self.finish();
                Ok(None)
            }
            Ok(QueueItem::Failed(e)) => {
                self.finish();
                Err(e)
            }
            // Closed without a terminal item: the worker died.
            Err(_) => {
                self.finish();
                match &mut self.stage {
                    Stage::Broken(error) => Err(error.take().unwrap_or_else(|| {
                        AxisError::WorkerFailure("worker ended without a terminal item".into())
                    })),
                    _ => Err(AxisError::WorkerFailure(
                        "worker ended without a terminal item".into(),
                    )),
                }
            }
        }
    }
}

impl<C: NodeCursor> Drop for ConcurrentTraversal<C> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Builds a concurrent axis over `inner` from `config`.
pub fn concurrent_axis<C: NodeCursor>(
    inner: BoxedAxis<C>,
    cursor: &C,
    config: &ConcurrencyConfig,
    limiter: Option<&WorkerLimiter>,
) -> BoxedAxis<C> {
    let mut traversal =
        ConcurrentTraversal::new(inner, cursor).with_buffer_size(config.effective_buffer_size());
    if let Some(limiter) = limiter {
        traversal = traversal.with_limiter(limiter.clone());
    }
    Box::new(traversal.into_axis())
}

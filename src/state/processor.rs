//! The concurrency core: one driver task per store that orders every job.
//!
//! Reducers and read-actions arrive on two unbounded queues. The driver loop
//! selects over both with reducers polled first, so whenever both queues hold
//! work the reducer wins. Reducers run inline and publish immediately, which
//! gives a total order over state transitions. Read-actions are spawned onto
//! their own tasks with a snapshot of the current state, so a slow side effect
//! never stalls the next reducer.
//!
//! A continuous stream of reducers can starve read-actions. That is the
//! accepted price of the priority policy and is kept on purpose.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use uuid::Uuid;

use crate::error::{panic_message, StoreError, StoreResult};
use crate::logger::{LoggerExt, SharedLogger};
use crate::mvi::VectorState;
use crate::state::context::ExecutionContext;
use crate::state::holder::StateHolder;
use crate::state::job::{Job, ReadJob, ReducerJob};
use crate::state::lifecycle::ClearSignal;

/// When the driver loop begins draining the queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// Start processing as soon as the processor is created.
    #[default]
    Eager,
    /// Only enqueue until [`StateProcessor::start`] is called. Makes job
    /// ordering deterministic in tests.
    Lazy,
}

/// Counters describing what a processor has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    pub reducers_applied: u64,
    /// Reducers that reached the loop after the holder was cleared.
    pub reducers_skipped: u64,
    pub reads_dispatched: u64,
    /// Read-actions that panicked inside their own task.
    pub read_failures: u64,
    /// Jobs offered after teardown.
    pub jobs_dropped: u64,
}

#[derive(Default)]
struct StatsCounters {
    reducers_applied: AtomicU64,
    reducers_skipped: AtomicU64,
    reads_dispatched: AtomicU64,
    read_failures: AtomicU64,
    jobs_dropped: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> ProcessorStats {
        ProcessorStats {
            reducers_applied: self.reducers_applied.load(Ordering::Relaxed),
            reducers_skipped: self.reducers_skipped.load(Ordering::Relaxed),
            reads_dispatched: self.reads_dispatched.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            jobs_dropped: self.jobs_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Receiving ends of both job queues.
struct JobQueues<S> {
    reducers: mpsc::UnboundedReceiver<ReducerJob<S>>,
    reads: mpsc::UnboundedReceiver<ReadJob<S>>,
}

impl<S> JobQueues<S> {
    /// Next ready job without waiting, reducers first.
    fn try_next(&mut self) -> Option<Job<S>> {
        if let Ok(reducer) = self.reducers.try_recv() {
            return Some(Job::Reduce(reducer));
        }
        self.reads.try_recv().ok().map(Job::Read)
    }
}

/// Everything needed to execute a job, shared by the driver loop and `drain`.
struct Worker<S: VectorState> {
    id: Uuid,
    holder: Arc<StateHolder<S>>,
    context: ExecutionContext,
    stats: Arc<StatsCounters>,
    logger: SharedLogger,
}

impl<S: VectorState> Clone for Worker<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            holder: Arc::clone(&self.holder),
            context: self.context.clone(),
            stats: Arc::clone(&self.stats),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<S: VectorState> Worker<S> {
    /// Apply a reducer to the current state and publish the result.
    ///
    /// A cleared holder means the store is going away: the reducer is skipped.
    fn apply_reducer(&self, reducer: ReducerJob<S>) -> StoreResult<()> {
        if self.holder.is_cleared() {
            self.stats.reducers_skipped.fetch_add(1, Ordering::Relaxed);
            self.logger
                .logv(|| "Skipping reducer, StateHolder already cleared".to_string());
            return Ok(());
        }
        let current = self.holder.current_state()?;
        let new_state = reducer.apply(&current);
        self.holder.publish(new_state);
        self.stats.reducers_applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Snapshot the current state and spawn the read-action into `tasks`.
    fn dispatch_read(&self, action: ReadJob<S>, tasks: &mut JoinSet<()>) -> StoreResult<()> {
        if self.holder.is_cleared() {
            self.logger
                .logv(|| "Skipping read-action, StateHolder already cleared".to_string());
            return Ok(());
        }
        let snapshot = self.holder.current_state()?;
        self.context.spawn_into(tasks, action.run(snapshot));
        self.stats.reads_dispatched.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record how a spawned read-action ended. Panics stay inside the task.
    fn record_read(&self, result: Result<(), JoinError>) {
        let Err(error) = result else {
            return;
        };
        if error.is_panic() {
            self.stats.read_failures.fetch_add(1, Ordering::Relaxed);
            let message = panic_message(error.into_panic().as_ref());
            self.logger
                .logw(|| format!("Read-action panicked in StateProcessor {}: {}", self.id, message));
        }
    }
}

struct ProcessorInner<S: VectorState> {
    worker: Worker<S>,
    reducer_tx: mpsc::UnboundedSender<ReducerJob<S>>,
    read_tx: mpsc::UnboundedSender<ReadJob<S>>,
    /// Present until the driver loop (or `drain`) takes ownership.
    queues: Mutex<Option<JobQueues<S>>>,
    driver: Mutex<Option<JoinHandle<()>>>,
    cleared: ClearSignal,
}

impl<S: VectorState> Drop for ProcessorInner<S> {
    fn drop(&mut self) {
        self.cleared.signal();
    }
}

/// Serializes all reads and writes of one store's state.
///
/// Cloning yields another handle to the same processor, which is how jobs
/// enqueue follow-up jobs on the processor running them.
pub struct StateProcessor<S: VectorState> {
    inner: Arc<ProcessorInner<S>>,
}

impl<S: VectorState> Clone for StateProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: VectorState> StateProcessor<S> {
    /// Create a processor over `holder`.
    ///
    /// With [`StartMode::Eager`] the driver loop is spawned on `context`
    /// immediately.
    pub fn new(
        holder: Arc<StateHolder<S>>,
        logger: SharedLogger,
        context: ExecutionContext,
        start_mode: StartMode,
    ) -> Self {
        let (reducer_tx, reducers) = mpsc::unbounded_channel();
        let (read_tx, reads) = mpsc::unbounded_channel();

        let processor = Self {
            inner: Arc::new(ProcessorInner {
                worker: Worker {
                    id: Uuid::new_v4(),
                    holder,
                    context,
                    stats: Arc::new(StatsCounters::default()),
                    logger,
                },
                reducer_tx,
                read_tx,
                queues: Mutex::new(Some(JobQueues { reducers, reads })),
                driver: Mutex::new(None),
                cleared: ClearSignal::new(),
            }),
        };

        match start_mode {
            StartMode::Eager => processor.start(),
            StartMode::Lazy => processor.inner.worker.logger.logv(|| {
                "Starting in Lazy mode. Call start() to begin processing actions and reducers"
                    .to_string()
            }),
        }

        processor
    }

    /// Identifier used in this processor's log lines.
    pub fn id(&self) -> Uuid {
        self.inner.worker.id
    }

    /// Enqueue a reducer. Never blocks; dropped silently after teardown.
    pub fn offer_reducer(&self, reducer: impl FnOnce(&S) -> S + Send + 'static) {
        if self.inner.cleared.is_cleared() {
            self.dropped("reducer");
            return;
        }
        if self.inner.reducer_tx.send(ReducerJob::new(reducer)).is_err() {
            self.dropped("reducer");
        }
    }

    /// Enqueue a read-action. Never blocks; dropped silently after teardown.
    ///
    /// The action receives a snapshot reflecting every reducer offered before
    /// it and runs on its own task.
    pub fn offer_read<F, Fut>(&self, action: F)
    where
        F: FnOnce(S) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        if self.inner.cleared.is_cleared() {
            self.dropped("read-action");
            return;
        }
        if self.inner.read_tx.send(ReadJob::new(action)).is_err() {
            self.dropped("read-action");
        }
    }

    fn dropped(&self, kind: &str) {
        let worker = &self.inner.worker;
        worker.stats.jobs_dropped.fetch_add(1, Ordering::Relaxed);
        worker
            .logger
            .logv(|| format!("Dropping {} offered to cleared StateProcessor {}", kind, worker.id));
    }

    /// Spawn the driver loop. Later calls, and calls after teardown, do nothing.
    pub fn start(&self) {
        let worker = &self.inner.worker;
        if self.inner.cleared.is_cleared() {
            worker
                .logger
                .logv(|| "Ignoring start() on a cleared StateProcessor".to_string());
            return;
        }
        let Some(queues) = self.inner.queues.lock().take() else {
            worker
                .logger
                .logv(|| "StateProcessor already started".to_string());
            return;
        };

        let handle = worker.context.spawn(run_driver(
            queues,
            worker.clone(),
            self.inner.cleared.clone(),
        ));
        *self.inner.driver.lock() = Some(handle);
        worker
            .logger
            .logd(|| format!("Started StateProcessor {}", worker.id));
    }

    /// Whether the driver loop is alive.
    pub fn is_running(&self) -> bool {
        self.inner
            .driver
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_cleared(&self) -> bool {
        self.inner.cleared.is_cleared()
    }

    pub fn stats(&self) -> ProcessorStats {
        self.inner.worker.stats.snapshot()
    }

    /// Process every queued job, including jobs those jobs enqueue, and wait
    /// for all read-actions dispatched along the way.
    ///
    /// Meant for tests and benchmarks on a lazily started processor.
    ///
    /// # Errors
    /// - [`StoreError::AlreadyStarted`] if the driver loop owns the queues.
    /// - [`StoreError::ReducerPanicked`] / [`StoreError::ReadActionPanicked`]
    ///   when a job panics.
    /// - [`StoreError::Uninitialized`] if the holder never received a state.
    pub async fn drain(&self) -> StoreResult<()> {
        if self.inner.cleared.is_cleared() {
            return Ok(());
        }
        let Some(queues) = self.inner.queues.lock().take() else {
            return Err(StoreError::AlreadyStarted);
        };

        let inner = Arc::clone(&self.inner);
        let mut queues = scopeguard::guard(queues, move |queues| {
            if !inner.cleared.is_cleared() {
                *inner.queues.lock() = Some(queues);
            }
        });
        let worker = &self.inner.worker;

        loop {
            let mut tasks = JoinSet::new();
            let mut processed = false;

            while !self.inner.cleared.is_cleared() {
                let Some(job) = queues.try_next() else {
                    break;
                };
                processed = true;
                let outcome = match job {
                    Job::Reduce(reducer) => {
                        match panic::catch_unwind(AssertUnwindSafe(|| worker.apply_reducer(reducer))) {
                            Ok(result) => result,
                            Err(payload) => Err(StoreError::ReducerPanicked {
                                message: panic_message(payload.as_ref()),
                            }),
                        }
                    }
                    Job::Read(action) => worker.dispatch_read(action, &mut tasks),
                };
                // Same hard stop as the driver loop. Once cleared, the guard
                // releases the queues instead of restoring them.
                if let Err(error) = outcome {
                    self.inner.cleared.signal();
                    return Err(error);
                }
            }

            while let Some(result) = tasks.join_next().await {
                if let Err(error) = result {
                    if error.is_panic() {
                        return Err(StoreError::ReadActionPanicked {
                            message: panic_message(error.into_panic().as_ref()),
                        });
                    }
                }
            }

            // Nested jobs may have refilled the queues; go around until a pass
            // finds nothing.
            if !processed || self.inner.cleared.is_cleared() {
                return Ok(());
            }
        }
    }

    /// Stop processing and release the queues. Idempotent.
    ///
    /// The driver loop exits at its next wake-up and aborts every read-action
    /// task it spawned.
    pub fn teardown(&self) {
        if self.inner.cleared.signal() {
            let worker = &self.inner.worker;
            worker
                .logger
                .logd(|| format!("Clearing StateProcessor {}", worker.id));
            drop(self.inner.queues.lock().take());
        }
    }
}

/// The driver loop: one iteration per job, reducers strictly before reads.
async fn run_driver<S: VectorState>(
    mut queues: JobQueues<S>,
    worker: Worker<S>,
    cleared: ClearSignal,
) {
    // Dropping the set on exit aborts every outstanding read-action.
    let mut tasks: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = cleared.wait() => break,

            Some(reducer) = queues.reducers.recv() => {
                if !drive_reducer(&worker, &cleared, reducer) {
                    break;
                }
            }

            Some(action) = queues.reads.recv() => {
                if !dispatch_read_in_order(&mut queues, &worker, &cleared, action, &mut tasks) {
                    break;
                }
            }

            Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                worker.record_read(result);
            }

            else => break,
        }
    }

    worker
        .logger
        .logv(|| format!("StateProcessor {} driver loop finished", worker.id));
}

/// Apply one reducer inside the driver loop. Returns false once the processor
/// has to stop.
fn drive_reducer<S: VectorState>(
    worker: &Worker<S>,
    cleared: &ClearSignal,
    reducer: ReducerJob<S>,
) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| worker.apply_reducer(reducer))) {
        Ok(Ok(())) => true,
        Ok(Err(error)) => {
            worker
                .logger
                .logw(|| format!("Stopping StateProcessor {}: {}", worker.id, error));
            cleared.signal();
            false
        }
        Err(payload) => {
            worker.logger.logw(|| {
                format!(
                    "Reducer panicked, stopping StateProcessor {}: {}",
                    worker.id,
                    panic_message(payload.as_ref())
                )
            });
            cleared.signal();
            panic::resume_unwind(payload);
        }
    }
}

/// Dispatch a read-action after applying every reducer already queued.
///
/// A reducer sent before the read can land after the reducer branch of the
/// `select!` was polled, so the queue is checked again here.
fn dispatch_read_in_order<S: VectorState>(
    queues: &mut JobQueues<S>,
    worker: &Worker<S>,
    cleared: &ClearSignal,
    action: ReadJob<S>,
    tasks: &mut JoinSet<()>,
) -> bool {
    while let Ok(reducer) = queues.reducers.try_recv() {
        if !drive_reducer(worker, cleared, reducer) {
            return false;
        }
    }
    if let Err(error) = worker.dispatch_read(action, tasks) {
        worker
            .logger
            .logw(|| format!("Stopping StateProcessor {}: {}", worker.id, error));
        cleared.signal();
        return false;
    }
    true
}

//! Throughput measurement for the state store.
//!
//! Runs the same workload (increment reducers from several producers plus a
//! batch of read-actions) either through a [`StateStore`] or through a state
//! value guarded by a mutex, so the two designs can be compared.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::config::StoreConfig;
use crate::mvi::VectorState;
use crate::state::{ProcessorStats, StartMode, StateStore};

/// Which synchronization design to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single driver loop (the real store).
    Store,
    /// Mutex around the state, for comparison.
    Locked,
}

#[derive(Debug, Clone)]
pub struct BenchParams {
    pub jobs: u64,
    pub producers: u64,
    pub reads: u64,
}

impl BenchParams {
    pub fn validate(&self) -> Result<()> {
        if self.producers == 0 {
            bail!("--producers must be at least 1");
        }
        Ok(())
    }

    /// Reducers producer `index` enqueues; remainders go to the first producers.
    fn share(&self, index: u64) -> u64 {
        let base = self.jobs / self.producers;
        let extra = u64::from(index < self.jobs % self.producers);
        base + extra
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchState {
    pub count: u64,
}

impl VectorState for BenchState {}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub strategy: Strategy,
    pub jobs: u64,
    pub producers: u64,
    pub reads: u64,
    pub final_count: u64,
    /// Whether every reducer was applied exactly once.
    pub consistent: bool,
    pub elapsed_ms: f64,
    pub jobs_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProcessorStats>,
}

impl BenchReport {
    fn new(
        strategy: Strategy,
        params: &BenchParams,
        final_count: u64,
        elapsed: Duration,
        stats: Option<ProcessorStats>,
    ) -> Self {
        let secs = elapsed.as_secs_f64();
        let total = (params.jobs + params.reads) as f64;
        Self {
            strategy,
            jobs: params.jobs,
            producers: params.producers,
            reads: params.reads,
            final_count,
            consistent: final_count == params.jobs,
            elapsed_ms: secs * 1000.0,
            jobs_per_sec: if secs > 0.0 { total / secs } else { 0.0 },
            stats,
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "strategy:    {:?}", self.strategy)?;
        writeln!(
            f,
            "workload:    {} reducers from {} producers, {} read-actions",
            self.jobs, self.producers, self.reads
        )?;
        writeln!(
            f,
            "final count: {} ({})",
            self.final_count,
            if self.consistent { "consistent" } else { "INCONSISTENT" }
        )?;
        writeln!(f, "elapsed:     {:.3} ms", self.elapsed_ms)?;
        write!(f, "throughput:  {:.0} jobs/s", self.jobs_per_sec)
    }
}

pub async fn run(strategy: Strategy, params: &BenchParams, config: &StoreConfig) -> Result<BenchReport> {
    params.validate()?;
    match strategy {
        Strategy::Store => run_store(params, config).await,
        Strategy::Locked => run_locked(params).await,
    }
}

async fn run_store(params: &BenchParams, config: &StoreConfig) -> Result<BenchReport> {
    let store = StateStore::builder(BenchState::default())
        .config(config)
        .start_mode(StartMode::Eager)
        .build()
        .context("failed to build state store")?;
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();

    let started = Instant::now();
    let mut producers = Vec::with_capacity(params.producers as usize + 1);
    for index in 0..params.producers {
        let store = store.clone();
        let share = params.share(index);
        producers.push(tokio::spawn(async move {
            for _ in 0..share {
                store.set_state(|s| BenchState { count: s.count + 1 });
            }
        }));
    }
    {
        let store = store.clone();
        let reads = params.reads;
        producers.push(tokio::spawn(async move {
            for _ in 0..reads {
                let done = done_tx.clone();
                store.with_state(move |_state| async move {
                    let _ = done.send(());
                });
            }
        }));
    }
    for producer in producers {
        producer.await.context("producer task failed")?;
    }

    let (final_tx, final_rx) = oneshot::channel();
    store.with_state(move |state| async move {
        let _ = final_tx.send(state);
    });
    let final_state = final_rx
        .await
        .context("state store stopped before the final read")?;
    for _ in 0..params.reads {
        if done_rx.recv().await.is_none() {
            break;
        }
    }
    let elapsed = started.elapsed();

    let stats = store.stats();
    store.clear();
    Ok(BenchReport::new(
        Strategy::Store,
        params,
        final_state.count,
        elapsed,
        Some(stats),
    ))
}

async fn run_locked(params: &BenchParams) -> Result<BenchReport> {
    let state = Arc::new(Mutex::new(BenchState::default()));

    let started = Instant::now();
    let mut producers = Vec::with_capacity(params.producers as usize + 1);
    for index in 0..params.producers {
        let state = Arc::clone(&state);
        let share = params.share(index);
        producers.push(tokio::spawn(async move {
            for _ in 0..share {
                let mut guard = state.lock();
                guard.count += 1;
            }
        }));
    }
    {
        let state = Arc::clone(&state);
        let reads = params.reads;
        producers.push(tokio::spawn(async move {
            let mut readers = Vec::with_capacity(reads as usize);
            for _ in 0..reads {
                let snapshot = state.lock().clone();
                readers.push(tokio::spawn(async move {
                    std::hint::black_box(snapshot);
                }));
            }
            for reader in readers {
                let _ = reader.await;
            }
        }));
    }
    for producer in producers {
        producer.await.context("producer task failed")?;
    }
    let final_count = state.lock().count;
    let elapsed = started.elapsed();

    Ok(BenchReport::new(Strategy::Locked, params, final_count, elapsed, None))
}

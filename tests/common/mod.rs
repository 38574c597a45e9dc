//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::oneshot;
use vector_state::logger::{MemoryLogger, SharedLogger};
use vector_state::mvi::{Intent, Reducer, VectorState};
use vector_state::{StartMode, StateStore};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountingState {
    pub count: i32,
}

impl VectorState for CountingState {}

#[derive(Debug)]
pub enum CountingIntent {
    Add(i32),
    Reset,
}

impl Intent for CountingIntent {}

pub struct CountingReducer;

impl Reducer for CountingReducer {
    type State = CountingState;
    type Intent = CountingIntent;

    fn reduce(state: CountingState, intent: CountingIntent) -> CountingState {
        match intent {
            CountingIntent::Add(n) => CountingState {
                count: state.count + n,
            },
            CountingIntent::Reset => CountingState::default(),
        }
    }
}

/// Store wired to an in-memory logger so tests can assert on log lines.
pub fn store_with_logger(mode: StartMode) -> (StateStore<CountingState>, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new("Vector"));
    let shared: SharedLogger = logger.clone();
    let store = StateStore::builder(CountingState::default())
        .logger(shared)
        .start_mode(mode)
        .build()
        .expect("store needs a tokio runtime");
    (store, logger)
}

/// Enqueue a read-action and wait for the snapshot it receives.
pub async fn ordered_read(store: &StateStore<CountingState>) -> CountingState {
    let (tx, rx) = oneshot::channel();
    store.with_state(move |state| async move {
        let _ = tx.send(state);
    });
    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("read-action timed out")
        .expect("read-action dropped")
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Write `content` to a temporary `store.toml`.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("store.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Config that silences store logging, for tests that run the binary.
pub fn quiet_config() -> (TempDir, PathBuf) {
    temp_config(
        r#"start_mode = "eager"

[logging]
enabled = false
"#,
    )
}

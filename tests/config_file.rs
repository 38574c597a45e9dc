mod common;

use common::{temp_config, CountingState};
use vector_state::config::{ConfigError, StoreConfig};
use vector_state::logger::LogLevel;
use vector_state::{StartMode, StateStore};

#[test]
fn config_path_ends_with_expected() {
    assert!(StoreConfig::config_path().ends_with("vector/store.toml"));
}

#[test]
fn load_from_reads_every_field() {
    let (_dir, path) = temp_config(
        r#"start_mode = "lazy"

[logging]
enabled = true
level = "warn"
tag = "Checkout"
"#,
    );
    let config = StoreConfig::load_from(&path).unwrap();

    assert_eq!(config.start_mode, StartMode::Lazy);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.tag, "Checkout");
}

#[test]
fn missing_sections_use_defaults() {
    let (_dir, path) = temp_config("");
    assert_eq!(StoreConfig::load_from(&path).unwrap(), StoreConfig::default());
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = StoreConfig::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let (_dir, path) = temp_config("start_mode = \"sometimes\"\n");
    let err = StoreConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("store.toml"));
}

#[test]
fn empty_tag_fails_validation() {
    let (_dir, path) = temp_config("[logging]\ntag = \"\"\n");
    assert!(matches!(
        StoreConfig::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[tokio::test]
async fn builder_honours_lazy_start_mode() {
    let (_dir, path) = temp_config("start_mode = \"lazy\"\n\n[logging]\nenabled = false\n");
    let config = StoreConfig::load_from(&path).unwrap();
    let store = StateStore::builder(CountingState::default())
        .config(&config)
        .build()
        .unwrap();

    assert!(!store.processor().is_running());
    store.set_state(|s| CountingState { count: s.count + 2 });
    store.drain().await.unwrap();
    assert_eq!(store.current_state().unwrap().count, 2);
}

// crates/po-sync-cli/tests/config_loading.rs
// ============================================================================
// Module: CLI Configuration Tests
// Description: TOML loading, defaults, and validation behavior.
// Purpose: Pin the config surface commands depend on.
// ============================================================================

//! Configuration tests over real TOML files in a temp directory.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;

use po_sync_cli::AppConfig;
use po_sync_cli::ConfigError;
use tempfile::TempDir;

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = AppConfig::load(&PathBuf::from("/definitely/not/there.toml")).unwrap();
    assert_eq!(config.store.path, PathBuf::from("po-sync.db"));
    assert_eq!(config.catalog.name, "messages");
    assert_eq!(config.catalog.locales_root, PathBuf::from("locales"));
    assert!(config.translator.is_none());
    assert_eq!(config.pipeline.batch_size, 500);
    assert_eq!(config.pipeline.max_in_flight, 20);
}

#[test]
fn full_file_overrides_every_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("po-sync.toml");
    fs::write(
        &path,
        r#"
[store]
path = "state/catalogue.db"
busy_timeout_ms = 250

[catalog]
locales_root = "i18n"
name = "app"
project = "storefront"

[translator]
endpoint = "https://translator.invalid/v1/chat/completions"
model = "test-model"
timeout_ms = 1500

[pipeline]
batch_size = 100
max_in_flight = 4
"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.store.path, PathBuf::from("state/catalogue.db"));
    assert_eq!(config.store.busy_timeout_ms, 250);
    assert_eq!(config.catalog.locales_root, PathBuf::from("i18n"));
    assert_eq!(config.catalog.header_spec().project, "storefront");
    let translator = config.translator.unwrap();
    assert_eq!(translator.model, "test-model");
    assert_eq!(translator.timeout_ms, 1_500);
    // Unset translator fields keep their serde defaults.
    assert_eq!(translator.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.pipeline.batch_size, 100);
}

#[test]
fn invalid_toml_is_rejected_with_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("po-sync.toml");
    fs::write(&path, "store = 12").unwrap();
    let error = AppConfig::load(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid { .. }));
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn zero_batch_size_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("po-sync.toml");
    fs::write(&path, "[pipeline]\nbatch_size = 0\n").unwrap();
    let error = AppConfig::load(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Validation(_)));
}

#[test]
fn catalog_name_must_be_a_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("po-sync.toml");
    fs::write(&path, "[catalog]\nname = \"nested/messages\"\n").unwrap();
    let error = AppConfig::load(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Validation(_)));
}

// crates/po-sync-core/tests/sync_orchestrator.rs
// ============================================================================
// Module: Sync Orchestrator Tests
// Description: End-to-end sync behavior over fake store and translator.
// Purpose: Pin flag/merge ordering, partial failure, and outcome reporting.
// ============================================================================

//! Orchestrator tests wiring fake capabilities and a temp locales tree.

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

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use po_sync_core::InsertOutcome;
use po_sync_core::LanguageLocale;
use po_sync_core::LocaleSpec;
use po_sync_core::MessageStore;
use po_sync_core::PipelineConfig;
use po_sync_core::PoEntry;
use po_sync_core::PoHeaderSpec;
use po_sync_core::StoreError;
use po_sync_core::SyncConfig;
use po_sync_core::SyncError;
use po_sync_core::SyncOrchestrator;
use po_sync_core::SyncOutcome;
use po_sync_core::TranslateError;
use po_sync_core::Translator;
use po_sync_core::parse;
use tempfile::TempDir;
use time::OffsetDateTime;
use time::macros::datetime;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

const NOW: OffsetDateTime = datetime!(2026-03-01 10:00 UTC);

/// In-memory message store with an optional injected commit failure.
struct FakeStore {
    /// Guarded mutable store state.
    state: Mutex<FakeStoreState>,
    /// Zero-based `mark_translated` call index that fails, if any.
    fail_commit_at: Option<usize>,
}

struct FakeStoreState {
    languages: Vec<(String, String)>,
    msgids: Vec<String>,
    flagged: HashMap<String, BTreeSet<String>>,
    commits: usize,
}

impl FakeStore {
    fn new(msgids: Vec<String>) -> Self {
        Self {
            state: Mutex::new(FakeStoreState {
                languages: vec![("Spanish".to_string(), "es_ES".to_string())],
                msgids,
                flagged: HashMap::new(),
                commits: 0,
            }),
            fail_commit_at: None,
        }
    }

    fn failing_commit(msgids: Vec<String>, commit_index: usize) -> Self {
        Self {
            fail_commit_at: Some(commit_index),
            ..Self::new(msgids)
        }
    }

    fn flagged(&self, code: &str) -> BTreeSet<String> {
        self.state.lock().unwrap().flagged.get(code).cloned().unwrap_or_default()
    }
}

impl MessageStore for FakeStore {
    fn get_language_code(&self, language_name: &str) -> Result<Option<String>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .languages
            .iter()
            .find(|(name, _)| name == language_name)
            .map(|(_, code)| code.clone()))
    }

    fn list_untranslated(&self, language_code: &str) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().unwrap();
        if !state.languages.iter().any(|(_, code)| code == language_code) {
            return Err(StoreError::NotFound(language_code.to_string()));
        }
        let flagged = state.flagged.get(language_code).cloned().unwrap_or_default();
        Ok(state.msgids.iter().filter(|msgid| !flagged.contains(*msgid)).cloned().collect())
    }

    fn mark_translated(&self, language_code: &str, msgids: &[String]) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let commit_index = state.commits;
        state.commits += 1;
        if self.fail_commit_at == Some(commit_index) {
            return Err(StoreError::Db("injected commit failure".to_string()));
        }
        let flagged = state.flagged.entry(language_code.to_string()).or_default();
        for msgid in msgids {
            flagged.insert(msgid.clone());
        }
        Ok(())
    }

    fn register_locale(&self, spec: &LocaleSpec) -> Result<LanguageLocale, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.languages.push((spec.language.clone(), spec.language_code.clone()));
        Ok(LanguageLocale {
            id: i64::try_from(state.languages.len()).unwrap_or(i64::MAX),
            language: spec.language.clone(),
            language_code: spec.language_code.clone(),
            language_name: spec.language_name.clone(),
            enabled: spec.enabled,
        })
    }

    fn list_languages(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.languages.iter().map(|(name, _)| name.clone()).collect())
    }

    fn insert_messages(&self, entries: &[PoEntry]) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        let mut outcome = InsertOutcome::default();
        for entry in entries {
            if state.msgids.contains(&entry.msgid) {
                outcome.skipped.push(entry.msgid.clone());
            } else {
                state.msgids.push(entry.msgid.clone());
                outcome.inserted += 1;
            }
        }
        Ok(outcome)
    }
}

/// Translator that suffixes keys and fails a configured key set.
struct SuffixTranslator {
    fail_keys: BTreeSet<String>,
}

impl SuffixTranslator {
    fn reliable() -> Self {
        Self {
            fail_keys: BTreeSet::new(),
        }
    }

    fn failing(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|key| (*key).to_string()).collect(),
        }
    }
}

#[async_trait]
impl Translator for SuffixTranslator {
    async fn translate(&self, text: &str, language_name: &str) -> Result<String, TranslateError> {
        if self.fail_keys.contains(text) {
            return Err(TranslateError::Provider("unavailable".to_string()));
        }
        Ok(format!("{text}|{language_name}"))
    }
}

fn orchestrator(
    store: Arc<FakeStore>,
    translator: Arc<dyn Translator>,
    root: &TempDir,
    batch_size: usize,
) -> SyncOrchestrator {
    SyncOrchestrator::new(
        store,
        translator,
        SyncConfig {
            locales_root: root.path().to_path_buf(),
            catalog_name: "messages".to_string(),
            header: PoHeaderSpec::default(),
            pipeline: PipelineConfig {
                batch_size,
                max_in_flight: 8,
            },
        },
    )
}

fn msgids(count: usize) -> Vec<String> {
    (0 .. count).map(|index| format!("msg-{index:04}")).collect()
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn fresh_sync_creates_document_and_flags_keys() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(msgids(3)));
    let sync = orchestrator(Arc::clone(&store), Arc::new(SuffixTranslator::reliable()), &root, 500);

    let report = sync.sync_language("Spanish", NOW).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::Created);
    assert_eq!(report.processed, 3);
    assert_eq!(report.translated, 3);
    assert_eq!(report.passthrough, 0);
    assert!(report.failed_batches.is_empty());

    let path = sync.catalog_path("es_ES");
    let entries = parse(&fs::read_to_string(path).unwrap()).entries;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].msgstr, "msg-0000|Spanish");
    assert_eq!(store.flagged("es_ES").len(), 3);
    assert!(store.list_untranslated("es_ES").unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_into_existing_document_preserves_existing_entries() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(msgids(2)));
    let sync = orchestrator(Arc::clone(&store), Arc::new(SuffixTranslator::reliable()), &root, 500);

    // Seed the catalogue with a hand-managed entry the store knows nothing
    // about.
    let path = sync.catalog_path("es_ES");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let seeded = po_sync_core::serialize(
        &PoHeaderSpec::default(),
        "Spanish",
        "es_ES",
        &[PoEntry {
            msgid: "Save".to_string(),
            msgstr: "Guardar".to_string(),
        }],
        NOW,
    );
    fs::write(&path, &seeded).unwrap();

    let report = sync.sync_language("Spanish", NOW).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::Updated);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("msgid \"Save\"\nmsgstr \"Guardar\"\n"));
    let entries = parse(&text).entries;
    assert_eq!(entries.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_language_fails_with_not_found() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(msgids(1)));
    let sync = orchestrator(store, Arc::new(SuffixTranslator::reliable()), &root, 500);

    let error = sync.sync_language("Klingon", NOW).await.unwrap_err();
    assert!(matches!(error, SyncError::NotFound(name) if name == "Klingon"));
}

#[tokio::test(flavor = "multi_thread")]
async fn nothing_pending_is_a_noop() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(Vec::new()));
    let sync = orchestrator(Arc::clone(&store), Arc::new(SuffixTranslator::reliable()), &root, 500);

    let report = sync.sync_language("Spanish", NOW).await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::NoOp);
    assert_eq!(report.processed, 0);
    assert!(!sync.catalog_path("es_ES").exists());
}

// ============================================================================
// SECTION: Failure Semantics
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn failed_items_are_neither_merged_nor_flagged() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(msgids(3)));
    let translator = Arc::new(SuffixTranslator::failing(&["msg-0001"]));
    let sync = orchestrator(Arc::clone(&store), translator, &root, 500);

    let report = sync.sync_language("Spanish", NOW).await.unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.translated, 2);
    assert_eq!(report.passthrough, 1);

    let entries = parse(&fs::read_to_string(sync.catalog_path("es_ES")).unwrap()).entries;
    let merged_ids: Vec<&str> = entries.iter().map(|entry| entry.msgid.as_str()).collect();
    assert_eq!(merged_ids, vec!["msg-0000", "msg-0002"]);
    // Regression: a pass-through item is not flagged and stays pending.
    assert_eq!(
        store.list_untranslated("es_ES").unwrap(),
        vec!["msg-0001".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn provider_outage_degrades_to_noop_without_flagging() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(msgids(4)));
    let translator = Arc::new(SuffixTranslator::failing(&[
        "msg-0000", "msg-0001", "msg-0002", "msg-0003",
    ]));
    let sync = orchestrator(Arc::clone(&store), translator, &root, 500);

    let report = sync.sync_language("Spanish", NOW).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::NoOp);
    assert_eq!(report.translated, 0);
    assert_eq!(report.passthrough, 4);
    assert!(!sync.catalog_path("es_ES").exists());
    assert_eq!(store.list_untranslated("es_ES").unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn commit_failure_rolls_back_its_batch_and_defers_the_rest() {
    let root = TempDir::new().unwrap();
    // 1200 keys in batches of 500: the second commit fails.
    let store = Arc::new(FakeStore::failing_commit(msgids(1200), 1));
    let sync = orchestrator(Arc::clone(&store), Arc::new(SuffixTranslator::reliable()), &root, 500);

    let report = sync.sync_language("Spanish", NOW).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::Created);
    assert_eq!(report.processed, 1000);
    assert_eq!(report.translated, 500);
    assert_eq!(report.failed_batches.len(), 1);
    assert_eq!(report.failed_batches[0].batch_index, 1);
    assert!(report.failed_batches[0].cause.contains("injected commit failure"));

    // Batch 1 is flagged and merged; batches 2 and 3 are neither.
    let text = fs::read_to_string(sync.catalog_path("es_ES")).unwrap();
    let merged: BTreeSet<String> =
        parse(&text).entries.into_iter().map(|entry| entry.msgid).collect();
    let flagged = store.flagged("es_ES");
    assert_eq!(merged.len(), 500);
    assert_eq!(flagged.len(), 500);
    assert!(merged.contains("msg-0000"));
    assert!(!merged.contains("msg-0500"));
    assert!(!merged.contains("msg-1199"));
    // Invariant: flagged keys are a subset of the document's msgids.
    assert!(flagged.is_subset(&merged));
    assert_eq!(store.list_untranslated("es_ES").unwrap().len(), 700);
}

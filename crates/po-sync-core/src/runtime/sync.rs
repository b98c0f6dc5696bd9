// crates/po-sync-core/src/runtime/sync.rs
// ============================================================================
// Module: Sync Orchestrator
// Description: Per-language synchronization of store flags and PO files.
// Purpose: Translate pending keys and keep catalogue files consistent.
// Dependencies: crate::core, crate::interfaces, crate::runtime, tokio, tracing
// ============================================================================

//! ## Overview
//! The orchestrator drives one language at a time: it asks the message store
//! for untranslated keys, runs them through the batch pipeline, merges the
//! genuinely translated pairs into the on-disk PO document, and only then
//! flags those keys in the store. Ordering matters: a key must never be
//! flagged before the PO write holding its entry succeeded. When a batch's
//! flag commit fails, the file is restored to its pre-batch content and the
//! remaining batches are not processed, so the failed batch ends up neither
//! flagged nor merged and stays selectable for the next run. File writes are
//! all-or-nothing via a temp file and atomic rename; concurrent syncs of the
//! same language from two processes are not coordinated (documented
//! limitation).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::po;
use crate::core::po::PoHeaderSpec;
use crate::core::po::PoParseError;
use crate::interfaces::MessageStore;
use crate::interfaces::StoreError;
use crate::interfaces::Translator;
use crate::runtime::pipeline::BatchPipeline;
use crate::runtime::pipeline::PipelineConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal synchronization errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Per-item translation failures and per-batch persistence failures are
///   absorbed into the [`SyncReport`]; only document-level problems land
///   here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Language name is not registered.
    #[error("unknown language: {0}")]
    NotFound(String),
    /// Existing PO document is structurally invalid.
    #[error("po document for {language} is invalid: {source}")]
    Parse {
        /// Target language code.
        language: String,
        /// Underlying codec error.
        #[source]
        source: PoParseError,
    },
    /// Catalogue file could not be read or written.
    #[error("catalogue file error for {language}: {source}")]
    Io {
        /// Target language code.
        language: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Message store failed outside a per-batch flag update.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// File-level outcome of a sync invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new PO document was created.
    Created,
    /// An existing PO document was updated.
    Updated,
    /// Nothing was written (no pending keys, or no genuine translations).
    NoOp,
}

/// One batch whose flag commit failed.
///
/// # Invariants
/// - Keys in the batch are neither flagged nor merged and stay eligible for
///   a future sync; batches after it were not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Zero-based batch index within the invocation.
    pub batch_index: usize,
    /// Rendered cause of the failure.
    pub cause: String,
}

/// Outcome report for one `sync_language` invocation.
///
/// # Invariants
/// - `translated` counts only keys that were merged into the PO document and
///   flagged in the store.
/// - `processed` covers batches that ran; batches after a flag-commit
///   failure are not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Target language code.
    pub language_code: String,
    /// File-level outcome.
    pub outcome: SyncOutcome,
    /// Number of keys processed.
    pub processed: usize,
    /// Number of keys genuinely translated and merged.
    pub translated: usize,
    /// Number of keys passed through untranslated.
    pub passthrough: usize,
    /// Batches whose flag update failed.
    pub failed_batches: Vec<BatchFailure>,
}

impl SyncReport {
    /// Builds the no-pending-work report.
    #[must_use]
    pub const fn noop(language_code: String) -> Self {
        Self {
            language_code,
            outcome: SyncOutcome::NoOp,
            processed: 0,
            translated: 0,
            passthrough: 0,
            failed_batches: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the sync orchestrator.
///
/// # Invariants
/// - PO documents live at `<locales_root>/<code>/LC_MESSAGES/<catalog>.po`.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root directory holding per-locale catalogue trees.
    pub locales_root: PathBuf,
    /// Catalogue file stem, e.g. `messages` for `messages.po`.
    pub catalog_name: String,
    /// Header identity for newly created documents.
    pub header: PoHeaderSpec,
    /// Batch and concurrency limits for the pipeline.
    pub pipeline: PipelineConfig,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Per-language synchronization driver over store and translator
/// capabilities.
pub struct SyncOrchestrator {
    /// Message store capability.
    store: Arc<dyn MessageStore>,
    /// Translation pipeline over the translator capability.
    pipeline: BatchPipeline,
    /// Orchestrator configuration.
    config: SyncConfig,
}

impl SyncOrchestrator {
    /// Creates an orchestrator over the given capabilities.
    #[must_use]
    pub fn new(
        store: Arc<dyn MessageStore>,
        translator: Arc<dyn Translator>,
        config: SyncConfig,
    ) -> Self {
        let pipeline = BatchPipeline::new(translator, config.pipeline);
        Self {
            store,
            pipeline,
            config,
        }
    }

    /// Returns the PO document path for a locale code.
    #[must_use]
    pub fn catalog_path(&self, language_code: &str) -> PathBuf {
        self.config
            .locales_root
            .join(language_code)
            .join("LC_MESSAGES")
            .join(format!("{}.po", self.config.catalog_name))
    }

    /// Synchronizes one language: translates pending keys, merges them into
    /// the PO document, and flags them in the store.
    ///
    /// Batches are processed strictly sequentially. For each batch the PO
    /// write happens before the flag commit; when the commit fails, the file
    /// is restored to its pre-batch content, the failure is recorded in the
    /// report, and the remaining batches are left for a future run. Items
    /// the provider failed to translate pass through unflagged and unmerged,
    /// staying eligible for a future run.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] for an unknown language name,
    /// [`SyncError::Parse`] when the existing document lacks its header
    /// sentinel, [`SyncError::Io`] when the document cannot be read or
    /// written, and [`SyncError::Store`] when listing or resolving fails.
    pub async fn sync_language(
        &self,
        language_name: &str,
        now: OffsetDateTime,
    ) -> Result<SyncReport, SyncError> {
        let language_code = self
            .store
            .get_language_code(language_name)?
            .ok_or_else(|| SyncError::NotFound(language_name.to_string()))?;
        let pending = self.store.list_untranslated(&language_code)?;
        if pending.is_empty() {
            tracing::info!(language = %language_code, "no untranslated keys; nothing to sync");
            return Ok(SyncReport::noop(language_code));
        }
        tracing::info!(
            language = %language_code,
            pending = pending.len(),
            "starting catalogue sync"
        );

        let path = self.catalog_path(&language_code);
        let existed = path.exists();
        let mut document = if existed {
            fs::read_to_string(&path).map_err(|source| SyncError::Io {
                language: language_code.clone(),
                source,
            })?
        } else {
            po::serialize(&self.config.header, language_name, &language_code, &[], now)
        };

        let mut report = SyncReport {
            language_code: language_code.clone(),
            outcome: SyncOutcome::NoOp,
            processed: 0,
            translated: 0,
            passthrough: 0,
            failed_batches: Vec::new(),
        };
        let mut wrote_any = false;

        for (batch_index, batch) in pending.chunks(self.pipeline.batch_size()).enumerate() {
            let outcome = self.pipeline.translate_batch(batch, language_name).await;
            report.processed += batch.len();
            report.passthrough += outcome.failed.len();
            let translated = translated_pairs(batch, &outcome.translations, &outcome.failed);
            if translated.is_empty() {
                tracing::warn!(
                    language = %language_code,
                    batch = batch_index,
                    "batch produced no genuine translations; skipping merge"
                );
                continue;
            }

            let merged =
                po::merge(&document, &translated, now).map_err(|source| SyncError::Parse {
                    language: language_code.clone(),
                    source,
                })?;
            write_atomic(&path, &merged).map_err(|source| SyncError::Io {
                language: language_code.clone(),
                source,
            })?;

            let flagged: Vec<String> = translated.iter().map(|(msgid, _)| msgid.clone()).collect();
            if let Err(error) = self.store.mark_translated(&language_code, &flagged) {
                // An unflagged batch must not stay merged; restore the
                // pre-batch document and defer the rest to a future run.
                write_atomic(&path, &document).map_err(|source| SyncError::Io {
                    language: language_code.clone(),
                    source,
                })?;
                tracing::error!(
                    language = %language_code,
                    batch = batch_index,
                    %error,
                    "flag commit failed; batch rolled back, remaining batches deferred"
                );
                report.failed_batches.push(BatchFailure {
                    batch_index,
                    cause: error.to_string(),
                });
                break;
            }
            document = merged;
            wrote_any = true;
            report.translated += translated.len();
        }

        if wrote_any {
            report.outcome = if existed { SyncOutcome::Updated } else { SyncOutcome::Created };
        }
        tracing::info!(
            language = %language_code,
            processed = report.processed,
            translated = report.translated,
            passthrough = report.passthrough,
            failed_batches = report.failed_batches.len(),
            "catalogue sync finished"
        );
        Ok(report)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Pairs each genuinely translated key with its translation, preserving
/// batch order.
fn translated_pairs(
    batch: &[String],
    translations: &[String],
    failed: &BTreeSet<usize>,
) -> Vec<(String, String)> {
    batch
        .iter()
        .zip(translations.iter())
        .enumerate()
        .filter(|(index, _)| !failed.contains(index))
        .map(|(_, (msgid, msgstr))| (msgid.clone(), msgstr.clone()))
        .collect()
}

/// Writes a file all-or-nothing: temp file in the target directory, then
/// atomic rename. Parent directories are created as needed.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "catalogue path has no parent")
    })?;
    fs::create_dir_all(parent)?;
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "catalogue path has no file name")
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = parent.join(tmp_name);
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

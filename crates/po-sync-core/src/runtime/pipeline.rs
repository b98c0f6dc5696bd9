// crates/po-sync-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Translation Batch Pipeline
// Description: Bounded-concurrency fan-out over the Translator capability.
// Purpose: Translate large key lists with per-item failure isolation.
// Dependencies: crate::interfaces, tokio, tracing
// ============================================================================

//! ## Overview
//! The pipeline splits key lists into fixed-size batches and, within a batch,
//! issues one translation request per item under a counting semaphore. Result
//! slots are assigned by original index, so completion order never affects
//! output order. A failed item degrades to pass-through (the original key)
//! and is reported in the batch outcome so callers flag only genuinely
//! translated items. Batches run strictly sequentially relative to each
//! other, bounding memory to one batch's in-flight requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::interfaces::TranslateError;
use crate::interfaces::Translator;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default number of keys per batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;
/// Default maximum simultaneous in-flight translation requests per batch.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 20;

/// Configuration for the batch pipeline.
///
/// # Invariants
/// - `batch_size` and `max_in_flight` are clamped to at least 1 at use.
/// - The gate bounds provider load and socket budget only; it never affects
///   output order or correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    /// Number of keys per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum simultaneous in-flight requests within a batch.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Returns the default batch size.
const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Returns the default in-flight request cap.
const fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of translating one batch.
///
/// # Invariants
/// - `translations.len()` equals the batch input length.
/// - For every index in `failed`, `translations[index]` is the original key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Translations slotted by original index; pass-through on failure.
    pub translations: Vec<String>,
    /// Indices whose translation failed.
    pub failed: BTreeSet<usize>,
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Bounded-concurrency translation pipeline over a [`Translator`] capability.
pub struct BatchPipeline {
    /// Translator capability, shared across in-flight tasks.
    translator: Arc<dyn Translator>,
    /// Batch and concurrency limits.
    config: PipelineConfig,
}

impl BatchPipeline {
    /// Creates a pipeline over the given translator.
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>, config: PipelineConfig) -> Self {
        Self {
            translator,
            config,
        }
    }

    /// Returns the configured batch size, clamped to at least 1.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        if self.config.batch_size == 0 { 1 } else { self.config.batch_size }
    }

    /// Translates one batch with per-item failure isolation.
    ///
    /// Every item produces exactly one output slot at its original index;
    /// failed items pass the original key through and are listed in
    /// [`BatchOutcome::failed`]. An empty batch returns an empty outcome.
    pub async fn translate_batch(&self, keys: &[String], language_name: &str) -> BatchOutcome {
        let gate = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut tasks: JoinSet<(usize, Result<String, TranslateError>)> = JoinSet::new();
        for (index, key) in keys.iter().enumerate() {
            let translator = Arc::clone(&self.translator);
            let gate = Arc::clone(&gate);
            let key = key.clone();
            let language = language_name.to_string();
            tasks.spawn(async move {
                let Ok(permit) = gate.acquire_owned().await else {
                    return (
                        index,
                        Err(TranslateError::Provider("concurrency gate closed".to_string())),
                    );
                };
                let result = translator.translate(&key, &language).await;
                drop(permit);
                (index, result)
            });
        }

        let mut slots: Vec<Option<String>> = vec![None; keys.len()];
        let mut failed = BTreeSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(translation))) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(translation);
                    }
                }
                Ok((index, Err(error))) => {
                    tracing::warn!(index, %error, "translation failed; passing key through");
                    failed.insert(index);
                }
                Err(join_error) => {
                    // The slot stays empty and is reconciled below.
                    tracing::error!(%join_error, "translation task aborted");
                }
            }
        }

        let translations = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    failed.insert(index);
                    keys.get(index).cloned().unwrap_or_default()
                })
            })
            .collect();
        BatchOutcome {
            translations,
            failed,
        }
    }

    /// Translates all keys, batch by batch, preserving input order.
    ///
    /// The output length always equals the input length; failed items carry
    /// the original key. Batches are processed strictly sequentially.
    pub async fn translate_all(&self, keys: &[String], language_name: &str) -> Vec<String> {
        let batch_size = self.batch_size();
        let batch_count = keys.len().div_ceil(batch_size);
        let mut translations = Vec::with_capacity(keys.len());
        for (batch_index, batch) in keys.chunks(batch_size).enumerate() {
            tracing::info!(
                batch = batch_index + 1,
                batches = batch_count,
                size = batch.len(),
                "processing translation batch"
            );
            let outcome = self.translate_batch(batch, language_name).await;
            translations.extend(outcome.translations);
        }
        translations
    }
}

// crates/po-sync-core/src/interfaces/mod.rs
// ============================================================================
// Module: po-sync Interfaces
// Description: Backend-agnostic interfaces for translation and persistence.
// Purpose: Define the contract surfaces used by the po-sync runtime.
// Dependencies: crate::core, async-trait, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how po-sync integrates with external systems without
//! embedding backend-specific details. Capability objects are constructed
//! once per process and passed into the runtime, so tests substitute fakes
//! freely. The translator may fail per call and per item; the message store
//! must keep batch flag updates all-or-nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::core::catalog::InsertOutcome;
use crate::core::catalog::LanguageLocale;
use crate::core::catalog::LocaleSpec;
use crate::core::catalog::PoEntry;

// ============================================================================
// SECTION: Translator
// ============================================================================

/// Translator errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is recoverable at the item level; the pipeline degrades
///   to pass-through rather than aborting a batch.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Translation provider reported an error.
    #[error("translation provider error: {0}")]
    Provider(String),
    /// Translation request exceeded the provider timeout.
    #[error("translation request timed out")]
    Timeout,
}

/// Backend-agnostic translation capability.
///
/// Implementations receive the source text and the human-readable target
/// language name, and must return only the translated text with punctuation
/// and formatting preserved, with no added quoting. The per-request timeout
/// lives inside the implementation; a timeout is an ordinary failure.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates one string into the named target language.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError`] when the provider fails or times out.
    async fn translate(&self, text: &str, language_name: &str) -> Result<String, TranslateError>;
}

// ============================================================================
// SECTION: Message Store
// ============================================================================

/// Message store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `NotFound` marks an unregistered language code, never a missing msgid.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("message store io error: {0}")]
    Io(String),
    /// Underlying database error.
    #[error("message store database error: {0}")]
    Db(String),
    /// Language code is not registered.
    #[error("unknown language code: {0}")]
    NotFound(String),
    /// Record conflicts with existing state.
    #[error("message store conflict: {0}")]
    Conflict(String),
    /// Input is invalid.
    #[error("message store invalid data: {0}")]
    Invalid(String),
}

/// Message catalogue persistence capability.
///
/// Per-language translation flags live behind this interface, keyed by
/// registered locale codes; lookups against unregistered codes fail with
/// [`StoreError::NotFound`] rather than surfacing a backend error.
pub trait MessageStore: Send + Sync {
    /// Resolves a human-readable language name to its locale code.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails; an unknown name is
    /// `Ok(None)`, not an error.
    fn get_language_code(&self, language_name: &str) -> Result<Option<String>, StoreError>;

    /// Lists msgids not yet translated for a language, ordered by insertion
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unregistered code, or another
    /// variant when the query fails.
    fn list_untranslated(&self, language_code: &str) -> Result<Vec<String>, StoreError>;

    /// Flags msgids as translated for a language in one transaction.
    ///
    /// All-or-nothing per call: when this returns an error, no key in
    /// `msgids` was flagged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the transaction fails or the code is
    /// unregistered.
    fn mark_translated(&self, language_code: &str, msgids: &[String]) -> Result<(), StoreError>;

    /// Registers a new language locale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the code is already registered,
    /// or another variant when the insert fails.
    fn register_locale(&self, spec: &LocaleSpec) -> Result<LanguageLocale, StoreError>;

    /// Lists distinct registered language names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_languages(&self) -> Result<Vec<String>, StoreError>;

    /// Bulk-inserts message entries, first occurrence wins.
    ///
    /// Entries whose msgid already exists in the store (or earlier in the
    /// same batch) are skipped, not overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the transaction fails.
    fn insert_messages(&self, entries: &[PoEntry]) -> Result<InsertOutcome, StoreError>;
}

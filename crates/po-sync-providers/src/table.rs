// crates/po-sync-providers/src/table.rs
// ============================================================================
// Module: Table Translator
// Description: Deterministic in-memory Translator for tests and offline runs.
// Purpose: Substitute the network provider with a fixed lookup table.
// Dependencies: po-sync-core
// ============================================================================

//! ## Overview
//! The table translator resolves `(language name, source text)` pairs against
//! a fixed in-memory map. Lookup misses either fail (the default, making
//! unexpected keys visible in tests) or echo the source text back, the
//! identity translation used for locales whose catalogue mirrors the source
//! language.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use po_sync_core::TranslateError;
use po_sync_core::Translator;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Behavior on a lookup miss.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Fail the call with a provider error.
    #[default]
    Error,
    /// Return the source text unchanged (identity translation).
    Echo,
}

// ============================================================================
// SECTION: Translator Implementation
// ============================================================================

/// Deterministic translator over a fixed `(language, text)` table.
///
/// # Invariants
/// - Lookups are exact; no normalization is applied to keys.
#[derive(Debug, Clone, Default)]
pub struct TableTranslator {
    /// Translations keyed by language name, then source text.
    entries: BTreeMap<String, BTreeMap<String, String>>,
    /// Behavior on a lookup miss.
    missing: MissingKeyPolicy,
}

impl TableTranslator {
    /// Creates an empty table with the given miss policy.
    #[must_use]
    pub const fn new(missing: MissingKeyPolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            missing,
        }
    }

    /// Adds one translation to the table.
    #[must_use]
    pub fn with_entry(mut self, language_name: &str, text: &str, translation: &str) -> Self {
        self.entries
            .entry(language_name.to_string())
            .or_default()
            .insert(text.to_string(), translation.to_string());
        self
    }
}

#[async_trait]
impl Translator for TableTranslator {
    async fn translate(&self, text: &str, language_name: &str) -> Result<String, TranslateError> {
        let hit = self
            .entries
            .get(language_name)
            .and_then(|by_text| by_text.get(text));
        match (hit, self.missing) {
            (Some(translation), _) => Ok(translation.clone()),
            (None, MissingKeyPolicy::Echo) => Ok(text.to_string()),
            (None, MissingKeyPolicy::Error) => Err(TranslateError::Provider(format!(
                "no table entry for language {language_name}"
            ))),
        }
    }
}

// crates/po-sync-core/src/core/catalog.rs
// ============================================================================
// Module: Catalogue Data Model
// Description: Message, PO, and locale record types shared across crates.
// Purpose: Define the stable shapes the store, codec, and runtime exchange.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These types mirror the relational catalogue: message strings keyed by
//! `msgid`, per-language locale registrations, and the in-memory form of a
//! parsed PO document. Per-language translation flags are store-side state
//! and never appear on these records directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a message key in characters.
///
/// Keys longer than this are truncated by the parser before they reach the
/// store, matching the catalogue column width.
pub const MAX_MSGID_CHARS: usize = 512;

// ============================================================================
// SECTION: PO Records
// ============================================================================

/// One `msgid`/`msgstr` pair inside a PO document.
///
/// # Invariants
/// - `msgid` is at most [`MAX_MSGID_CHARS`] characters.
/// - Uniqueness within a document is assumed but not enforced; later
///   duplicates are retained as separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoEntry {
    /// Source string (the catalogue key).
    pub msgid: String,
    /// Translated string.
    pub msgstr: String,
}

/// A parsed PO document: header text plus ordered entries.
///
/// # Invariants
/// - `entries` preserves file order.
/// - The header entry (empty `msgid`) is excluded from `entries`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoDocument {
    /// Raw header block, byte-for-byte as read.
    pub header: String,
    /// Ordered body entries.
    pub entries: Vec<PoEntry>,
}

// ============================================================================
// SECTION: Locale Records
// ============================================================================

/// Input for registering a new language locale.
///
/// # Invariants
/// - `language_code` must be unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleSpec {
    /// Human-readable language name used to select a sync target.
    pub language: String,
    /// Machine locale code, e.g. `es_ES`.
    pub language_code: String,
    /// Display name for the language, e.g. `Spanish`.
    pub language_name: String,
    /// Whether the locale participates in synchronization.
    pub enabled: bool,
}

/// A registered language locale.
///
/// # Invariants
/// - `id` is assigned by the store and stable for the locale's lifetime.
/// - A locale code is known to flag lookups iff a record exists here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageLocale {
    /// Store-assigned identifier.
    pub id: i64,
    /// Human-readable language name.
    pub language: String,
    /// Machine locale code, e.g. `es_ES`.
    pub language_code: String,
    /// Display name for the language.
    pub language_name: String,
    /// Whether the locale participates in synchronization.
    pub enabled: bool,
}

// ============================================================================
// SECTION: Ingestion Outcomes
// ============================================================================

/// Result of a bulk message insertion.
///
/// # Invariants
/// - `inserted + skipped.len()` equals the number of candidate pairs offered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsertOutcome {
    /// Number of new message records created.
    pub inserted: usize,
    /// Keys skipped because they already existed in the store or earlier in
    /// the same batch.
    pub skipped: Vec<String>,
}

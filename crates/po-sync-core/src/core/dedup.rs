// crates/po-sync-core/src/core/dedup.rs
// ============================================================================
// Module: Dedup Loader
// Description: First-occurrence-wins partitioning for bulk-loaded entries.
// Purpose: Keep bulk ingestion deterministic with a reproducible audit trail.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Bulk-loaded catalogue sources routinely repeat keys. The loader partitions
//! an ordered entry sequence into first occurrences and duplicates without
//! reordering anything: the unique output preserves first-seen order, and
//! every duplicate is recorded with both positions so the decision can be
//! audited and reproduced from the same input. Duplicate records are report
//! material only; they are never persisted to the message store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::core::catalog::PoEntry;

// ============================================================================
// SECTION: Records
// ============================================================================

/// One skipped duplicate, with 1-indexed input positions.
///
/// # Invariants
/// - `original_position < duplicate_position`.
/// - `msgstr` is the duplicate occurrence's value, not the retained one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    /// Position of the retained first occurrence.
    pub original_position: usize,
    /// Position of this skipped occurrence.
    pub duplicate_position: usize,
    /// Repeated key.
    pub msgid: String,
    /// Value carried by the skipped occurrence.
    pub msgstr: String,
}

/// Result of a dedup pass.
///
/// # Invariants
/// - `unique` preserves first-seen input order.
/// - `duplicate_count == duplicates.len()`.
/// - `unique.len() + duplicate_count` equals the input length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DedupOutcome {
    /// First occurrence of every key, in input order.
    pub unique: Vec<PoEntry>,
    /// Skipped occurrences with their audit positions.
    pub duplicates: Vec<DuplicateRecord>,
    /// Number of skipped occurrences.
    pub duplicate_count: usize,
}

// ============================================================================
// SECTION: Dedup
// ============================================================================

/// Partitions entries into first occurrences and duplicates.
///
/// Positions are 1-indexed over the input sequence. For every repeated key
/// the first occurrence wins and later ones become [`DuplicateRecord`]s, so
/// the outcome is deterministic and reproducible for auditing.
#[must_use]
pub fn dedup_entries(entries: Vec<PoEntry>) -> DedupOutcome {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let position = index + 1;
        if let Some(original_position) = seen.get(&entry.msgid) {
            duplicates.push(DuplicateRecord {
                original_position: *original_position,
                duplicate_position: position,
                msgid: entry.msgid,
                msgstr: entry.msgstr,
            });
        } else {
            seen.insert(entry.msgid.clone(), position);
            unique.push(entry);
        }
    }
    let duplicate_count = duplicates.len();
    DedupOutcome {
        unique,
        duplicates,
        duplicate_count,
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Renders the duplicates report: one block per skipped occurrence.
///
/// The report is the externally visible audit trail for the dedup decision
/// and depends only on the outcome and the supplied stamp.
#[must_use]
pub fn render_duplicates_report(outcome: &DedupOutcome, stamp: &str) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "DUPLICATE ENTRIES REPORT");
    let _ = writeln!(report, "Generated at: {stamp}");
    let _ = writeln!(report, "Total duplicates found: {}", outcome.duplicate_count);
    let _ = writeln!(report);
    for duplicate in &outcome.duplicates {
        let _ = writeln!(report, "DUPLICATE ENTRY #{}", duplicate.duplicate_position);
        let _ = writeln!(report, "Original at position: {}", duplicate.original_position);
        let _ = writeln!(report, "msgid: {}", duplicate.msgid);
        let _ = writeln!(report, "msgstr: {}", duplicate.msgstr);
        let _ = writeln!(report, "{}", "-".repeat(50));
        let _ = writeln!(report);
    }
    report
}

/// Renders the processing summary emitted next to the duplicates report.
#[must_use]
pub fn render_summary_report(
    total_records: usize,
    unique_count: usize,
    duplicate_count: usize,
    stamp: &str,
) -> String {
    let rule = "=".repeat(50);
    let mut report = String::new();
    let _ = writeln!(report, "PO FILE PROCESSING SUMMARY");
    let _ = writeln!(report, "{rule}");
    let _ = writeln!(report, "Processing completed at: {stamp}");
    let _ = writeln!(report);
    let _ = writeln!(report, "Total records in PO file: {total_records}");
    let _ = writeln!(report, "Duplicate records found: {duplicate_count}");
    let _ = writeln!(report, "Unique records processed: {unique_count}");
    let _ = writeln!(report, "Records uploaded to database: {unique_count}");
    let _ = writeln!(report);
    let _ = writeln!(report, "{rule}");
    let _ = writeln!(
        report,
        "NOTE: Only the first occurrence of each msgid was inserted into the database."
    );
    let _ = writeln!(report, "Duplicates were skipped but preserved in a separate report file.");
    report
}

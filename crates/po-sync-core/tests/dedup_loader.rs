// crates/po-sync-core/tests/dedup_loader.rs
// ============================================================================
// Module: Dedup Loader Tests
// Description: First-occurrence-wins partitioning and audit report rendering.
// Purpose: Pin deterministic dedup order and the reproducible report format.
// ============================================================================

//! Dedup loader tests for ordering, positions, and report output.

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

use po_sync_core::DuplicateRecord;
use po_sync_core::PoEntry;
use po_sync_core::dedup_entries;
use po_sync_core::render_duplicates_report;
use po_sync_core::render_summary_report;
use proptest::collection::vec as prop_vec;
use proptest::prelude::proptest;
use proptest::prop_assert_eq;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn entry(msgid: &str, msgstr: &str) -> PoEntry {
    PoEntry {
        msgid: msgid.to_string(),
        msgstr: msgstr.to_string(),
    }
}

// ============================================================================
// SECTION: Partitioning
// ============================================================================

#[test]
fn first_occurrence_wins_with_audit_positions() {
    let outcome = dedup_entries(vec![entry("A", "1"), entry("B", "2"), entry("A", "3")]);

    assert_eq!(outcome.unique, vec![entry("A", "1"), entry("B", "2")]);
    assert_eq!(outcome.duplicate_count, 1);
    assert_eq!(
        outcome.duplicates,
        vec![DuplicateRecord {
            original_position: 1,
            duplicate_position: 3,
            msgid: "A".to_string(),
            msgstr: "3".to_string(),
        }]
    );
}

#[test]
fn input_without_duplicates_passes_through_unchanged() {
    let input = vec![entry("A", "1"), entry("B", "2"), entry("C", "3")];
    let outcome = dedup_entries(input.clone());
    assert_eq!(outcome.unique, input);
    assert!(outcome.duplicates.is_empty());
    assert_eq!(outcome.duplicate_count, 0);
}

#[test]
fn all_duplicates_of_one_key_collapse_to_one_entry() {
    let outcome = dedup_entries(vec![entry("A", "1"), entry("A", "2"), entry("A", "3")]);
    assert_eq!(outcome.unique, vec![entry("A", "1")]);
    assert_eq!(outcome.duplicate_count, 2);
    assert_eq!(
        outcome.duplicates.iter().map(|d| d.duplicate_position).collect::<Vec<_>>(),
        vec![2, 3]
    );
    assert!(outcome.duplicates.iter().all(|d| d.original_position == 1));
}

#[test]
fn empty_input_yields_empty_outcome() {
    let outcome = dedup_entries(Vec::new());
    assert!(outcome.unique.is_empty());
    assert!(outcome.duplicates.is_empty());
    assert_eq!(outcome.duplicate_count, 0);
}

proptest! {
    #[test]
    fn unique_order_equals_first_seen_order(
        keys in prop_vec("[a-e]", 0..32),
    ) {
        let input: Vec<PoEntry> = keys
            .iter()
            .enumerate()
            .map(|(index, key)| entry(key, &index.to_string()))
            .collect();
        let outcome = dedup_entries(input.clone());

        // Reference: scan input, keep the first occurrence of each key.
        let mut seen = std::collections::HashSet::new();
        let expected: Vec<PoEntry> = input
            .iter()
            .filter(|e| seen.insert(e.msgid.clone()))
            .cloned()
            .collect();
        prop_assert_eq!(outcome.unique, expected);
        prop_assert_eq!(outcome.duplicate_count + seen.len(), keys.len());
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

#[test]
fn duplicates_report_is_reproducible_and_complete() {
    let outcome = dedup_entries(vec![entry("A", "1"), entry("B", "2"), entry("A", "3")]);
    let report = render_duplicates_report(&outcome, "2026-03-01 15:30:00");
    let again = render_duplicates_report(&outcome, "2026-03-01 15:30:00");

    assert_eq!(report, again);
    assert!(report.starts_with("DUPLICATE ENTRIES REPORT\n"));
    assert!(report.contains("Generated at: 2026-03-01 15:30:00\n"));
    assert!(report.contains("Total duplicates found: 1\n"));
    assert!(report.contains("DUPLICATE ENTRY #3\n"));
    assert!(report.contains("Original at position: 1\n"));
    assert!(report.contains("msgid: A\n"));
    assert!(report.contains("msgstr: 3\n"));
}

#[test]
fn summary_report_carries_all_counts() {
    let report = render_summary_report(10, 7, 3, "2026-03-01 15:30:00");
    assert!(report.contains("Total records in PO file: 10\n"));
    assert!(report.contains("Duplicate records found: 3\n"));
    assert!(report.contains("Unique records processed: 7\n"));
    assert!(report.contains("Records uploaded to database: 7\n"));
    assert!(report.contains("NOTE: Only the first occurrence"));
}

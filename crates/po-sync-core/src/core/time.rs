// crates/po-sync-core/src/core/time.rs
// ============================================================================
// Module: Catalogue Time Model
// Description: Fixed-offset timestamp formats for PO headers and reports.
// Purpose: Provide deterministic stamps; the core never reads wall-clock time.
// Dependencies: time
// ============================================================================

//! ## Overview
//! All timestamps the system emits are derived from caller-supplied
//! [`OffsetDateTime`] values rendered at one fixed reference offset, so the
//! same input produces the same bytes on every host. Three formats exist: the
//! PO header timestamp (`YYYY-MM-DD HH:MM±ZZZZ`), the `# date:` comment
//! (`YYYY-MM-DD`), and the dedup report stamp (`YYYY-MM-DD HH:MM:SS`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::UtcOffset;
use time::macros::offset;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed reference offset used for every emitted timestamp.
pub const CATALOG_UTC_OFFSET: UtcOffset = offset!(+5:30);

// ============================================================================
// SECTION: Stamp Formats
// ============================================================================

/// Formats a PO header timestamp (`YYYY-MM-DD HH:MM±ZZZZ`) at the reference
/// offset.
#[must_use]
pub fn po_timestamp(now: OffsetDateTime) -> String {
    let local = now.to_offset(CATALOG_UTC_OFFSET);
    let offset_minutes = local.offset().whole_minutes();
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let magnitude = offset_minutes.unsigned_abs();
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}{sign}{:02}{:02}",
        local.year(),
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute(),
        magnitude / 60,
        magnitude % 60,
    )
}

/// Formats the `# date:` comment value (`YYYY-MM-DD`) at the reference offset.
#[must_use]
pub fn po_date(now: OffsetDateTime) -> String {
    let local = now.to_offset(CATALOG_UTC_OFFSET);
    format!("{:04}-{:02}-{:02}", local.year(), u8::from(local.month()), local.day())
}

/// Formats a dedup report stamp (`YYYY-MM-DD HH:MM:SS`) at the reference
/// offset.
#[must_use]
pub fn report_stamp(now: OffsetDateTime) -> String {
    let local = now.to_offset(CATALOG_UTC_OFFSET);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        local.year(),
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute(),
        local.second(),
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn po_timestamp_renders_at_reference_offset() {
        let now = datetime!(2026-03-01 10:00 UTC);
        assert_eq!(po_timestamp(now), "2026-03-01 15:30+0530");
    }

    #[test]
    fn po_date_crosses_midnight_at_reference_offset() {
        let now = datetime!(2026-02-28 20:00 UTC);
        assert_eq!(po_date(now), "2026-03-01");
    }

    #[test]
    fn report_stamp_includes_seconds() {
        let now = datetime!(2026-03-01 10:00:07 UTC);
        assert_eq!(report_stamp(now), "2026-03-01 15:30:07");
    }
}

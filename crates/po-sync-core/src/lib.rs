// crates/po-sync-core/src/lib.rs
// ============================================================================
// Module: po-sync Core
// Description: Domain model, PO codec, dedup loader, and sync runtime.
// Purpose: Provide the backend-agnostic engine for catalogue/PO synchronization.
// Dependencies: async-trait, serde, thiserror, time, tokio
// ============================================================================

//! ## Overview
//! po-sync-core carries everything that does not touch a concrete backend:
//! the message catalogue data model, the PO text codec, the bulk-load dedup
//! loader, the capability interfaces (translator and message store), and the
//! runtime that batches translation work and keeps per-language PO files in
//! step with the store. Backends (SQLite store, HTTP translator, CLI) live in
//! sibling crates and plug in through the interfaces defined here.
//! Invariants:
//! - The core never reads wall-clock time; hosts supply timestamps.
//! - A message key is flagged translated only after the PO write holding its
//!   entry succeeded.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::catalog::InsertOutcome;
pub use crate::core::catalog::LanguageLocale;
pub use crate::core::catalog::LocaleSpec;
pub use crate::core::catalog::PoDocument;
pub use crate::core::catalog::PoEntry;
pub use crate::core::dedup::DedupOutcome;
pub use crate::core::dedup::DuplicateRecord;
pub use crate::core::dedup::dedup_entries;
pub use crate::core::dedup::render_duplicates_report;
pub use crate::core::dedup::render_summary_report;
pub use crate::core::po::PoHeaderSpec;
pub use crate::core::po::PoParseError;
pub use crate::core::po::merge;
pub use crate::core::po::parse;
pub use crate::core::po::serialize;
pub use crate::core::time::CATALOG_UTC_OFFSET;
pub use crate::core::time::po_date;
pub use crate::core::time::po_timestamp;
pub use crate::core::time::report_stamp;
pub use crate::interfaces::MessageStore;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::TranslateError;
pub use crate::interfaces::Translator;
pub use crate::runtime::pipeline::BatchOutcome;
pub use crate::runtime::pipeline::BatchPipeline;
pub use crate::runtime::pipeline::PipelineConfig;
pub use crate::runtime::sync::BatchFailure;
pub use crate::runtime::sync::SyncConfig;
pub use crate::runtime::sync::SyncError;
pub use crate::runtime::sync::SyncOrchestrator;
pub use crate::runtime::sync::SyncOutcome;
pub use crate::runtime::sync::SyncReport;

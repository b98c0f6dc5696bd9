// crates/po-sync-store-sqlite/src/lib.rs
// ============================================================================
// Module: po-sync SQLite Store
// Description: Durable MessageStore backed by SQLite.
// Purpose: Persist the message catalogue and per-language translation flags.
// Dependencies: po-sync-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate implements the [`po_sync_core::MessageStore`] capability on top
//! of `SQLite`. Locales, message strings, and per-language flags live in three
//! tables behind a schema-versioned store; batch flag updates commit in a
//! single transaction so a failed batch flags nothing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteMessageStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;

// crates/po-sync-providers/src/lib.rs
// ============================================================================
// Module: po-sync Providers
// Description: Built-in Translator capability implementations.
// Purpose: Provide ready-to-wire translators aligned with po-sync core.
// Dependencies: po-sync-core, reqwest, serde
// ============================================================================

//! ## Overview
//! This crate ships the built-in [`po_sync_core::Translator`] implementations:
//! an HTTP chat-completion translator for production use and a deterministic
//! table-backed translator for tests and offline runs. Both enforce the
//! capability contract: return only translated text, fail per call, and keep
//! the per-request timeout at this boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod chat;
pub mod table;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use chat::ChatTranslator;
pub use chat::ChatTranslatorConfig;
pub use table::MissingKeyPolicy;
pub use table::TableTranslator;

// crates/po-sync-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Message Store
// Description: Durable MessageStore backed by SQLite WAL.
// Purpose: Persist catalogue strings and per-language flags transactionally.
// Dependencies: po-sync-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`MessageStore`] using `SQLite`. Message
//! strings carry an autoincrement id that fixes the batching order; flags are
//! rows in a `(string_id, language_code)` relation, so a language code is
//! known to the store iff a locale registration exists; unknown codes fail
//! with `NotFound` instead of surfacing a backend error. Batch flag updates
//! run inside a single transaction; when the transaction fails, no key in
//! the batch was flagged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use po_sync_core::InsertOutcome;
use po_sync_core::LanguageLocale;
use po_sync_core::LocaleSpec;
use po_sync_core::MessageStore;
use po_sync_core::PoEntry;
use po_sync_core::StoreError;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite` message store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store initialization errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Filesystem error preparing the database location.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// Underlying database error.
    #[error("sqlite store database error: {0}")]
    Db(String),
    /// Stored schema version is incompatible.
    #[error("sqlite store version mismatch: found {found}, supported {supported}")]
    VersionMismatch {
        /// Version found in `store_meta`.
        found: i64,
        /// Version this build supports.
        supported: i64,
    },
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable message store backed by a single `SQLite` database file.
///
/// # Invariants
/// - `mark_translated` is all-or-nothing per call.
/// - `list_untranslated` orders by message insertion id.
pub struct SqliteMessageStore {
    /// Guarded database connection.
    connection: Mutex<Connection>,
}

impl SqliteMessageStore {
    /// Opens an `SQLite`-backed message store, creating the schema when
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when the stored schema version is unsupported.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let mut connection =
            Connection::open(&config.path).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .execute_batch(&format!(
                "PRAGMA journal_mode = {};",
                config.journal_mode.pragma_value()
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Opens an in-memory store, used by tests.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the schema cannot be initialized.
    pub fn in_memory() -> Result<Self, SqliteStoreError> {
        let mut connection =
            Connection::open_in_memory().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Returns true when the language code has a locale registration.
    fn code_is_registered(
        connection: &Connection,
        language_code: &str,
    ) -> Result<bool, StoreError> {
        connection
            .query_row(
                "SELECT 1 FROM language_locales WHERE language_code = ?1",
                params![language_code],
                |_| Ok(()),
            )
            .optional()
            .map(|row| row.is_some())
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

impl MessageStore for SqliteMessageStore {
    fn get_language_code(&self, language_name: &str) -> Result<Option<String>, StoreError> {
        let connection = self.lock_connection()?;
        connection
            .query_row(
                "SELECT language_code FROM language_locales WHERE language = ?1 LIMIT 1",
                params![language_name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    fn list_untranslated(&self, language_code: &str) -> Result<Vec<String>, StoreError> {
        let connection = self.lock_connection()?;
        if !Self::code_is_registered(&connection, language_code)? {
            return Err(StoreError::NotFound(language_code.to_string()));
        }
        let mut statement = connection
            .prepare(
                "SELECT s.msgid FROM language_strings s
                 LEFT JOIN translation_flags f
                     ON f.string_id = s.id AND f.language_code = ?1
                 WHERE COALESCE(f.flagged, 0) = 0
                 ORDER BY s.id",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![language_code], |row| row.get::<_, String>(0))
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let mut msgids = Vec::new();
        for row in rows {
            msgids.push(row.map_err(|err| StoreError::Db(err.to_string()))?);
        }
        Ok(msgids)
    }

    fn mark_translated(&self, language_code: &str, msgids: &[String]) -> Result<(), StoreError> {
        let mut connection = self.lock_connection()?;
        if !Self::code_is_registered(&connection, language_code)? {
            return Err(StoreError::NotFound(language_code.to_string()));
        }
        let tx = connection.transaction().map_err(|err| StoreError::Db(err.to_string()))?;
        for msgid in msgids {
            let updated = tx
                .execute(
                    "INSERT INTO translation_flags (string_id, language_code, flagged)
                     SELECT id, ?1, 1 FROM language_strings WHERE msgid = ?2
                     ON CONFLICT (string_id, language_code) DO UPDATE SET flagged = 1",
                    params![language_code, msgid],
                )
                .map_err(|err| StoreError::Db(err.to_string()))?;
            if updated == 0 {
                tracing::warn!(%msgid, "no catalogue record for msgid; flag skipped");
            }
        }
        tx.commit().map_err(|err| StoreError::Db(err.to_string()))
    }

    fn register_locale(&self, spec: &LocaleSpec) -> Result<LanguageLocale, StoreError> {
        let connection = self.lock_connection()?;
        let exists = Self::code_is_registered(&connection, &spec.language_code)?;
        if exists {
            return Err(StoreError::Conflict(format!(
                "language code {} already exists",
                spec.language_code
            )));
        }
        connection
            .execute(
                "INSERT INTO language_locales
                     (language, language_code, language_name, is_enable, last_update)
                 VALUES (?1, ?2, ?3, ?4, CAST(strftime('%s','now') AS INTEGER))",
                params![spec.language, spec.language_code, spec.language_name, i64::from(spec.enabled)],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let id = connection.last_insert_rowid();
        tracing::info!(code = %spec.language_code, id, "registered language locale");
        Ok(LanguageLocale {
            id,
            language: spec.language.clone(),
            language_code: spec.language_code.clone(),
            language_name: spec.language_name.clone(),
            enabled: spec.enabled,
        })
    }

    fn list_languages(&self) -> Result<Vec<String>, StoreError> {
        let connection = self.lock_connection()?;
        let mut statement = connection
            .prepare("SELECT DISTINCT language FROM language_locales ORDER BY language")
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![], |row| row.get::<_, String>(0))
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let mut languages = Vec::new();
        for row in rows {
            languages.push(row.map_err(|err| StoreError::Db(err.to_string()))?);
        }
        Ok(languages)
    }

    fn insert_messages(&self, entries: &[PoEntry]) -> Result<InsertOutcome, StoreError> {
        let mut connection = self.lock_connection()?;
        let tx = connection.transaction().map_err(|err| StoreError::Db(err.to_string()))?;
        let mut outcome = InsertOutcome::default();
        for entry in entries {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM language_strings WHERE msgid = ?1",
                    params![entry.msgid],
                    |_| Ok(()),
                )
                .optional()
                .map_err(|err| StoreError::Db(err.to_string()))?
                .is_some();
            if exists {
                outcome.skipped.push(entry.msgid.clone());
                continue;
            }
            tx.execute(
                "INSERT INTO language_strings (msgid, msgstr, last_update)
                 VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER))",
                params![entry.msgid, entry.msgstr],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
            outcome.inserted += 1;
        }
        tx.commit().map_err(|err| StoreError::Db(err.to_string()))?;
        tracing::info!(
            inserted = outcome.inserted,
            skipped = outcome.skipped.len(),
            "bulk message insert finished"
        );
        Ok(outcome)
    }
}

impl SqliteMessageStore {
    /// Locks the database connection, surfacing poisoning as a store error.
    fn lock_connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Io("sqlite connection mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Creates or validates the store schema.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS language_locales (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    language TEXT NOT NULL,
                    language_code TEXT NOT NULL UNIQUE,
                    language_name TEXT NOT NULL,
                    is_enable INTEGER NOT NULL DEFAULT 1,
                    last_update INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS language_strings (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    msgid TEXT NOT NULL UNIQUE,
                    msgstr TEXT,
                    last_update INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS translation_flags (
                    string_id INTEGER NOT NULL,
                    language_code TEXT NOT NULL,
                    flagged INTEGER NOT NULL DEFAULT 0,
                    PRIMARY KEY (string_id, language_code),
                    FOREIGN KEY (string_id)
                        REFERENCES language_strings(id) ON DELETE CASCADE,
                    FOREIGN KEY (language_code)
                        REFERENCES language_locales(language_code)
                );
                CREATE INDEX IF NOT EXISTS idx_translation_flags_language
                    ON translation_flags (language_code, flagged);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(found) => {
            return Err(SqliteStoreError::VersionMismatch {
                found,
                supported: SCHEMA_VERSION,
            });
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Creates the parent directory for the database file when missing.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    Ok(())
}

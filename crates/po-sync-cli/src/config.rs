// crates/po-sync-cli/src/config.rs
// ============================================================================
// Module: CLI Configuration
// Description: TOML configuration for store, catalogue, translator, pipeline.
// Purpose: Validate all external settings at load time and fail closed.
// Dependencies: po-sync-core, po-sync-providers, po-sync-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! The CLI reads one TOML file. Sections map onto the capability configs the
//! sibling crates define: `[store]` to the SQLite store, `[translator]` to
//! the chat provider, `[pipeline]` to the batch pipeline, and `[catalog]` to
//! the locales tree and PO header identity. Every section is optional except
//! `[translator]`, which only the `sync` command demands.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use po_sync_core::PipelineConfig;
use po_sync_core::PoHeaderSpec;
use po_sync_providers::ChatTranslatorConfig;
use po_sync_store_sqlite::SqliteStoreConfig;
use po_sync_store_sqlite::SqliteStoreMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config file {} could not be read: {cause}", path.display())]
    Unreadable {
        /// Offending file path.
        path: PathBuf,
        /// Rendered I/O cause.
        cause: String,
    },
    /// Configuration file is not valid TOML for this schema.
    #[error("config file {} is invalid: {cause}", path.display())]
    Invalid {
        /// Offending file path.
        path: PathBuf,
        /// Rendered parse cause.
        cause: String,
    },
    /// A setting failed validation.
    #[error("config validation failed: {0}")]
    Validation(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Catalogue tree and PO header identity settings.
///
/// # Invariants
/// - `name` is a file stem, never a path.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    /// Root directory holding per-locale catalogue trees.
    #[serde(default = "default_locales_root")]
    pub locales_root: PathBuf,
    /// Catalogue file stem, e.g. `messages` for `messages.po`.
    #[serde(default = "default_catalog_name")]
    pub name: String,
    /// Optional project name override for generated headers.
    #[serde(default)]
    pub project: Option<String>,
    /// Optional `Last-Translator` override for generated headers.
    #[serde(default)]
    pub team: Option<String>,
    /// Optional `Language-Team` override for generated headers.
    #[serde(default)]
    pub team_contact: Option<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            locales_root: default_locales_root(),
            name: default_catalog_name(),
            project: None,
            team: None,
            team_contact: None,
        }
    }
}

impl CatalogSettings {
    /// Builds the PO header spec, applying configured overrides.
    #[must_use]
    pub fn header_spec(&self) -> PoHeaderSpec {
        let mut spec = PoHeaderSpec::default();
        if let Some(project) = &self.project {
            spec.project = project.clone();
        }
        if let Some(team) = &self.team {
            spec.team = team.clone();
        }
        if let Some(team_contact) = &self.team_contact {
            spec.team_contact = team_contact.clone();
        }
        spec
    }
}

/// Returns the default locales root.
fn default_locales_root() -> PathBuf {
    PathBuf::from("locales")
}

/// Returns the default catalogue file stem.
fn default_catalog_name() -> String {
    "messages".to_string()
}

/// Returns the default store configuration.
fn default_store() -> SqliteStoreConfig {
    SqliteStoreConfig {
        path: PathBuf::from("po-sync.db"),
        busy_timeout_ms: 5_000,
        journal_mode: SqliteStoreMode::Wal,
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Complete CLI configuration.
///
/// # Invariants
/// - `translator` is present whenever the `sync` command runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite message store settings.
    #[serde(default = "default_store")]
    pub store: SqliteStoreConfig,
    /// Catalogue tree and header settings.
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// Chat translator settings; required only for `sync`.
    #[serde(default)]
    pub translator: Option<ChatTranslatorConfig>,
    /// Batch pipeline limits.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            catalog: CatalogSettings::default(),
            translator: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// A missing file yields the defaults, so read-only commands work
    /// without any setup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing; using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Unreadable {
            path: path.to_path_buf(),
            cause: err.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|err| ConfigError::Invalid {
            path: path.to_path_buf(),
            cause: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.name.is_empty() || self.catalog.name.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "catalog.name must be a non-empty file stem".to_string(),
            ));
        }
        if self.pipeline.batch_size == 0 {
            return Err(ConfigError::Validation("pipeline.batch_size must be > 0".to_string()));
        }
        if self.pipeline.max_in_flight == 0 {
            return Err(ConfigError::Validation(
                "pipeline.max_in_flight must be > 0".to_string(),
            ));
        }
        if let Some(translator) = &self.translator
            && translator.endpoint.is_empty()
        {
            return Err(ConfigError::Validation(
                "translator.endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

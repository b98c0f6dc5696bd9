// crates/po-sync-cli/src/main.rs
// ============================================================================
// Module: po-sync CLI Entry Point
// Description: Command dispatcher for catalogue management and sync runs.
// Purpose: Wire store and translator capabilities into the core runtime.
// Dependencies: clap, po-sync-core, po-sync-providers, po-sync-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! The `po-sync` binary manages a message catalogue and its per-language PO
//! files: locale registration, plain-text ingestion, bulk PO loading with a
//! dedup audit trail, and the translation sync itself. Capability objects
//! are constructed once per invocation from the TOML configuration and
//! passed into the core runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use po_sync_cli::AppConfig;
use po_sync_cli::ConfigError;
use po_sync_core::CATALOG_UTC_OFFSET;
use po_sync_core::LocaleSpec;
use po_sync_core::MessageStore;
use po_sync_core::PoEntry;
use po_sync_core::StoreError;
use po_sync_core::SyncConfig;
use po_sync_core::SyncError;
use po_sync_core::SyncOrchestrator;
use po_sync_core::SyncOutcome;
use po_sync_core::SyncReport;
use po_sync_core::TranslateError;
use po_sync_core::dedup_entries;
use po_sync_core::parse;
use po_sync_core::render_duplicates_report;
use po_sync_core::render_summary_report;
use po_sync_core::report_stamp;
use po_sync_providers::ChatTranslator;
use po_sync_store_sqlite::SqliteMessageStore;
use po_sync_store_sqlite::SqliteStoreError;
use thiserror::Error;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory receiving bulk-load audit reports.
const REPORT_DIR: &str = "po_processing_reports";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Top-level CLI errors.
///
/// # Invariants
/// - Every variant renders a single operator-facing line.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Store initialization failed.
    #[error(transparent)]
    StoreInit(#[from] SqliteStoreError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Translator construction failed.
    #[error(transparent)]
    Translate(#[from] TranslateError),
    /// Synchronization failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// Input or report file error.
    #[error("file error for {}: {cause}", path.display())]
    File {
        /// Offending file path.
        path: PathBuf,
        /// Rendered I/O cause.
        cause: String,
    },
    /// The sync command needs a `[translator]` config section.
    #[error("config has no [translator] section; sync requires one")]
    TranslatorMissing,
}

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Catalogue and PO-file synchronization toolkit.
#[derive(Debug, Parser)]
#[command(name = "po-sync", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "po-sync.toml")]
    config: PathBuf,
    /// Command to run.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new language locale.
    AddLanguage {
        /// Human-readable language name used to select sync targets.
        #[arg(long)]
        language: String,
        /// Machine locale code, e.g. `es_ES`.
        #[arg(long)]
        code: String,
        /// Display name; defaults to the language name.
        #[arg(long)]
        display_name: Option<String>,
        /// Register the locale disabled.
        #[arg(long)]
        disabled: bool,
    },
    /// List registered language names.
    ListLanguages,
    /// Ingest new message keys from a plain-text file, one per line.
    Ingest {
        /// Input file with one message key per line.
        file: PathBuf,
    },
    /// Bulk-load a PO file, deduplicate it, and upsert unique entries.
    BulkLoad {
        /// Input PO file in the bulk-ingestion dialect.
        file: PathBuf,
    },
    /// Translate pending keys for a language and update its PO file.
    Sync {
        /// Registered language name to synchronize.
        language: String,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the tracing subscriber, honoring `RUST_LOG` when set.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Dispatches the parsed command.
async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = AppConfig::load(&cli.config)?;
    let store = Arc::new(SqliteMessageStore::new(&config.store)?);
    match cli.command {
        Command::AddLanguage {
            language,
            code,
            display_name,
            disabled,
        } => {
            let spec = LocaleSpec {
                language_name: display_name.unwrap_or_else(|| language.clone()),
                language,
                language_code: code,
                enabled: !disabled,
            };
            let locale = store.register_locale(&spec)?;
            println!(
                "registered {} as {} (id {})",
                locale.language, locale.language_code, locale.id
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::ListLanguages => {
            for language in store.list_languages()? {
                println!("{language}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Ingest {
            file,
        } => run_ingest(store.as_ref(), &file),
        Command::BulkLoad {
            file,
        } => run_bulk_load(store.as_ref(), &file),
        Command::Sync {
            language,
        } => run_sync(&config, store, &language).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Ingests one message key per non-empty line of a plain-text file.
fn run_ingest(store: &dyn MessageStore, file: &Path) -> Result<ExitCode, CliError> {
    let raw = read_input(file)?;
    let entries: Vec<PoEntry> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| PoEntry {
            msgid: line.to_string(),
            msgstr: line.to_string(),
        })
        .collect();
    let outcome = store.insert_messages(&entries)?;
    println!(
        "inserted {} new keys, skipped {} duplicates",
        outcome.inserted,
        outcome.skipped.len()
    );
    for msgid in &outcome.skipped {
        tracing::debug!(%msgid, "skipped existing key");
    }
    Ok(ExitCode::SUCCESS)
}

/// Bulk-loads a PO file: parse, dedup, write audit reports, upsert.
fn run_bulk_load(store: &dyn MessageStore, file: &Path) -> Result<ExitCode, CliError> {
    let raw = read_input(file)?;
    let parsed = parse(&raw);
    let total_records = parsed.entries.len();
    let outcome = dedup_entries(parsed.entries);
    let unique_count = outcome.unique.len();

    let now = OffsetDateTime::now_utc();
    let stamp = report_stamp(now);
    let report_dir = Path::new(REPORT_DIR);
    fs::create_dir_all(report_dir).map_err(|err| CliError::File {
        path: report_dir.to_path_buf(),
        cause: err.to_string(),
    })?;
    let file_stamp = file_stamp(now);
    if outcome.duplicate_count > 0 {
        let path = report_dir.join(format!("duplicates_report_{file_stamp}.txt"));
        write_report(&path, &render_duplicates_report(&outcome, &stamp))?;
        println!(
            "found {} duplicates; report saved to {}",
            outcome.duplicate_count,
            path.display()
        );
    }
    let summary_path = report_dir.join(format!("processing_summary_{file_stamp}.txt"));
    write_report(
        &summary_path,
        &render_summary_report(total_records, unique_count, outcome.duplicate_count, &stamp),
    )?;
    println!("processing summary saved to {}", summary_path.display());

    if unique_count > 0 {
        let inserted = store.insert_messages(&outcome.unique)?;
        println!(
            "uploaded {} records ({} already present)",
            inserted.inserted,
            inserted.skipped.len()
        );
    } else {
        println!("no unique records to process");
    }
    println!(
        "total records: {total_records}, unique: {unique_count}, duplicates: {}",
        outcome.duplicate_count
    );
    Ok(ExitCode::SUCCESS)
}

/// Runs the translation sync for one language.
async fn run_sync(
    config: &AppConfig,
    store: Arc<SqliteMessageStore>,
    language: &str,
) -> Result<ExitCode, CliError> {
    let translator_config = config.translator.clone().ok_or(CliError::TranslatorMissing)?;
    let translator = Arc::new(ChatTranslator::new(translator_config)?);
    let orchestrator = SyncOrchestrator::new(
        store,
        translator,
        SyncConfig {
            locales_root: config.catalog.locales_root.clone(),
            catalog_name: config.catalog.name.clone(),
            header: config.catalog.header_spec(),
            pipeline: config.pipeline,
        },
    );
    let now = OffsetDateTime::now_utc().to_offset(CATALOG_UTC_OFFSET);
    let report = orchestrator.sync_language(language, now).await?;
    print_sync_report(&report);
    if report.failed_batches.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an input file into memory, wrapping failures with the path.
fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|err| CliError::File {
        path: path.to_path_buf(),
        cause: err.to_string(),
    })
}

/// Writes an audit report, wrapping failures with the path.
fn write_report(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|err| CliError::File {
        path: path.to_path_buf(),
        cause: err.to_string(),
    })
}

/// Formats the compact stamp used in report file names (`YYYYMMDD_HHMMSS`).
fn file_stamp(now: OffsetDateTime) -> String {
    let local = now.to_offset(CATALOG_UTC_OFFSET);
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        local.year(),
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute(),
        local.second(),
    )
}

/// Renders the sync outcome for the operator.
fn print_sync_report(report: &SyncReport) {
    let outcome = match report.outcome {
        SyncOutcome::Created => "created",
        SyncOutcome::Updated => "updated",
        SyncOutcome::NoOp => "no-op",
    };
    println!(
        "{}: {} (processed {}, translated {}, passed through {})",
        report.language_code, outcome, report.processed, report.translated, report.passthrough
    );
    for failure in &report.failed_batches {
        println!("batch {} failed: {}", failure.batch_index, failure.cause);
    }
}

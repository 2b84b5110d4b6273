// crates/arksync-cli/src/main.rs
// ============================================================================
// Module: arksync CLI Entry Point
// Description: Command dispatcher for catalog sync and chain validation.
// Purpose: Operate the definition catalog from the command line.
// Dependencies: arksync crates, clap, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The arksync CLI initializes the definition catalog, synchronizes it with
//! the upstream registries, reports catalog health, and validates live
//! redirect chains for configured definitions. Machine-readable results go
//! to stdout as JSON; sync events stream to stderr as JSON lines.
//! Security posture: command inputs and upstream payloads are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use arksync_config::ArksyncConfig;
use arksync_config::ConfigError;
use arksync_core::Catalog;
use arksync_core::CatalogError;
use arksync_core::Definition;
use arksync_core::ManagedElsewhere;
use arksync_core::NormalizerContext;
use arksync_core::PidKey;
use arksync_core::PidParts;
use arksync_core::SyncEvent;
use arksync_core::SyncObserver;
use arksync_core::reconcile;
use arksync_core::split_identifier;
use arksync_probe::ChainOutcome;
use arksync_probe::RedirectWalker;
use arksync_probe::ResolutionValidator;
use arksync_probe::WalkerConfig;
use arksync_sources::FetchConfig;
use arksync_sources::RegistrySource;
use arksync_sources::ShoulderListSource;
use arksync_store_sqlite::SqliteCatalog;
use arksync_store_sqlite::SqliteCatalogConfig;
use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Catalog description written by sync when the catalog does not exist yet.
const DEFAULT_CATALOG_DESCRIPTION: &str = "ark prefixes and shoulders";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "arksync", version, about = "ARK prefix catalog synchronizer")]
struct Cli {
    /// Path to the configuration file (overrides `ARKSYNC_CONFIG`).
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the definition catalog.
    Init {
        /// Operator description stored in the catalog metadata.
        description: String,
    },
    /// Synchronize the catalog with the upstream registries.
    Sync {
        /// Registry batch location (file path or URL); defaults to the
        /// configured registry.
        #[arg(short, long, value_name = "PATH_OR_URL")]
        source: Option<String>,
        /// Shoulder list location (file path or URL); defaults to the
        /// configured list.
        #[arg(short = 'z', long, value_name = "PATH_OR_URL")]
        shoulders: Option<String>,
    },
    /// Print catalog health and per-scheme counts.
    Info,
    /// Walk the live redirect chain for a test identifier.
    Validate {
        /// Identifier to resolve, for example `ark:/12345/x5wz2`.
        identifier: String,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terminal CLI error carrying the message shown to the operator.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Operator-facing message.
    message: String,
}

impl CliError {
    /// Wraps a message as a CLI error.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = ArksyncConfig::load(cli.config.as_deref()).map_err(config_error)?;
    match cli.command {
        Commands::Init {
            description,
        } => command_init(&config, &description),
        Commands::Sync {
            source,
            shoulders,
        } => command_sync(&config, source.as_deref(), shoulders.as_deref()),
        Commands::Info => command_info(&config),
        Commands::Validate {
            identifier,
        } => command_validate(&config, &identifier),
    }
}

// ============================================================================
// SECTION: Init Command
// ============================================================================

/// Executes the `init` command.
fn command_init(config: &ArksyncConfig, description: &str) -> CliResult<ExitCode> {
    let catalog = SqliteCatalog::create(&store_config(config), description)
        .map_err(catalog_error)?;
    let metadata = catalog.get_metadata().map_err(catalog_error)?;
    let payload = json!({
        "status": "initialized",
        "path": config.store.path.display().to_string(),
        "description": metadata.description,
        "created": stamp_text(metadata.created),
    });
    write_json(&payload)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Sync Command
// ============================================================================

/// Executes the `sync` command: load the batch, build the managed prefix
/// set, reconcile, and report counts.
fn command_sync(
    config: &ArksyncConfig,
    source: Option<&str>,
    shoulders: Option<&str>,
) -> CliResult<ExitCode> {
    let observer = StderrObserver;
    let fetch = fetch_config(config);

    let registry = RegistrySource::new(&fetch).map_err(source_error)?;
    let location = source.unwrap_or(config.sources.registry.as_str());
    let batch = registry.load(location).map_err(source_error)?;

    let shoulder_source =
        ShoulderListSource::new(&fetch, config.scheme.tag.clone()).map_err(source_error)?;
    let shoulder_location = shoulders.unwrap_or(config.sources.shoulder_list.as_str());
    let managed_prefixes = shoulder_source
        .managed_prefixes(shoulder_location, &observer)
        .map_err(source_error)?;

    let catalog = SqliteCatalog::create(&store_config(config), DEFAULT_CATALOG_DESCRIPTION)
        .map_err(catalog_error)?;
    let context = NormalizerContext {
        scheme: config.scheme.tag.clone(),
        scheme_name: config.scheme.name.clone(),
        canonical: config.scheme.canonical.clone(),
        managed: ManagedElsewhere::new(
            config.sources.managed_target_template.clone(),
            managed_prefixes,
        ),
    };
    let counts = reconcile(&batch, &catalog, &context, &observer).map_err(catalog_error)?;

    let payload =
        serde_json::to_value(counts).map_err(|err| CliError::new(err.to_string()))?;
    write_json(&payload)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Info Command
// ============================================================================

/// Executes the `info` command.
fn command_info(config: &ArksyncConfig) -> CliResult<ExitCode> {
    let payload = match SqliteCatalog::open(&store_config(config)) {
        Ok(catalog) => info_payload(&catalog).map_err(catalog_error)?,
        Err(CatalogError::Invalid(_)) => json!({
            "version": env!("CARGO_PKG_VERSION"),
            "status": "not initialized",
            "description": Value::Null,
            "created": Value::Null,
            "updated": Value::Null,
            "schemes": { "total": 0, "valid": 0 },
        }),
        Err(err) => return Err(catalog_error(err)),
    };
    write_json(&payload)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the info payload for an opened catalog.
fn info_payload(catalog: &dyn Catalog) -> Result<Value, CatalogError> {
    let metadata = catalog.get_metadata()?;
    let schemes = catalog.list_schemes(false)?;
    let valid = catalog.list_schemes(true)?;
    let mut scheme_counts = serde_json::Map::new();
    scheme_counts.insert("total".to_string(), json!(schemes.len()));
    scheme_counts.insert("valid".to_string(), json!(valid.len()));
    for scheme in &schemes {
        let prefixes = catalog.list_prefixes(scheme)?;
        scheme_counts.insert(scheme.clone(), json!({ "prefix_count": prefixes.len() }));
    }
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "status": "initialized",
        "description": metadata.description,
        "created": stamp_text(metadata.created),
        "updated": stamp_text(metadata.updated),
        "schemes": Value::Object(scheme_counts),
    }))
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command: resolve the identifier's definition and
/// walk its redirect chain.
fn command_validate(config: &ArksyncConfig, identifier: &str) -> CliResult<ExitCode> {
    let catalog = SqliteCatalog::open(&store_config(config)).map_err(catalog_error)?;
    let parts = split_identifier(identifier)
        .ok_or_else(|| CliError::new(format!("identifier does not split: {identifier}")))?;
    let definition = resolve_definition(&catalog, &parts)
        .map_err(catalog_error)?
        .ok_or_else(|| CliError::new(format!("no definition matches {identifier}")))?;

    let walker = RedirectWalker::new(WalkerConfig {
        timeout_ms: config.probe.timeout_ms,
        max_hops: config.probe.max_hops,
        user_agent: config.probe.user_agent.clone(),
    })
    .map_err(|err| CliError::new(err.to_string()))?;
    let validator =
        ResolutionValidator::new(walker, config.probe.local_host_prefixes.clone());
    let report = validator
        .validate(&definition, identifier)
        .map_err(|err| CliError::new(err.to_string()))?;

    let succeeded = matches!(report.outcome, ChainOutcome::Terminal);
    let payload = json!({
        "definition": definition.uniq(),
        "report": report,
    });
    write_json(&payload)?;
    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Resolves the most specific stored definition for an identifier: shoulder,
/// then prefix, then scheme.
fn resolve_definition(
    catalog: &dyn Catalog,
    parts: &PidParts,
) -> Result<Option<Definition>, CatalogError> {
    if let (Some(prefix), Some(value)) = (&parts.prefix, &parts.value) {
        let key = PidKey::shoulder(parts.scheme.clone(), prefix.clone(), value.clone());
        if let Some(definition) = catalog.get(&key)? {
            return Ok(Some(definition));
        }
    }
    if let Some(prefix) = &parts.prefix {
        let key = PidKey::prefix(parts.scheme.clone(), prefix.clone());
        if let Some(definition) = catalog.get(&key)? {
            return Ok(Some(definition));
        }
    }
    catalog.get(&PidKey::scheme(parts.scheme.clone()))
}

// ============================================================================
// SECTION: Wiring Helpers
// ============================================================================

/// Maps the operator config onto the sqlite store config.
fn store_config(config: &ArksyncConfig) -> SqliteCatalogConfig {
    SqliteCatalogConfig {
        path: config.store.path.clone(),
        busy_timeout_ms: config.store.busy_timeout_ms,
    }
}

/// Maps the operator config onto upstream fetch limits.
fn fetch_config(config: &ArksyncConfig) -> FetchConfig {
    FetchConfig {
        timeout_ms: config.sources.fetch_timeout_ms,
        max_response_bytes: config.sources.max_response_bytes,
        user_agent: config.probe.user_agent.clone(),
    }
}

/// Formats an optional stamp as RFC 3339 text for JSON payloads.
fn stamp_text(stamp: Option<OffsetDateTime>) -> Value {
    stamp
        .and_then(|stamp| stamp.format(&Rfc3339).ok())
        .map_or(Value::Null, Value::String)
}

/// Wraps a config error for the operator.
fn config_error(err: ConfigError) -> CliError {
    CliError::new(err.to_string())
}

/// Wraps a catalog error for the operator.
fn catalog_error(err: CatalogError) -> CliError {
    CliError::new(err.to_string())
}

/// Wraps a source error for the operator.
fn source_error(err: arksync_sources::SourceError) -> CliError {
    CliError::new(err.to_string())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Observer writing sync events as JSON lines on stderr.
struct StderrObserver;

impl SyncObserver for StderrObserver {
    fn record(&self, event: SyncEvent) {
        if let Ok(line) = serde_json::to_string(&event) {
            let _ = write_stderr_line(&line);
        }
    }
}

/// Writes a pretty JSON payload to stdout.
fn write_json(payload: &Value) -> CliResult<()> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&text).map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Reports a terminal error on stderr and maps it to a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::FAILURE
}

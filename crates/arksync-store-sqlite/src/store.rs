// crates/arksync-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Definition Catalog
// Description: Durable Catalog backed by SQLite WAL.
// Purpose: Persist definitions with per-record transactional upserts.
// Dependencies: arksync-core, rusqlite, serde, serde_json, time
// ============================================================================

//! ## Overview
//! This module implements a durable [`Catalog`] using `SQLite`. Definitions
//! are keyed by their rendered identity string; every upsert runs in its own
//! transaction so an integrity conflict on one record rolls back alone and
//! never poisons siblings already committed by the surrounding sync pass.
//! Change magnitudes are computed by comparing the stored row against the
//! incoming definition field by field.
//! Security posture: database contents round-trip untrusted upstream
//! payloads; properties are parsed back as plain JSON values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use arksync_core::Catalog;
use arksync_core::CatalogError;
use arksync_core::CatalogMetadata;
use arksync_core::Definition;
use arksync_core::PidKey;
use arksync_core::UpsertReceipt;
use arksync_core::parse_timestamp;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the catalog.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Catalog schema: definitions keyed by identity plus a singleton metadata
/// row.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS definition (
    uniq TEXT PRIMARY KEY,
    scheme TEXT NOT NULL,
    prefix TEXT,
    value TEXT,
    target TEXT NOT NULL,
    http_code INTEGER NOT NULL,
    canonical TEXT NOT NULL,
    synonym_for TEXT,
    properties TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_definition_scheme ON definition(scheme);
CREATE TABLE IF NOT EXISTS catalog_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    description TEXT NOT NULL,
    created TEXT,
    updated TEXT
);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` catalog.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteCatalogConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Catalog Implementation
// ============================================================================

/// Durable definition catalog backed by `SQLite`.
///
/// # Invariants
/// - Each upsert commits or rolls back as a unit.
/// - Metadata `created` survives re-initialization; only `description` is
///   rewritten.
#[derive(Debug)]
pub struct SqliteCatalog {
    /// Guarded database connection.
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Creates (or re-initializes) the catalog at the configured path and
    /// stamps `created` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the database cannot be created.
    pub fn create(
        config: &SqliteCatalogConfig,
        description: &str,
    ) -> Result<Self, CatalogError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| CatalogError::Io(err.to_string()))?;
            }
        }
        let conn = open_connection(config)?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_sqlite_error)?;
        conn.execute(
            "INSERT INTO catalog_meta (id, schema_version, description, created, updated)
             VALUES (1, ?1, ?2, ?3, NULL)
             ON CONFLICT(id) DO UPDATE SET description = excluded.description",
            params![SCHEMA_VERSION, description, format_stamp(OffsetDateTime::now_utc())?],
        )
        .map_err(map_sqlite_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an existing catalog, refusing uninitialized or mismatched
    /// databases.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the database is absent, uninitialized,
    /// or carries an incompatible schema version.
    pub fn open(config: &SqliteCatalogConfig) -> Result<Self, CatalogError> {
        if !config.path.exists() {
            return Err(CatalogError::Invalid(format!(
                "catalog not initialized at {}",
                config.path.display()
            )));
        }
        let conn = open_connection(config)?;
        let version: Option<i64> = conn
            .query_row("SELECT schema_version FROM catalog_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(map_sqlite_error)?;
        match version {
            None => {
                return Err(CatalogError::Invalid(format!(
                    "catalog not initialized at {}",
                    config.path.display()
                )));
            }
            Some(version) if version != SCHEMA_VERSION => {
                return Err(CatalogError::Invalid(format!(
                    "catalog schema version mismatch: found {version}, need {SCHEMA_VERSION}"
                )));
            }
            Some(_) => {}
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquires the connection lock.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Io("catalog connection lock poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Opens a connection with WAL and busy-timeout pragmas applied.
fn open_connection(config: &SqliteCatalogConfig) -> Result<Connection, CatalogError> {
    let conn = Connection::open(&config.path).map_err(map_sqlite_error)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(map_sqlite_error)?;
    conn.execute_batch("PRAGMA journal_mode = wal;").map_err(map_sqlite_error)?;
    conn.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(map_sqlite_error)?;
    Ok(conn)
}

/// Maps `SQLite` errors onto the catalog taxonomy; constraint violations are
/// conflicts, everything else is I/O.
fn map_sqlite_error(err: rusqlite::Error) -> CatalogError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            CatalogError::Conflict(err.to_string())
        }
        _ => CatalogError::Io(err.to_string()),
    }
}

/// Formats a stamp as RFC 3339 column text.
fn format_stamp(stamp: OffsetDateTime) -> Result<String, CatalogError> {
    stamp.format(&Rfc3339).map_err(|err| CatalogError::Io(err.to_string()))
}

/// Parses an optional RFC 3339 column back into a stamp.
fn parse_stamp(raw: Option<String>) -> Result<Option<OffsetDateTime>, CatalogError> {
    raw.map(|text| {
        parse_timestamp(&text)
            .map_err(|err| CatalogError::Invalid(format!("stored stamp unreadable: {err}")))
    })
    .transpose()
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Stored columns compared against incoming definitions.
struct StoredRow {
    /// Stored target template.
    target: String,
    /// Stored redirect status code.
    http_code: u16,
    /// Stored canonical template.
    canonical: String,
    /// Stored synonym reference.
    synonym_for: Option<String>,
    /// Stored provenance JSON text.
    properties: String,
}

/// Reads the stored row for an identity inside a transaction.
fn read_stored(tx: &Transaction<'_>, uniq: &str) -> Result<Option<StoredRow>, CatalogError> {
    tx.query_row(
        "SELECT target, http_code, canonical, synonym_for, properties
         FROM definition WHERE uniq = ?1",
        params![uniq],
        |row| {
            Ok(StoredRow {
                target: row.get(0)?,
                http_code: row.get(1)?,
                canonical: row.get(2)?,
                synonym_for: row.get(3)?,
                properties: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(map_sqlite_error)
}

/// Counts differing stored fields between a row and an incoming definition.
fn change_magnitude(stored: &StoredRow, incoming: &Definition) -> Result<i64, CatalogError> {
    let mut changes = 0;
    if stored.target != incoming.target {
        changes += 1;
    }
    if stored.http_code != incoming.http_code {
        changes += 1;
    }
    if stored.canonical != incoming.canonical {
        changes += 1;
    }
    if stored.synonym_for != incoming.synonym_for {
        changes += 1;
    }
    let stored_properties: serde_json::Value = serde_json::from_str(&stored.properties)
        .map_err(|err| CatalogError::Invalid(format!("stored properties unreadable: {err}")))?;
    if stored_properties != incoming.properties {
        changes += 1;
    }
    Ok(changes)
}

/// Serializes definition provenance for storage.
fn properties_text(definition: &Definition) -> Result<String, CatalogError> {
    serde_json::to_string(&definition.properties)
        .map_err(|err| CatalogError::Invalid(format!("properties unserializable: {err}")))
}

// ============================================================================
// SECTION: Catalog Trait
// ============================================================================

impl Catalog for SqliteCatalog {
    fn upsert(&self, definition: &Definition) -> Result<UpsertReceipt, CatalogError> {
        let uniq = definition.uniq();
        let properties = properties_text(definition)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(map_sqlite_error)?;
        let magnitude = match read_stored(&tx, &uniq)? {
            None => {
                tx.execute(
                    "INSERT INTO definition
                     (uniq, scheme, prefix, value, target, http_code, canonical, synonym_for, properties)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        uniq,
                        definition.scheme,
                        definition.prefix,
                        definition.value,
                        definition.target,
                        definition.http_code,
                        definition.canonical,
                        definition.synonym_for,
                        properties,
                    ],
                )
                .map_err(map_sqlite_error)?;
                -1
            }
            Some(stored) => {
                let changes = change_magnitude(&stored, definition)?;
                if changes > 0 {
                    tx.execute(
                        "UPDATE definition
                         SET target = ?2, http_code = ?3, canonical = ?4, synonym_for = ?5,
                             properties = ?6
                         WHERE uniq = ?1",
                        params![
                            uniq,
                            definition.target,
                            definition.http_code,
                            definition.canonical,
                            definition.synonym_for,
                            properties,
                        ],
                    )
                    .map_err(map_sqlite_error)?;
                }
                changes
            }
        };
        tx.commit().map_err(map_sqlite_error)?;
        Ok(UpsertReceipt {
            uniq,
            change_magnitude: magnitude,
        })
    }

    fn get(&self, key: &PidKey) -> Result<Option<Definition>, CatalogError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT scheme, prefix, value, target, http_code, canonical, synonym_for,
                        properties
                 FROM definition WHERE uniq = ?1",
                params![key.uniq()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, u16>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()
            .map_err(map_sqlite_error)?;
        row.map(|(scheme, prefix, value, target, http_code, canonical, synonym_for, properties)| {
            let properties = serde_json::from_str(&properties).map_err(|err| {
                CatalogError::Invalid(format!("stored properties unreadable: {err}"))
            })?;
            Ok(Definition {
                scheme,
                prefix,
                value,
                target,
                http_code,
                canonical,
                properties,
                synonym_for,
            })
        })
        .transpose()
    }

    fn get_metadata(&self) -> Result<CatalogMetadata, CatalogError> {
        let conn = self.lock()?;
        let (description, created, updated) = conn
            .query_row(
                "SELECT description, created, updated FROM catalog_meta WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .map_err(map_sqlite_error)?;
        Ok(CatalogMetadata {
            description,
            created: parse_stamp(created)?,
            updated: parse_stamp(updated)?,
        })
    }

    fn refresh_metadata(&self) -> Result<(), CatalogError> {
        let stamp = format_stamp(OffsetDateTime::now_utc())?;
        let conn = self.lock()?;
        conn.execute("UPDATE catalog_meta SET updated = ?1 WHERE id = 1", params![stamp])
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn list_schemes(&self, valid_targets_only: bool) -> Result<Vec<String>, CatalogError> {
        let conn = self.lock()?;
        let sql = if valid_targets_only {
            "SELECT DISTINCT scheme FROM definition
             WHERE target LIKE 'http://%' OR target LIKE 'https://%'
             ORDER BY scheme"
        } else {
            "SELECT DISTINCT scheme FROM definition ORDER BY scheme"
        };
        let mut statement = conn.prepare(sql).map_err(map_sqlite_error)?;
        let schemes = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(map_sqlite_error)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(map_sqlite_error)?;
        Ok(schemes)
    }

    fn list_prefixes(&self, scheme: &str) -> Result<Vec<String>, CatalogError> {
        let conn = self.lock()?;
        let mut statement = conn
            .prepare(
                "SELECT DISTINCT prefix FROM definition
                 WHERE scheme = ?1 AND prefix IS NOT NULL
                 ORDER BY prefix",
            )
            .map_err(map_sqlite_error)?;
        let prefixes = statement
            .query_map(params![scheme], |row| row.get::<_, String>(0))
            .map_err(map_sqlite_error)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(map_sqlite_error)?;
        Ok(prefixes)
    }
}

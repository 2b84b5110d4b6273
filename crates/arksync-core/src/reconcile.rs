// crates/arksync-core/src/reconcile.rs
// ============================================================================
// Module: Reconciliation Engine
// Description: Idempotent merge of upstream batches into a catalog.
// Purpose: Drive freshness gating, normalization, and per-record upserts.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! [`reconcile`] merges one upstream batch into a catalog: a freshness gate
//! skips passes whose source is no newer than the catalog, a scheme-level
//! default definition is refreshed, and every raw record is normalized and
//! upserted in source order. Records are isolated from each other: a skip or
//! an integrity conflict on one record never aborts the pass, while storage
//! failures and source problems do.
//! Invariants:
//! - Counts satisfy `added + updated + unchanged-or-skipped == total` and
//!   `total` equals the number of raw records in the batch.
//! - Re-running an unchanged batch against a synchronized catalog yields
//!   zero added and zero updated records.
//! - Metadata `updated` is stamped once, after the loop, never mid-pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::catalog::Catalog;
use crate::catalog::CatalogError;
use crate::definition::DEFAULT_HTTP_CODE;
use crate::definition::Definition;
use crate::definition::INFO_TARGET_TEMPLATE;
use crate::normalize::Normalized;
use crate::normalize::NormalizerContext;
use crate::normalize::normalize_record;
use crate::observer::SyncEvent;
use crate::observer::SyncObserver;
use crate::record::UpstreamBatch;

// ============================================================================
// SECTION: Counts
// ============================================================================

/// Per-pass record counters.
///
/// # Invariants
/// - `total` counts every raw record, including skipped and conflicting
///   ones; `added + updated + skipped` never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncCounts {
    /// Raw records seen.
    pub total: u64,
    /// Definitions newly added.
    pub added: u64,
    /// Definitions updated.
    pub updated: u64,
    /// Records skipped by the normalizer.
    pub skipped: u64,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Merges an upstream batch into the catalog.
///
/// The pass is skipped outright (all-zero counts, no writes) when the
/// catalog's `updated` stamp is at least as recent as the batch's declared
/// freshness; equal stamps skip. Otherwise the scheme-level default
/// definition is refreshed (failures are reported and swallowed), every raw
/// record is normalized and upserted in order, and the catalog metadata is
/// restamped.
///
/// # Errors
///
/// Returns [`CatalogError`] when metadata cannot be read or written, or when
/// an upsert fails with anything other than an integrity conflict. Conflicts
/// are reported through the observer and the pass continues.
pub fn reconcile(
    batch: &UpstreamBatch,
    catalog: &dyn Catalog,
    ctx: &NormalizerContext,
    observer: &dyn SyncObserver,
) -> Result<SyncCounts, CatalogError> {
    let metadata = catalog.get_metadata()?;
    if let Some(catalog_updated) = metadata.updated
        && catalog_updated >= batch.updated
    {
        observer.record(SyncEvent::SourceStale {
            catalog_updated: format_stamp(catalog_updated),
            source_updated: format_stamp(batch.updated),
        });
        return Ok(SyncCounts::default());
    }

    upsert_scheme_default(catalog, ctx, observer);

    let mut counts = SyncCounts::default();
    for raw in &batch.data {
        counts.total += 1;
        let definition = match normalize_record(raw, ctx) {
            Normalized::Definition(definition) => definition,
            Normalized::Skip(reason) => {
                counts.skipped += 1;
                observer.record(SyncEvent::EntrySkipped {
                    reason: reason.as_str(),
                });
                continue;
            }
        };
        match catalog.upsert(&definition) {
            Ok(receipt) if receipt.change_magnitude < 0 => {
                counts.added += 1;
                observer.record(SyncEvent::EntryAdded {
                    uniq: receipt.uniq,
                });
            }
            Ok(receipt) if receipt.change_magnitude > 0 => {
                counts.updated += 1;
                observer.record(SyncEvent::EntryUpdated {
                    uniq: receipt.uniq,
                    changes: receipt.change_magnitude,
                });
            }
            Ok(receipt) => {
                observer.record(SyncEvent::EntryUnchanged {
                    uniq: receipt.uniq,
                });
            }
            Err(CatalogError::Conflict(detail)) => {
                observer.record(SyncEvent::EntryConflict {
                    uniq: definition.uniq(),
                    error: detail,
                });
            }
            Err(err) => return Err(err),
        }
    }

    catalog.refresh_metadata()?;
    observer.record(SyncEvent::PassCompleted {
        total: counts.total,
        added: counts.added,
        updated: counts.updated,
        skipped: counts.skipped,
    });
    Ok(counts)
}

/// Builds the scheme-level default definition representing the scheme itself.
#[must_use]
pub fn scheme_default(ctx: &NormalizerContext) -> Definition {
    Definition {
        scheme: ctx.scheme.clone(),
        prefix: None,
        value: None,
        target: INFO_TARGET_TEMPLATE.to_string(),
        http_code: DEFAULT_HTTP_CODE,
        canonical: ctx.canonical.clone(),
        properties: json!({
            "what": ctx.scheme,
            "name": ctx.scheme_name,
        }),
        synonym_for: None,
    }
}

/// Upserts the scheme-level default definition, reporting and swallowing any
/// failure so it never aborts the batch.
fn upsert_scheme_default(
    catalog: &dyn Catalog,
    ctx: &NormalizerContext,
    observer: &dyn SyncObserver,
) {
    let definition = scheme_default(ctx);
    match catalog.upsert(&definition) {
        Ok(receipt) if receipt.change_magnitude < 0 => {
            observer.record(SyncEvent::EntryAdded {
                uniq: receipt.uniq,
            });
        }
        Ok(receipt) if receipt.change_magnitude > 0 => {
            observer.record(SyncEvent::EntryUpdated {
                uniq: receipt.uniq,
                changes: receipt.change_magnitude,
            });
        }
        Ok(receipt) => {
            observer.record(SyncEvent::EntryUnchanged {
                uniq: receipt.uniq,
            });
        }
        Err(err) => {
            observer.record(SyncEvent::EntryConflict {
                uniq: definition.uniq(),
                error: err.to_string(),
            });
        }
    }
}

/// Formats a stamp for observer payloads.
fn format_stamp(stamp: OffsetDateTime) -> String {
    stamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| stamp.unix_timestamp().to_string())
}

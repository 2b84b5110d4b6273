// crates/arksync-core/src/observer.rs
// ============================================================================
// Module: Sync Observability
// Description: Structured event payloads for sync and source activity.
// Purpose: Surface per-record outcomes without a hard logging dependency.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Sync passes report their per-record outcomes through a [`SyncObserver`].
//! Events are plain serializable payloads so hosts can route them to their
//! preferred logging pipeline without redesign; the CLI writes them as JSON
//! lines on stderr. The default [`NoopObserver`] discards everything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Structured event emitted during a sync pass or source fetch.
///
/// # Invariants
/// - Variant and field names are stable for downstream log consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A definition was newly added.
    EntryAdded {
        /// Upsert identity of the definition.
        uniq: String,
    },
    /// A stored definition changed.
    EntryUpdated {
        /// Upsert identity of the definition.
        uniq: String,
        /// Number of changed fields.
        changes: i64,
    },
    /// A stored definition was already current.
    EntryUnchanged {
        /// Upsert identity of the definition.
        uniq: String,
    },
    /// A record was passed over by the normalizer.
    EntrySkipped {
        /// Stable skip reason label.
        reason: &'static str,
    },
    /// An upsert hit an integrity conflict and was rolled back.
    EntryConflict {
        /// Upsert identity of the definition.
        uniq: String,
        /// Conflict detail.
        error: String,
    },
    /// The freshness gate short-circuited the pass.
    SourceStale {
        /// Catalog `updated` stamp.
        catalog_updated: String,
        /// Source-declared freshness stamp.
        source_updated: String,
    },
    /// The secondary shoulder list could not be retrieved; the pass
    /// continues without authority overrides.
    ShoulderListUnavailable {
        /// HTTP status when the server answered.
        status: Option<u16>,
        /// Fetch detail.
        detail: String,
    },
    /// A sync pass ran to completion.
    PassCompleted {
        /// Records seen.
        total: u64,
        /// Records newly added.
        added: u64,
        /// Records updated.
        updated: u64,
        /// Records skipped by the normalizer.
        skipped: u64,
    },
}

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Sink for sync events.
pub trait SyncObserver: Send + Sync {
    /// Records one event.
    fn record(&self, event: SyncEvent);
}

/// Observer that discards every event.
///
/// # Invariants
/// - Events are intentionally dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn record(&self, _event: SyncEvent) {}
}

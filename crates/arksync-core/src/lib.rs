// crates/arksync-core/src/lib.rs
// ============================================================================
// Module: arksync Core Library
// Description: Data model, normalizer, and reconciliation engine for arksync.
// Purpose: Keep a definition catalog synchronized with upstream registries.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! arksync-core carries the storage-agnostic heart of arksync: the
//! [`Definition`] data model, identifier splitting, upstream record
//! classification, the record normalizer, and the reconciliation engine that
//! merges upstream batches into any [`Catalog`] implementation. Networked
//! source adapters and concrete catalogs live in sibling crates.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod definition;
pub mod normalize;
pub mod observer;
pub mod pid;
pub mod reconcile;
pub mod record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use catalog::CatalogError;
pub use catalog::CatalogMetadata;
pub use catalog::MemoryCatalog;
pub use catalog::UpsertReceipt;
pub use catalog::is_valid_target;
pub use definition::DEFAULT_HTTP_CODE;
pub use definition::Definition;
pub use definition::INFO_TARGET_TEMPLATE;
pub use definition::PROVENANCE_TARGET_KEY;
pub use definition::PidKey;
pub use normalize::ManagedElsewhere;
pub use normalize::Normalized;
pub use normalize::NormalizerContext;
pub use normalize::SkipReason;
pub use normalize::normalize_record;
pub use observer::NoopObserver;
pub use observer::SyncEvent;
pub use observer::SyncObserver;
pub use pid::PidParts;
pub use pid::expand_template;
pub use pid::split_identifier;
pub use reconcile::SyncCounts;
pub use reconcile::reconcile;
pub use reconcile::scheme_default;
pub use record::BatchParseError;
pub use record::RegistryRecord;
pub use record::UpstreamBatch;
pub use record::parse_timestamp;

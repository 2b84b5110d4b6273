// crates/arksync-store-sqlite/src/lib.rs
// ============================================================================
// Module: arksync SQLite Store Library
// Description: Durable SQLite-backed catalog adapter for arksync.
// Purpose: Persist definition catalogs behind the core Catalog port.
// Dependencies: arksync-core, rusqlite, serde, serde_json, time
// ============================================================================

//! ## Overview
//! arksync-store-sqlite persists definition catalogs in a single `SQLite`
//! file. The core engines only ever see the [`arksync_core::Catalog`] trait;
//! this crate supplies the durable implementation the CLI operates on.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteCatalog;
pub use store::SqliteCatalogConfig;

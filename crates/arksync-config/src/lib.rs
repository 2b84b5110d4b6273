// crates/arksync-config/src/lib.rs
// ============================================================================
// Module: arksync Config Library
// Description: Canonical configuration model and validation for arksync.
// Purpose: Resolve, parse, and validate operator configuration.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! arksync-config resolves the operator's TOML configuration (explicit path,
//! `ARKSYNC_CONFIG` environment variable, or `arksync.toml`), applies
//! working defaults pointed at the public ARK registries, and validates
//! every bounded setting before the CLI touches the catalog or the network.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ArksyncConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::ProbeConfig;
pub use config::SchemeConfig;
pub use config::SourcesConfig;
pub use config::StoreConfig;

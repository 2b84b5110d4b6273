// crates/arksync-config/src/config.rs
// ============================================================================
// Module: arksync Configuration
// Description: Configuration loading and validation for arksync.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with a strict size limit and
//! bounded numeric settings. Every section is optional and carries working
//! defaults pointed at the public ARK registries; invalid values fail closed
//! before any catalog or network activity starts.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "arksync.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ARKSYNC_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Minimum allowed fetch or probe timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed fetch or probe timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum allowed probe hop ceiling.
pub(crate) const MAX_HOP_CEILING: u32 = 64;
/// Maximum allowed upstream response ceiling in bytes.
pub(crate) const MAX_RESPONSE_BYTES_CEILING: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// arksync configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArksyncConfig {
    /// Catalog storage configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Upstream source configuration.
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Redirect probe configuration.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Identifier scheme configuration.
    #[serde(default)]
    pub scheme: SchemeConfig,
}

/// Catalog storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the `SQLite` catalog file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Upstream source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Primary registry batch location (URL or file path).
    #[serde(default = "default_registry")]
    pub registry: String,
    /// Secondary authority shoulder list location (URL or file path).
    #[serde(default = "default_shoulder_list")]
    pub shoulder_list: String,
    /// Redirect template substituted for managed-elsewhere prefixes.
    #[serde(default = "default_managed_target_template")]
    pub managed_target_template: String,
    /// Upstream fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Upstream response ceiling in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

/// Redirect probe configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Host prefixes that count as the authority's own infrastructure.
    #[serde(default)]
    pub local_host_prefixes: Vec<String>,
    /// Per-request probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum local hops fetched per chain walk.
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
    /// User agent for probe requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Identifier scheme configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeConfig {
    /// Scheme tag stamped on every definition.
    #[serde(default = "default_scheme_tag")]
    pub tag: String,
    /// Human-readable scheme name.
    #[serde(default = "default_scheme_name")]
    pub name: String,
    /// Scheme-wide canonical identifier template.
    #[serde(default = "default_canonical")]
    pub canonical: String,
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default catalog file path.
fn default_store_path() -> PathBuf {
    PathBuf::from("data/arksync.db")
}

/// Returns the default store busy timeout in milliseconds.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Returns the public NAAN registry batch URL.
fn default_registry() -> String {
    "https://cdluc3.github.io/naan_reg_public/naans_public.json".to_string()
}

/// Returns the secondary authority shoulder list URL.
fn default_shoulder_list() -> String {
    "https://ezid.cdlib.org/static/info/shoulder-list.txt".to_string()
}

/// Returns the secondary authority's redirect template.
fn default_managed_target_template() -> String {
    "https://ezid.cdlib.org/ark:/${prefix}/${value}".to_string()
}

/// Returns the default upstream fetch timeout in milliseconds.
const fn default_fetch_timeout_ms() -> u64 {
    30_000
}

/// Returns the default upstream response ceiling in bytes.
const fn default_max_response_bytes() -> usize {
    16 * 1024 * 1024
}

/// Returns the default probe timeout in milliseconds.
const fn default_probe_timeout_ms() -> u64 {
    10_000
}

/// Returns the default probe hop ceiling.
const fn default_max_hops() -> u32 {
    16
}

/// Returns the default probe user agent.
fn default_user_agent() -> String {
    "arksync/0.1".to_string()
}

/// Returns the default scheme tag.
fn default_scheme_tag() -> String {
    "ark".to_string()
}

/// Returns the default scheme display name.
fn default_scheme_name() -> String {
    "Archival Resource Key".to_string()
}

/// Returns the default canonical identifier template.
fn default_canonical() -> String {
    "ark:/${prefix}/${value}".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            shoulder_list: default_shoulder_list(),
            managed_target_template: default_managed_target_template(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            local_host_prefixes: Vec::new(),
            timeout_ms: default_probe_timeout_ms(),
            max_hops: default_max_hops(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            tag: default_scheme_tag(),
            name: default_scheme_name(),
            canonical: default_canonical(),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ArksyncConfig {
    /// Loads configuration from disk using the default resolution rules: an
    /// explicit path, then the `ARKSYNC_CONFIG` environment variable, then
    /// `arksync.toml` in the working directory. When no file exists at the
    /// resolved default location, built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some() || env::var(CONFIG_ENV_VAR).is_ok();
        let resolved = resolve_path(path);
        if !resolved.exists() {
            if explicit {
                return Err(ConfigError::Io(format!(
                    "config file not found: {}",
                    resolved.display()
                )));
            }
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.sources.validate()?;
        self.probe.validate()?;
        self.scheme.validate()?;
        Ok(())
    }
}

/// Resolves the effective configuration path.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(from_env) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(from_env);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Checks a timeout against the shared bounds.
fn validate_timeout(label: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "{label} out of range: {timeout_ms} (allowed {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS})"
        )));
    }
    Ok(())
}

impl StoreConfig {
    /// Validates storage settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must be set".to_string()));
        }
        validate_timeout("store.busy_timeout_ms", self.busy_timeout_ms)
    }
}

impl SourcesConfig {
    /// Validates upstream source settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.trim().is_empty() {
            return Err(ConfigError::Invalid("sources.registry must be set".to_string()));
        }
        if self.shoulder_list.trim().is_empty() {
            return Err(ConfigError::Invalid("sources.shoulder_list must be set".to_string()));
        }
        if self.managed_target_template.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sources.managed_target_template must be set".to_string(),
            ));
        }
        validate_timeout("sources.fetch_timeout_ms", self.fetch_timeout_ms)?;
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_CEILING {
            return Err(ConfigError::Invalid(format!(
                "sources.max_response_bytes out of range: {} (max {MAX_RESPONSE_BYTES_CEILING})",
                self.max_response_bytes
            )));
        }
        Ok(())
    }
}

impl ProbeConfig {
    /// Validates probe settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout("probe.timeout_ms", self.timeout_ms)?;
        if self.max_hops == 0 || self.max_hops > MAX_HOP_CEILING {
            return Err(ConfigError::Invalid(format!(
                "probe.max_hops out of range: {} (allowed 1..={MAX_HOP_CEILING})",
                self.max_hops
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("probe.user_agent must be set".to_string()));
        }
        if self.local_host_prefixes.iter().any(|prefix| prefix.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "probe.local_host_prefixes entries must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl SchemeConfig {
    /// Validates scheme settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::Invalid("scheme.tag must be set".to_string()));
        }
        if self.canonical.trim().is_empty() {
            return Err(ConfigError::Invalid("scheme.canonical must be set".to_string()));
        }
        Ok(())
    }
}

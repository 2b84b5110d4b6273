// crates/arksync-core/src/pid.rs
// ============================================================================
// Module: Identifier Splitting
// Description: Structural decomposition of persistent identifiers.
// Purpose: Split identifiers into scheme/prefix/value and expand templates.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Persistent identifiers have the shape `scheme:[/]prefix[/value]`, for
//! example `ark:/12345/x54xz321`. [`split_identifier`] decomposes an
//! identifier into its structural parts and [`expand_template`] substitutes
//! the parts into a `${...}` placeholder template such as a definition's
//! target.

// ============================================================================
// SECTION: Types
// ============================================================================

/// Structural parts of a persistent identifier.
///
/// # Invariants
/// - `scheme` is lowercased; `pid` retains the caller's original spelling
///   (surrounding whitespace trimmed).
/// - `value` is present only when `prefix` is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidParts {
    /// Lowercased scheme tag.
    pub scheme: String,
    /// Registrant authority code, when present.
    pub prefix: Option<String>,
    /// Shoulder and remainder under the prefix, when present.
    pub value: Option<String>,
    /// The full identifier as given.
    pub pid: String,
}

// ============================================================================
// SECTION: Splitting
// ============================================================================

/// Splits an identifier into scheme, prefix, and value.
///
/// Returns `None` when the identifier carries no `scheme:` separator or an
/// empty scheme. A single leading `/` after the separator is tolerated, so
/// `ark:/12345/x5` and `ark:12345/x5` split identically.
#[must_use]
pub fn split_identifier(identifier: &str) -> Option<PidParts> {
    let pid = identifier.trim();
    let (scheme_raw, rest) = pid.split_once(':')?;
    let scheme = scheme_raw.trim().to_ascii_lowercase();
    if scheme.is_empty() {
        return None;
    }
    let rest = rest.trim().trim_start_matches('/');
    let (prefix, value) = match rest.split_once('/') {
        Some((head, tail)) => (non_empty(head), non_empty(tail)),
        None => (non_empty(rest), None),
    };
    Some(PidParts {
        scheme,
        prefix,
        value,
        pid: pid.to_string(),
    })
}

/// Maps an empty or whitespace-only segment to `None`.
fn non_empty(segment: &str) -> Option<String> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// SECTION: Template Expansion
// ============================================================================

/// Expands `${pid}`, `${scheme}`, `${prefix}`, and `${value}` placeholders in
/// a target or canonical template. Absent parts expand to the empty string.
#[must_use]
pub fn expand_template(template: &str, parts: &PidParts) -> String {
    template
        .replace("${pid}", &parts.pid)
        .replace("${scheme}", &parts.scheme)
        .replace("${prefix}", parts.prefix.as_deref().unwrap_or(""))
        .replace("${value}", parts.value.as_deref().unwrap_or(""))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions.
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::expand_template;
    use super::split_identifier;

    /// Splits a slash-prefixed shoulder identifier.
    #[test]
    fn splits_slashed_identifier() {
        let parts = split_identifier("ark:/12345/x54xz321").unwrap();
        assert_eq!(parts.scheme, "ark");
        assert_eq!(parts.prefix.as_deref(), Some("12345"));
        assert_eq!(parts.value.as_deref(), Some("x54xz321"));
        assert_eq!(parts.pid, "ark:/12345/x54xz321");
    }

    /// Splits identically with and without the leading slash.
    #[test]
    fn slash_is_optional() {
        let slashed = split_identifier("ark:/12345/x5").unwrap();
        let bare = split_identifier("ark:12345/x5").unwrap();
        assert_eq!(slashed.prefix, bare.prefix);
        assert_eq!(slashed.value, bare.value);
    }

    /// A prefix-only identifier yields no value part.
    #[test]
    fn prefix_only_identifier() {
        let parts = split_identifier("ark:12345").unwrap();
        assert_eq!(parts.prefix.as_deref(), Some("12345"));
        assert!(parts.value.is_none());
    }

    /// Uppercase schemes are lowercased.
    #[test]
    fn scheme_is_lowercased() {
        let parts = split_identifier("ARK:/99999/fk4").unwrap();
        assert_eq!(parts.scheme, "ark");
    }

    /// An identifier without a separator does not split.
    #[test]
    fn missing_separator_rejected() {
        assert!(split_identifier("12345/x5").is_none());
        assert!(split_identifier(":12345").is_none());
    }

    /// Placeholders expand with absent parts mapped to empty strings.
    #[test]
    fn expands_placeholders() {
        let parts = split_identifier("ark:/12345/x5").unwrap();
        assert_eq!(
            expand_template("https://example.org/${prefix}/${value}", &parts),
            "https://example.org/12345/x5"
        );
        let scheme_only = split_identifier("ark:x").unwrap();
        assert_eq!(
            expand_template("/.info/${pid}${value}", &scheme_only),
            "/.info/ark:x"
        );
    }
}

//! Canonicalization helpers for resource names and references

use crate::field::{canonical_desired, canonical_new};

/// Strip any scheme, host and API version in front of a relative resource name.
///
/// `https://privateca.googleapis.com/v1/projects/p/...` and
/// `//cloudkms.googleapis.com/projects/p/...` both become `projects/p/...`.
pub fn relative_name(s: &str) -> &str {
    match s.find("projects/") {
        Some(idx) => &s[idx..],
        None => s,
    }
}

/// Last path segment of a resource name
pub fn short_name(s: &str) -> &str {
    let trimmed = s.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Whether two references name the same resource.
///
/// Full names must match after prefix stripping; a short name matches any
/// full name ending in it.
pub fn names_equivalent(a: &str, b: &str) -> bool {
    let (a, b) = (relative_name(a), relative_name(b));
    if a == b {
        return true;
    }
    (!a.contains('/') || !b.contains('/')) && short_name(a) == short_name(b)
}

/// Canonicalize a desired resource reference; an equivalent observed
/// reference wins so that format differences never show up as diffs.
pub fn canonical_reference_desired(
    desired: &Option<String>,
    initial: &Option<String>,
) -> Option<String> {
    match (desired, initial) {
        (Some(d), Some(i)) if names_equivalent(d, i) => Some(i.clone()),
        _ => canonical_desired(desired, initial),
    }
}

/// Canonicalize a freshly read resource reference; an equivalent desired
/// reference wins.
pub fn canonical_reference_new(new: &Option<String>, desired: &Option<String>) -> Option<String> {
    match (new, desired) {
        (Some(n), Some(d)) if names_equivalent(n, d) => Some(d.clone()),
        _ => canonical_new(new, desired),
    }
}

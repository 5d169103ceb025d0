//! Package identifier format.
//!
//! A package id is a globally unique, case-insensitive name such as
//! `ludeon.rimworld` or `author.some.mod`: dot-separated segments of ASCII
//! letters and digits.

/// Longest package id the host accepts.
pub const MAX_LEN: usize = 60;

/// Whether `id` is a well-formed package id.
///
/// Requires at least two non-empty segments. Letters are compared in their
/// lowercase form, so `Author.Mod` is accepted and normalizes to `author.mod`.
pub fn is_valid(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_LEN {
        return false;
    }
    let mut segments = 0;
    for segment in id.split('.') {
        if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        segments += 1;
    }
    segments >= 2
}

/// Canonical (lowercase) form used for lookups and comparisons.
pub fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

//! Location normalization.
//!
//! ARM accepts display names (`West Europe`) and returns canonical names
//! (`westeurope`); both forms name the same region.

/// Lowercase and strip spaces: `West Europe` becomes `westeurope`
#[must_use]
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

/// Diff-suppression predicate for the `location` attribute
#[must_use]
pub fn locations_equal(old: &str, new: &str) -> bool {
    normalize_location(old) == normalize_location(new)
}

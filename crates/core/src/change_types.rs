//! Change type vocabulary: seed names, slug rules, and name validation.

use std::sync::LazyLock;

use regex::Regex;

/// Slugs are lowercase words joined by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// Maximum length of a change type name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Change types installed by the initial migration, as `(name, slug)`.
pub const SEED_CHANGE_TYPES: &[(&str, &str)] = &[
    ("Addition", "addition"),
    ("Correction", "correction"),
    ("Deletion", "deletion"),
    ("Update", "update"),
];

/// Derive a URL slug from a display name.
///
/// Non-alphanumeric runs collapse to a single hyphen; leading and trailing
/// hyphens are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Validate a change type name: non-blank, bounded, no surrounding space.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Change type name cannot be empty".to_string());
    }
    if name.trim() != name {
        return Err("Change type name cannot start or end with whitespace".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Change type name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(format!(
            "Invalid slug '{slug}': use lowercase letters, digits and single hyphens"
        ))
    }
}

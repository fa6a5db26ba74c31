//! Change log constants and validation functions.
//!
//! Covers description rules, the polymorphic link invariant, feed count
//! clamping, date drill-down filters, and the admin field grouping.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of characters kept by [`short_description`].
pub const SHORT_DESCRIPTION_LENGTH: usize = 50;

/// Maximum length of a change description in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Feed size used when the caller does not pass a count.
pub const DEFAULT_FEED_COUNT: i64 = 5;

/// Upper bound on any feed request.
pub const MAX_FEED_COUNT: i64 = 100;

/// Placeholder label for the "no selection" dropdown entry.
pub const EMPTY_CHOICE_LABEL: &str = "---------";

// ---------------------------------------------------------------------------
// Admin field grouping
// ---------------------------------------------------------------------------

/// A named group of fields on the change edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fieldset {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Field grouping used by the admin editing surface.
pub const CHANGE_FIELDSETS: &[Fieldset] = &[
    Fieldset {
        name: "Editorial",
        fields: &["pub_date", "change_type", "description"],
    },
    Fieldset {
        name: "Meta",
        fields: &["user_id", "site_id", "content_app", "content_type_id", "object_id"],
    },
    Fieldset {
        name: "Publishing",
        fields: &["is_public"],
    },
];

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// First [`SHORT_DESCRIPTION_LENGTH`] characters of a description.
pub fn short_description(description: &str) -> String {
    description.chars().take(SHORT_DESCRIPTION_LENGTH).collect()
}

/// One-line label for a change: `"<pub_date>: <short description>..."`.
pub fn display_label(pub_date: Timestamp, description: &str) -> String {
    format!(
        "{}: {}...",
        pub_date.format("%Y-%m-%d %H:%M:%S"),
        short_description(description)
    )
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate change description: non-blank and within the length limit.
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("Change description cannot be empty".to_string());
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "Change description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate the polymorphic link: a record id needs a model kind, and record
/// ids are positive. A model kind on its own is a whole-model link.
pub fn validate_link(content_type_id: Option<DbId>, object_id: Option<DbId>) -> Result<(), String> {
    match (content_type_id, object_id) {
        (None, Some(_)) => Err("object_id requires content_type_id to be set".to_string()),
        (_, Some(id)) if id <= 0 => Err(format!("object_id must be positive, got {id}")),
        _ => Ok(()),
    }
}

/// Validate an admin `year`/`month` drill-down. A month needs a year.
pub fn validate_date_drilldown(year: Option<i32>, month: Option<u32>) -> Result<(), String> {
    if month.is_some() && year.is_none() {
        return Err("month filter requires a year".to_string());
    }
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(format!("month must be between 1 and 12, got {m}"));
        }
    }
    Ok(())
}

/// Clamp a requested feed size to `0..=MAX_FEED_COUNT`. Zero or a negative
/// count asks for nothing.
pub fn clamp_feed_count(count: Option<i64>) -> i64 {
    count.unwrap_or(DEFAULT_FEED_COUNT).clamp(0, MAX_FEED_COUNT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

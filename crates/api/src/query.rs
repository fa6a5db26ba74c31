//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Feed size parameter (`?count=`). Clamped by
/// [`correx_core::changes::clamp_feed_count`].
#[derive(Debug, Default, Deserialize)]
pub struct CountParams {
    pub count: Option<i64>,
}

/// Query parameters for the admin dependent-dropdown filter.
#[derive(Debug, Deserialize)]
pub struct AppLabelParams {
    pub app_label: Option<String>,
}

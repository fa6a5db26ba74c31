//! Change model and DTOs.

use correx_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `changes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Change {
    pub id: DbId,
    pub description: String,
    /// Name of the owning change type.
    pub change_type: String,
    pub pub_date: Timestamp,
    pub is_public: bool,
    pub user_id: Option<DbId>,
    pub site_id: Option<DbId>,
    pub content_app: Option<String>,
    pub content_type_id: Option<DbId>,
    pub object_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for logging a new change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateChange {
    pub description: String,
    pub change_type: String,
    /// Defaults to the insert time.
    pub pub_date: Option<Timestamp>,
    /// Defaults to `false`: new changes stay off the live site until published.
    pub is_public: Option<bool>,
    pub user_id: Option<DbId>,
    pub site_id: Option<DbId>,
    pub content_app: Option<String>,
    pub content_type_id: Option<DbId>,
    pub object_id: Option<DbId>,
}

/// DTO for partially updating a change.
///
/// Every field is patched: an omitted field keeps the stored value. The
/// nullable links use `Option<Option<T>>` so an explicit `null` clears the
/// link (`Some(None)`) while an omitted key leaves it alone (`None`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChange {
    pub description: Option<String>,
    pub change_type: Option<String>,
    pub pub_date: Option<Timestamp>,
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub user_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "present")]
    pub site_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "present")]
    pub content_app: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub content_type_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "present")]
    pub object_id: Option<Option<DbId>>,
}

impl UpdateChange {
    /// The links this update leaves on `current`, as
    /// `(content_app, content_type_id, object_id)`.
    pub fn merged_links(&self, current: &Change) -> (Option<String>, Option<DbId>, Option<DbId>) {
        (
            self.content_app
                .clone()
                .unwrap_or_else(|| current.content_app.clone()),
            self.content_type_id.unwrap_or(current.content_type_id),
            self.object_id.unwrap_or(current.object_id),
        )
    }
}

/// Marks a key that is present in the payload, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Admin list filters (`GET /admin/changes`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeListParams {
    pub change_type: Option<String>,
    pub site_id: Option<DbId>,
    pub content_app: Option<String>,
    pub is_public: Option<bool>,
    /// Case-insensitive substring search over the description, change type,
    /// username, site and linked model name.
    pub q: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

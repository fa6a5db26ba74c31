//! Change type model and DTOs.

use correx_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `change_types` table. `name` is the primary key.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ChangeType {
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Number of public changes of this type. Maintained by the change write
    /// path; never set directly.
    pub change_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a change type. The slug is derived from the name when
/// omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChangeType {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// DTO for editing a change type. The name is its identity and cannot change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChangeType {
    pub slug: Option<String>,
    pub description: Option<String>,
}

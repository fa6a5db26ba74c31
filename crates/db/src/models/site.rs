//! Site reference model.

use correx_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sites` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Site {
    pub id: DbId,
    pub domain: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a site.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSite {
    pub domain: String,
    pub name: String,
}

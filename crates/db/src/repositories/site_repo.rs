//! Repository for the `sites` table.

use correx_core::types::DbId;
use sqlx::PgPool;

use crate::models::site::{CreateSite, Site};

/// Column list for sites queries.
const COLUMNS: &str = "id, domain, name, created_at, updated_at";

/// Provides lookups and registration for sites.
pub struct SiteRepo;

impl SiteRepo {
    /// Register a site, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSite) -> Result<Site, sqlx::Error> {
        let query = format!(
            "INSERT INTO sites (domain, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(&input.domain)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a site by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

//! Repository for the `change_types` table.
//!
//! Besides CRUD, owns the published-change counter: [`ChangeTypeRepo::recount`]
//! overwrites one type's `change_count` from the `changes` table and
//! [`ChangeTypeRepo::recount_all`] does so for every type.

use sqlx::PgPool;

use crate::models::change_type::{ChangeType, UpdateChangeType};

/// Column list for change_types queries.
const COLUMNS: &str = "name, slug, description, change_count, created_at, updated_at";

/// Provides CRUD and counter maintenance for change types.
pub struct ChangeTypeRepo;

impl ChangeTypeRepo {
    /// List all change types, ordered by name ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<ChangeType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM change_types ORDER BY name ASC");
        sqlx::query_as::<_, ChangeType>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a change type by name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<ChangeType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM change_types WHERE name = $1");
        sqlx::query_as::<_, ChangeType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Create a change type with a zero counter, returning the created row.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<ChangeType, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_types (name, slug, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeType>(&query)
            .bind(name)
            .bind(slug)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// Update a change type's slug and/or description.
    ///
    /// Returns `None` if no type with the given name exists.
    pub async fn update(
        pool: &PgPool,
        name: &str,
        input: &UpdateChangeType,
    ) -> Result<Option<ChangeType>, sqlx::Error> {
        let query = format!(
            "UPDATE change_types SET \
                 slug = COALESCE($2, slug), \
                 description = COALESCE($3, description) \
             WHERE name = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeType>(&query)
            .bind(name)
            .bind(&input.slug)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a change type. Returns `true` if a row was deleted.
    ///
    /// Fails with `fk_changes_change_type` while any change still uses it.
    pub async fn delete(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM change_types WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of changes (public or not) that reference the type.
    pub async fn usage_count(pool: &PgPool, name: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM changes WHERE change_type = $1")
            .bind(name)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Counter maintenance
    // -----------------------------------------------------------------------

    /// Recompute and store the published-change count of one type.
    ///
    /// The stored value is overwritten unconditionally, so running this twice
    /// without intervening writes leaves the same value. Returns `None` if the
    /// type does not exist.
    pub async fn recount(pool: &PgPool, name: &str) -> Result<Option<ChangeType>, sqlx::Error> {
        let query = format!(
            "UPDATE change_types SET change_count = ( \
                 SELECT COUNT(*) FROM changes c \
                 WHERE c.change_type = change_types.name AND c.is_public \
             ) \
             WHERE name = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Recompute the counter of every change type.
    ///
    /// Called by the change write path after each create, update and delete.
    pub async fn recount_all(pool: &PgPool) -> Result<Vec<ChangeType>, sqlx::Error> {
        let mut recounted = Vec::new();
        for change_type in Self::list(pool).await? {
            if let Some(updated) = Self::recount(pool, &change_type.name).await? {
                recounted.push(updated);
            }
        }
        tracing::debug!(types = recounted.len(), "Recounted change types");
        Ok(recounted)
    }
}

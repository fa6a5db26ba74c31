//! Repository for the `content_types` table.

use correx_core::content_types::ContentTypeRegistry;
use correx_core::types::DbId;
use sqlx::PgPool;

use crate::models::content_type::ContentType;

/// Column list for content_types queries.
const COLUMNS: &str = "id, app_label, model, created_at, updated_at";

/// Provides lookups for persisted model kinds.
pub struct ContentTypeRepo;

impl ContentTypeRepo {
    /// Insert a row for every kind in the registry that does not have one
    /// yet, then return all rows. Existing ids are never reassigned.
    pub async fn sync(
        pool: &PgPool,
        registry: &ContentTypeRegistry,
    ) -> Result<Vec<ContentType>, sqlx::Error> {
        let mut inserted = 0u64;
        for (app_label, kind) in registry.iter() {
            let result = sqlx::query(
                "INSERT INTO content_types (app_label, model) VALUES ($1, $2) \
                 ON CONFLICT (app_label, model) DO NOTHING",
            )
            .bind(app_label)
            .bind(&kind.model)
            .execute(pool)
            .await?;
            inserted += result.rows_affected();
        }
        if inserted > 0 {
            tracing::info!(inserted, "Registered new content types");
        }
        Self::list_all(pool).await
    }

    /// List every content type, ordered by app label then model.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ContentType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_types ORDER BY app_label, model");
        sqlx::query_as::<_, ContentType>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the content types registered under one application, by model name.
    pub async fn list_by_app(
        pool: &PgPool,
        app_label: &str,
    ) -> Result<Vec<ContentType>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_types WHERE app_label = $1 ORDER BY model"
        );
        sqlx::query_as::<_, ContentType>(&query)
            .bind(app_label)
            .fetch_all(pool)
            .await
    }

    /// Find a content type by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContentType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_types WHERE id = $1");
        sqlx::query_as::<_, ContentType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a content type by `(app_label, model)`. The model is matched
    /// case-insensitively.
    pub async fn find_by_natural_key(
        pool: &PgPool,
        app_label: &str,
        model: &str,
    ) -> Result<Option<ContentType>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_types WHERE app_label = $1 AND model = LOWER($2)"
        );
        sqlx::query_as::<_, ContentType>(&query)
            .bind(app_label)
            .bind(model)
            .fetch_optional(pool)
            .await
    }
}

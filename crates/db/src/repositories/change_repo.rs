//! Repository for the `changes` table.
//!
//! Every write (create, update, delete) finishes by recounting all change
//! types via [`ChangeTypeRepo::recount_all`]. The write itself is already
//! committed at that point, so a recount error reaches the caller while the
//! change stays persisted and the counters lag until the next write.
//!
//! The `list_live*` readers back the change feeds: public rows only, newest
//! `pub_date` first.

use correx_core::types::DbId;
use sqlx::PgPool;

use crate::models::change::{Change, ChangeListParams, CreateChange, UpdateChange};
use crate::repositories::ChangeTypeRepo;

/// Column list for changes queries.
const COLUMNS: &str = "\
    id, description, change_type, pub_date, is_public, user_id, site_id, \
    content_app, content_type_id, object_id, created_at, updated_at";

/// Column list qualified for the joined admin listing.
const LIST_COLUMNS: &str = "\
    c.id, c.description, c.change_type, c.pub_date, c.is_public, c.user_id, c.site_id, \
    c.content_app, c.content_type_id, c.object_id, c.created_at, c.updated_at";

/// Ordering shared by every listing; `id` breaks ties on equal dates.
const ORDER_NEWEST_FIRST: &str = "ORDER BY pub_date DESC, id DESC";

/// Default page size for the admin listing.
const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for the admin listing.
const MAX_LIMIT: i64 = 500;

/// Provides CRUD and feed queries for changes.
pub struct ChangeRepo;

impl ChangeRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a change, then recount every change type.
    pub async fn create(pool: &PgPool, input: &CreateChange) -> Result<Change, sqlx::Error> {
        let query = format!(
            "INSERT INTO changes ( \
                 description, change_type, pub_date, is_public, user_id, site_id, \
                 content_app, content_type_id, object_id \
             ) VALUES ($1, $2, COALESCE($3, NOW()), COALESCE($4, FALSE), $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let change = sqlx::query_as::<_, Change>(&query)
            .bind(&input.description)
            .bind(&input.change_type)
            .bind(input.pub_date)
            .bind(input.is_public)
            .bind(input.user_id)
            .bind(input.site_id)
            .bind(&input.content_app)
            .bind(input.content_type_id)
            .bind(input.object_id)
            .fetch_one(pool)
            .await?;

        ChangeTypeRepo::recount_all(pool).await?;
        Ok(change)
    }

    /// Partially update a change, then recount every change type.
    ///
    /// Scalar fields use `COALESCE`. Each link is replaced only when its key
    /// was supplied (`Some`), which may clear it (`Some(None)`).
    ///
    /// Returns `None` (and skips the recount) if no change has the given ID.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChange,
    ) -> Result<Option<Change>, sqlx::Error> {
        let query = format!(
            "UPDATE changes SET \
                 description     = COALESCE($2, description), \
                 change_type     = COALESCE($3, change_type), \
                 pub_date        = COALESCE($4, pub_date), \
                 is_public       = COALESCE($5, is_public), \
                 user_id         = CASE WHEN $6 THEN $7 ELSE user_id END, \
                 site_id         = CASE WHEN $8 THEN $9 ELSE site_id END, \
                 content_app     = CASE WHEN $10 THEN $11 ELSE content_app END, \
                 content_type_id = CASE WHEN $12 THEN $13 ELSE content_type_id END, \
                 object_id       = CASE WHEN $14 THEN $15 ELSE object_id END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let change = sqlx::query_as::<_, Change>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(&input.change_type)
            .bind(input.pub_date)
            .bind(input.is_public)
            .bind(input.user_id.is_some())
            .bind(input.user_id.flatten())
            .bind(input.site_id.is_some())
            .bind(input.site_id.flatten())
            .bind(input.content_app.is_some())
            .bind(input.content_app.as_ref().and_then(|v| v.as_deref()))
            .bind(input.content_type_id.is_some())
            .bind(input.content_type_id.flatten())
            .bind(input.object_id.is_some())
            .bind(input.object_id.flatten())
            .fetch_optional(pool)
            .await?;

        if change.is_some() {
            ChangeTypeRepo::recount_all(pool).await?;
        }
        Ok(change)
    }

    /// Delete a change, then recount every change type.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM changes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        let deleted = result.rows_affected() > 0;

        if deleted {
            ChangeTypeRepo::recount_all(pool).await?;
        }
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Admin reads
    // -----------------------------------------------------------------------

    /// Find a change by its ID, public or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Change>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM changes WHERE id = $1");
        sqlx::query_as::<_, Change>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Admin listing with optional filters, search, date drill-down and
    /// pagination. Includes unpublished changes.
    ///
    /// `q` matches the description, the change type name, the username, the
    /// site name or domain, and the linked model name.
    pub async fn list(pool: &PgPool, params: &ChangeListParams) -> Result<Vec<Change>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if params.change_type.is_some() {
            conditions.push(format!("c.change_type = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.site_id.is_some() {
            conditions.push(format!("c.site_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.content_app.is_some() {
            conditions.push(format!("c.content_app = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.is_public.is_some() {
            conditions.push(format!("c.is_public = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.q.is_some() {
            conditions.push(format!(
                "(c.description ILIKE ${bind_idx} \
                  OR c.change_type ILIKE ${bind_idx} \
                  OR u.username ILIKE ${bind_idx} \
                  OR s.name ILIKE ${bind_idx} \
                  OR s.domain ILIKE ${bind_idx} \
                  OR ct.model ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if params.year.is_some() {
            conditions.push(format!(
                "EXTRACT(YEAR FROM c.pub_date AT TIME ZONE 'UTC')::int = ${bind_idx}"
            ));
            bind_idx += 1;
        }
        if params.month.is_some() {
            conditions.push(format!(
                "EXTRACT(MONTH FROM c.pub_date AT TIME ZONE 'UTC')::int = ${bind_idx}"
            ));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {LIST_COLUMNS} FROM changes c \
             LEFT JOIN users u ON u.id = c.user_id \
             LEFT JOIN sites s ON s.id = c.site_id \
             LEFT JOIN content_types ct ON ct.id = c.content_type_id \
             {where_clause} \
             ORDER BY c.pub_date DESC, c.id DESC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Change>(&query);

        // Bind dynamic parameters in order.
        if let Some(ref change_type) = params.change_type {
            q = q.bind(change_type);
        }
        if let Some(site_id) = params.site_id {
            q = q.bind(site_id);
        }
        if let Some(ref content_app) = params.content_app {
            q = q.bind(content_app);
        }
        if let Some(is_public) = params.is_public {
            q = q.bind(is_public);
        }
        if let Some(ref search) = params.q {
            q = q.bind(format!("%{}%", escape_like(search)));
        }
        if let Some(year) = params.year {
            q = q.bind(year);
        }
        if let Some(month) = params.month {
            q = q.bind(month as i32);
        }

        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    // -----------------------------------------------------------------------
    // Live feeds (public changes only)
    // -----------------------------------------------------------------------

    /// The `limit` most recent public changes.
    pub async fn list_live(pool: &PgPool, limit: i64) -> Result<Vec<Change>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changes WHERE is_public \
             {ORDER_NEWEST_FIRST} LIMIT $1"
        );
        sqlx::query_as::<_, Change>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recent public changes credited to a user.
    pub async fn list_live_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Change>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changes WHERE is_public AND user_id = $1 \
             {ORDER_NEWEST_FIRST} LIMIT $2"
        );
        sqlx::query_as::<_, Change>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recent public changes linked to a site.
    pub async fn list_live_by_site(
        pool: &PgPool,
        site_id: DbId,
        limit: i64,
    ) -> Result<Vec<Change>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changes WHERE is_public AND site_id = $1 \
             {ORDER_NEWEST_FIRST} LIMIT $2"
        );
        sqlx::query_as::<_, Change>(&query)
            .bind(site_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recent public changes whose `content_app` equals
    /// `app_label`.
    pub async fn list_live_by_app(
        pool: &PgPool,
        app_label: &str,
        limit: i64,
    ) -> Result<Vec<Change>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changes WHERE is_public AND content_app = $1 \
             {ORDER_NEWEST_FIRST} LIMIT $2"
        );
        sqlx::query_as::<_, Change>(&query)
            .bind(app_label)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recent public changes linked to a model kind, at
    /// whole-model or single-record granularity.
    pub async fn list_live_by_content_type(
        pool: &PgPool,
        content_type_id: DbId,
        limit: i64,
    ) -> Result<Vec<Change>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changes WHERE is_public AND content_type_id = $1 \
             {ORDER_NEWEST_FIRST} LIMIT $2"
        );
        sqlx::query_as::<_, Change>(&query)
            .bind(content_type_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every public change linked to one record.
    pub async fn list_live_by_object(
        pool: &PgPool,
        content_type_id: DbId,
        object_id: DbId,
    ) -> Result<Vec<Change>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changes \
             WHERE is_public AND content_type_id = $1 AND object_id = $2 \
             {ORDER_NEWEST_FIRST}"
        );
        sqlx::query_as::<_, Change>(&query)
            .bind(content_type_id)
            .bind(object_id)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Escape `ILIKE` wildcards so search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}

//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for users queries.
const COLUMNS: &str = "\
    id, username, first_name, last_name, email, is_staff, is_active, \
    created_at, updated_at";

/// Provides lookups and registration for users.
pub struct UserRepo;

impl UserRepo {
    /// Register a user, returning the created row.
    ///
    /// Fails with a `uq_users_username` violation if the username is taken
    /// in any casing.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, first_name, last_name, email, is_staff) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(input.is_staff)
            .fetch_one(pool)
            .await
    }

    /// Find a user by username, ignoring case.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }
}

//! Polymorphic reference resolution.
//!
//! A change may point at any record through `(content_type_id, object_id)`.
//! [`ContentObjectResolver`] turns such a pair into the record itself, using
//! the registry to find the table each kind lives in. Every kind of miss
//! (unset link, unknown kind, kind without a table, deleted record, storage
//! failure) resolves to `None`; missing links are routine and callers render
//! them as "no linked record".

use std::sync::Arc;

use correx_core::content_types::ContentTypeRegistry;
use correx_core::types::DbId;
use serde::Serialize;
use sqlx::PgPool;

use crate::models::change::Change;
use crate::models::content_type::ContentType;
use crate::repositories::ContentTypeRepo;

/// A record loaded through a polymorphic reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentObject {
    pub content_type: ContentType,
    pub object_id: DbId,
    /// Value of the kind's label column, or `"<model> #<id>"`.
    pub label: String,
    /// The full row as JSON.
    pub data: serde_json::Value,
}

/// Loads records referenced by `(content_type_id, object_id)` pairs.
#[derive(Debug, Clone)]
pub struct ContentObjectResolver {
    registry: Arc<ContentTypeRegistry>,
}

impl ContentObjectResolver {
    pub fn new(registry: Arc<ContentTypeRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve the record a change links to, if any.
    pub async fn resolve_change(&self, pool: &PgPool, change: &Change) -> Option<ContentObject> {
        self.resolve(pool, change.content_type_id, change.object_id)
            .await
    }

    /// Resolve a `(content_type_id, object_id)` pair to its record.
    pub async fn resolve(
        &self,
        pool: &PgPool,
        content_type_id: Option<DbId>,
        object_id: Option<DbId>,
    ) -> Option<ContentObject> {
        let (Some(content_type_id), Some(object_id)) = (content_type_id, object_id) else {
            return None;
        };

        let content_type = match ContentTypeRepo::find_by_id(pool, content_type_id).await {
            Ok(Some(ct)) => ct,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, content_type_id, "Content type lookup failed");
                return None;
            }
        };

        let kind = self
            .registry
            .find(&content_type.app_label, &content_type.model)?;
        let table = kind.table.as_deref()?;

        // `table` passed registry identifier validation, so it is safe to inline.
        let query = format!("SELECT to_jsonb(t) FROM {table} t WHERE t.id = $1");
        let data = match sqlx::query_scalar::<_, serde_json::Value>(&query)
            .bind(object_id)
            .fetch_optional(pool)
            .await
        {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    content_type = %content_type.natural_key(),
                    object_id,
                    "Linked record lookup failed"
                );
                return None;
            }
        };

        let label = kind
            .label_column
            .as_deref()
            .and_then(|column| data.get(column))
            .and_then(label_from_json)
            .unwrap_or_else(|| format!("{} #{object_id}", content_type.model));

        Some(ContentObject {
            content_type,
            object_id,
            label,
            data,
        })
    }
}

/// Render a JSON scalar as a label. Objects, arrays and nulls give `None`.
fn label_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

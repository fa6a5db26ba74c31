//! Query façade: typed read operations that page templates and the public
//! feed endpoints use to embed lists of published changes.
//!
//! Every operation returns public changes only, newest `pub_date` first,
//! truncated to the requested count (clamped to `0..=MAX_FEED_COUNT`; zero
//! returns nothing).
//! A filter target that does not exist is an error, never an empty list,
//! so a misspelled username or site id surfaces where the page is built.

use std::sync::Arc;

use correx_core::changes::MAX_FEED_COUNT;
use correx_core::content_types::{ContentTypeRegistry, Linkable, ObjectRef};
use correx_core::error::CoreError;
use correx_core::types::DbId;
use correx_db::models::change::Change;
use correx_db::models::content_type::ContentType;
use correx_db::repositories::{ChangeRepo, ContentTypeRepo, SiteRepo, UserRepo};
use correx_db::DbPool;

use crate::error::AppResult;

/// Read-only access to published changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    pool: DbPool,
    registry: Arc<ContentTypeRegistry>,
}

impl ChangeFeed {
    pub fn new(pool: DbPool, registry: Arc<ContentTypeRegistry>) -> Self {
        Self { pool, registry }
    }

    /// The most recent changes, regardless of what they link to.
    pub async fn latest(&self, count: i64) -> AppResult<Vec<Change>> {
        Ok(ChangeRepo::list_live(&self.pool, clamp(count)).await?)
    }

    /// The most recent changes credited to `username` (matched ignoring case).
    pub async fn for_user(&self, username: &str, count: i64) -> AppResult<Vec<Change>> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| CoreError::UnknownReference {
                entity: "User",
                key: username.to_string(),
            })?;
        Ok(ChangeRepo::list_live_by_user(&self.pool, user.id, clamp(count)).await?)
    }

    /// The most recent changes linked to a site.
    pub async fn for_site(&self, site_id: DbId, count: i64) -> AppResult<Vec<Change>> {
        let site = SiteRepo::find_by_id(&self.pool, site_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Site",
                id: site_id,
            })?;
        Ok(ChangeRepo::list_live_by_site(&self.pool, site.id, clamp(count)).await?)
    }

    /// The most recent changes whose application label is exactly `app_label`.
    pub async fn for_app(&self, app_label: &str, count: i64) -> AppResult<Vec<Change>> {
        Ok(ChangeRepo::list_live_by_app(&self.pool, app_label, clamp(count)).await?)
    }

    /// The most recent changes linked to a model kind given as `app.Model`,
    /// including changes linked to single records of that kind.
    pub async fn for_model(&self, reference: &str, count: i64) -> AppResult<Vec<Change>> {
        let (app_label, kind) = self.registry.resolve_reference(reference)?;
        let content_type = self.persisted_kind(app_label, &kind.model, reference).await?;
        Ok(
            ChangeRepo::list_live_by_content_type(&self.pool, content_type.id, clamp(count))
                .await?,
        )
    }

    /// Every published change linked to one record.
    pub async fn for_object<T: Linkable>(&self, object: &T) -> AppResult<Vec<Change>> {
        self.for_object_ref(&object.object_ref()).await
    }

    /// Every published change linked to the record `object` points at.
    pub async fn for_object_ref(&self, object: &ObjectRef) -> AppResult<Vec<Change>> {
        let reference = format!("{}.{}", object.app_label, object.model);
        let kind = self
            .registry
            .find(&object.app_label, &object.model)
            .ok_or_else(|| CoreError::UnknownReference {
                entity: "Model",
                key: reference.clone(),
            })?;
        let content_type = self
            .persisted_kind(&object.app_label, &kind.model, &reference)
            .await?;
        Ok(ChangeRepo::list_live_by_object(&self.pool, content_type.id, object.object_id).await?)
    }

    /// The `content_types` row for a registered kind. Missing only when the
    /// registry changed without a sync.
    async fn persisted_kind(
        &self,
        app_label: &str,
        model: &str,
        reference: &str,
    ) -> AppResult<ContentType> {
        ContentTypeRepo::find_by_natural_key(&self.pool, app_label, model)
            .await?
            .ok_or_else(|| {
                CoreError::UnknownReference {
                    entity: "Model",
                    key: reference.to_string(),
                }
                .into()
            })
    }
}

fn clamp(count: i64) -> i64 {
    count.clamp(0, MAX_FEED_COUNT)
}

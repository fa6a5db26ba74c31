//! Admin handlers for the change log.
//!
//! Provides list (with filters, search and date drill-down), create, get,
//! update and delete, plus the form field grouping. Every write goes through
//! [`ChangeRepo`], which recounts the change type counters after persisting.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use correx_core::changes::{
    display_label, short_description, validate_date_drilldown, validate_description,
    validate_link, CHANGE_FIELDSETS,
};
use correx_core::error::CoreError;
use correx_core::types::DbId;
use correx_db::models::change::{Change, ChangeListParams, CreateChange, UpdateChange};
use correx_db::repositories::{ChangeRepo, ChangeTypeRepo, ContentTypeRepo};
use correx_db::resolver::ContentObject;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// One row of the admin change list.
#[derive(Debug, Serialize)]
pub struct ChangeListItem {
    #[serde(flatten)]
    pub change: Change,
    pub short_description: String,
    /// Label of the linked record, `None` when unlinked or since deleted.
    pub record: Option<String>,
}

/// A single change with its linked record resolved.
#[derive(Debug, Serialize)]
pub struct ChangeDetail {
    #[serde(flatten)]
    pub change: Change,
    pub display_label: String,
    pub record: Option<ContentObject>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/changes?change_type=&site_id=&content_app=&is_public=&q=&year=&month=&limit=&offset=
pub async fn list_changes(
    State(state): State<AppState>,
    Query(params): Query<ChangeListParams>,
) -> AppResult<impl IntoResponse> {
    validate_date_drilldown(params.year, params.month).map_err(AppError::BadRequest)?;

    let changes = ChangeRepo::list(&state.pool, &params).await?;

    let resolver = state.resolver();
    let mut items = Vec::with_capacity(changes.len());
    for change in changes {
        let record = resolver
            .resolve_change(&state.pool, &change)
            .await
            .map(|object| object.label);
        items.push(ChangeListItem {
            short_description: short_description(&change.description),
            record,
            change,
        });
    }

    Ok(Json(DataResponse { data: items }))
}

/// POST /admin/changes
pub async fn create_change(
    State(state): State<AppState>,
    Json(input): Json<CreateChange>,
) -> AppResult<impl IntoResponse> {
    validate_description(&input.description).map_err(AppError::BadRequest)?;
    validate_change_type(&state, &input.change_type).await?;
    validate_meta(
        &state,
        input.content_app.as_deref(),
        input.content_type_id,
        input.object_id,
    )
    .await?;

    let change = ChangeRepo::create(&state.pool, &input).await?;

    tracing::info!(
        change_id = change.id,
        change_type = %change.change_type,
        is_public = change.is_public,
        "Change logged"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: change })))
}

/// GET /admin/changes/{id}
pub async fn get_change(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let change = ChangeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Change",
            id,
        })?;

    let record = state.resolver().resolve_change(&state.pool, &change).await;

    Ok(Json(DataResponse {
        data: ChangeDetail {
            display_label: display_label(change.pub_date, &change.description),
            record,
            change,
        },
    }))
}

/// PUT /admin/changes/{id}
///
/// Omitted fields keep their stored value; `null` clears a link.
pub async fn update_change(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChange>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref description) = input.description {
        validate_description(description).map_err(AppError::BadRequest)?;
    }
    if let Some(ref change_type) = input.change_type {
        validate_change_type(&state, change_type).await?;
    }

    let current = ChangeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Change",
            id,
        })?;
    let (content_app, content_type_id, object_id) = input.merged_links(&current);
    validate_meta(&state, content_app.as_deref(), content_type_id, object_id).await?;

    let change = ChangeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Change",
            id,
        })?;

    tracing::info!(
        change_id = change.id,
        is_public = change.is_public,
        "Change updated"
    );

    Ok(Json(DataResponse { data: change }))
}

/// DELETE /admin/changes/{id}
pub async fn delete_change(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ChangeRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "Change",
            id,
        }
        .into());
    }

    tracing::info!(change_id = id, "Change deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/changes/fieldsets
pub async fn change_fieldsets() -> impl IntoResponse {
    Json(DataResponse {
        data: CHANGE_FIELDSETS,
    })
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// The change type must already exist.
async fn validate_change_type(state: &AppState, name: &str) -> AppResult<()> {
    if ChangeTypeRepo::find_by_name(&state.pool, name)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!("Unknown change type '{name}'")));
    }
    Ok(())
}

/// Check the meta link group: a registered application, an existing content
/// type, and a record id only alongside a content type.
async fn validate_meta(
    state: &AppState,
    content_app: Option<&str>,
    content_type_id: Option<DbId>,
    object_id: Option<DbId>,
) -> AppResult<()> {
    validate_link(content_type_id, object_id).map_err(AppError::BadRequest)?;

    if let Some(app) = content_app {
        if !state.registry.has_app(app) {
            return Err(AppError::BadRequest(format!(
                "Unknown application '{app}'. Must be one of: {}",
                state.registry.app_labels().join(", ")
            )));
        }
    }

    if let Some(ct_id) = content_type_id {
        if ContentTypeRepo::find_by_id(&state.pool, ct_id)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Unknown content type id {ct_id}"
            )));
        }
    }

    Ok(())
}

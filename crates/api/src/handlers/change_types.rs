//! Admin handlers for the change type vocabulary.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use correx_core::change_types::{slugify, validate_name, validate_slug};
use correx_core::error::CoreError;
use correx_db::models::change_type::{CreateChangeType, UpdateChangeType};
use correx_db::repositories::ChangeTypeRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /admin/change-types
///
/// List all change types with their published-change counts, by name.
pub async fn list_change_types(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let change_types = ChangeTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: change_types }))
}

/// POST /admin/change-types
///
/// Create a change type. The slug is derived from the name when omitted.
pub async fn create_change_type(
    State(state): State<AppState>,
    Json(input): Json<CreateChangeType>,
) -> AppResult<impl IntoResponse> {
    validate_name(&input.name).map_err(AppError::BadRequest)?;
    let slug = input.slug.clone().unwrap_or_else(|| slugify(&input.name));
    validate_slug(&slug).map_err(AppError::BadRequest)?;

    if ChangeTypeRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!(
            "Change type '{}' already exists",
            input.name
        ))
        .into());
    }

    let change_type = ChangeTypeRepo::create(
        &state.pool,
        &input.name,
        &slug,
        input.description.as_deref().unwrap_or(""),
    )
    .await?;

    tracing::info!(name = %change_type.name, slug = %change_type.slug, "Change type created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: change_type })))
}

/// GET /admin/change-types/{name}
pub async fn get_change_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let change_type = ChangeTypeRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| CoreError::UnknownReference {
            entity: "Change type",
            key: name.clone(),
        })?;
    Ok(Json(DataResponse { data: change_type }))
}

/// PUT /admin/change-types/{name}
pub async fn update_change_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<UpdateChangeType>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref slug) = input.slug {
        validate_slug(slug).map_err(AppError::BadRequest)?;
    }

    let change_type = ChangeTypeRepo::update(&state.pool, &name, &input)
        .await?
        .ok_or_else(|| CoreError::UnknownReference {
            entity: "Change type",
            key: name.clone(),
        })?;

    tracing::info!(name = %change_type.name, "Change type updated");

    Ok(Json(DataResponse { data: change_type }))
}

/// DELETE /admin/change-types/{name}
///
/// Refused with 409 while any change still uses the type.
pub async fn delete_change_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    let in_use = ChangeTypeRepo::usage_count(&state.pool, &name).await?;
    if in_use > 0 {
        return Err(CoreError::Conflict(format!(
            "Change type '{name}' is used by {in_use} change(s)"
        ))
        .into());
    }

    if !ChangeTypeRepo::delete(&state.pool, &name).await? {
        return Err(CoreError::UnknownReference {
            entity: "Change type",
            key: name,
        }
        .into());
    }

    tracing::info!(%name, "Change type deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/change-types/recount
///
/// Force a recount of every change type counter, e.g. after a failed write
/// left them behind.
pub async fn recount_change_types(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let change_types = ChangeTypeRepo::recount_all(&state.pool).await?;
    tracing::info!(count = change_types.len(), "Change type counters recounted");
    Ok(Json(DataResponse { data: change_types }))
}

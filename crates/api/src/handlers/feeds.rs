//! Handlers for the public change feeds.
//!
//! Thin HTTP wrappers over [`ChangeFeed`](crate::feeds::ChangeFeed): each
//! endpoint returns `{ "data": [...] }` and surfaces unknown users, sites and
//! model references as 404.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use correx_core::changes::clamp_feed_count;
use correx_core::content_types::ObjectRef;
use correx_core::types::DbId;

use crate::error::AppResult;
use crate::query::CountParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /changes/latest?count=
pub async fn latest_changes(
    State(state): State<AppState>,
    Query(params): Query<CountParams>,
) -> AppResult<impl IntoResponse> {
    let changes = state.feed().latest(clamp_feed_count(params.count)).await?;
    Ok(Json(DataResponse { data: changes }))
}

/// GET /changes/by-user/{username}?count=
pub async fn changes_for_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<CountParams>,
) -> AppResult<impl IntoResponse> {
    let changes = state
        .feed()
        .for_user(&username, clamp_feed_count(params.count))
        .await?;
    Ok(Json(DataResponse { data: changes }))
}

/// GET /changes/by-site/{site_id}?count=
pub async fn changes_for_site(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Query(params): Query<CountParams>,
) -> AppResult<impl IntoResponse> {
    let changes = state
        .feed()
        .for_site(site_id, clamp_feed_count(params.count))
        .await?;
    Ok(Json(DataResponse { data: changes }))
}

/// GET /changes/by-app/{app_label}?count=
pub async fn changes_for_app(
    State(state): State<AppState>,
    Path(app_label): Path<String>,
    Query(params): Query<CountParams>,
) -> AppResult<impl IntoResponse> {
    let changes = state
        .feed()
        .for_app(&app_label, clamp_feed_count(params.count))
        .await?;
    Ok(Json(DataResponse { data: changes }))
}

/// GET /changes/by-model/{app.Model}?count=
pub async fn changes_for_model(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(params): Query<CountParams>,
) -> AppResult<impl IntoResponse> {
    let changes = state
        .feed()
        .for_model(&reference, clamp_feed_count(params.count))
        .await?;
    Ok(Json(DataResponse { data: changes }))
}

/// GET /changes/by-object/{app_label}/{model}/{object_id}
///
/// Returns every published change for the record; there is no count.
pub async fn changes_for_object(
    State(state): State<AppState>,
    Path((app_label, model, object_id)): Path<(String, String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let object = ObjectRef {
        app_label,
        model,
        object_id,
    };
    let changes = state.feed().for_object_ref(&object).await?;
    Ok(Json(DataResponse { data: changes }))
}

//! Dependent-dropdown endpoint for the change editing form.
//!
//! When an editor picks an application, the form script asks for that
//! application's model kinds and refills the model select box. The response
//! is a bare JSON array of `{"Text", "Value"}` options starting with the
//! empty choice. Every failure is a bodiless 404; the script treats any
//! non-200 as "leave the box empty".
//!
//! Also serves the application choices the form offers in the first place.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use correx_db::models::content_type::ContentTypeChoice;
use correx_db::repositories::ContentTypeRepo;

use crate::query::AppLabelParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /admin/filter/content-types?app_label=
pub async fn filter_content_types_by_app(
    method: Method,
    State(state): State<AppState>,
    params: Result<Query<AppLabelParams>, QueryRejection>,
) -> Result<Json<Vec<ContentTypeChoice>>, StatusCode> {
    if method != Method::GET {
        return Err(StatusCode::NOT_FOUND);
    }

    let app_label = params
        .ok()
        .and_then(|Query(p)| p.app_label)
        .filter(|label| !label.is_empty())
        .ok_or(StatusCode::NOT_FOUND)?;

    let content_types = ContentTypeRepo::list_by_app(&state.pool, &app_label)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, %app_label, "Content type filter lookup failed");
            StatusCode::NOT_FOUND
        })?;

    let mut choices = Vec::with_capacity(content_types.len() + 1);
    choices.push(ContentTypeChoice::empty());
    choices.extend(content_types.iter().map(ContentTypeChoice::from));

    Ok(Json(choices))
}

/// GET /admin/apps
///
/// Registered application labels, sorted; the choices for `content_app`.
pub async fn list_apps(State(state): State<AppState>) -> impl IntoResponse {
    let apps: Vec<String> = state
        .registry
        .app_labels()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(DataResponse { data: apps })
}

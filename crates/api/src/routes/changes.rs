//! Route definitions for the public change feeds, mounted at `/changes`.

use axum::routing::get;
use axum::Router;

use crate::handlers::feeds;
use crate::state::AppState;

/// Feed routes.
///
/// ```text
/// GET /latest                                  -> latest_changes
/// GET /by-user/{username}                      -> changes_for_user
/// GET /by-site/{site_id}                       -> changes_for_site
/// GET /by-app/{app_label}                      -> changes_for_app
/// GET /by-model/{reference}                    -> changes_for_model
/// GET /by-object/{app_label}/{model}/{id}      -> changes_for_object
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(feeds::latest_changes))
        .route("/by-user/{username}", get(feeds::changes_for_user))
        .route("/by-site/{site_id}", get(feeds::changes_for_site))
        .route("/by-app/{app_label}", get(feeds::changes_for_app))
        .route("/by-model/{reference}", get(feeds::changes_for_model))
        .route(
            "/by-object/{app_label}/{model}/{object_id}",
            get(feeds::changes_for_object),
        )
}

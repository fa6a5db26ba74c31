//! Route definitions for the administrative editing surface, mounted at
//! `/admin`.

use axum::routing::{any, get, post};
use axum::Router;

use crate::handlers::{admin_filter, change_types, changes};
use crate::state::AppState;

/// Admin routes.
///
/// ```text
/// GET    /apps                          -> list_apps
/// ANY    /filter/content-types          -> filter_content_types_by_app (GET only, else 404)
///
/// GET    /change-types                  -> list_change_types
/// POST   /change-types                  -> create_change_type
/// POST   /change-types/recount          -> recount_change_types
/// GET    /change-types/{name}           -> get_change_type
/// PUT    /change-types/{name}           -> update_change_type
/// DELETE /change-types/{name}           -> delete_change_type
///
/// GET    /changes                       -> list_changes
/// POST   /changes                       -> create_change
/// GET    /changes/fieldsets             -> change_fieldsets
/// GET    /changes/{id}                  -> get_change
/// PUT    /changes/{id}                  -> update_change
/// DELETE /changes/{id}                  -> delete_change
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apps", get(admin_filter::list_apps))
        .route(
            "/filter/content-types",
            any(admin_filter::filter_content_types_by_app),
        )
        .route(
            "/change-types",
            get(change_types::list_change_types).post(change_types::create_change_type),
        )
        .route(
            "/change-types/recount",
            post(change_types::recount_change_types),
        )
        .route(
            "/change-types/{name}",
            get(change_types::get_change_type)
                .put(change_types::update_change_type)
                .delete(change_types::delete_change_type),
        )
        .route(
            "/changes",
            get(changes::list_changes).post(changes::create_change),
        )
        .route("/changes/fieldsets", get(changes::change_fieldsets))
        .route(
            "/changes/{id}",
            get(changes::get_change)
                .put(changes::update_change)
                .delete(changes::delete_change),
        )
}

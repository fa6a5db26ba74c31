pub mod admin;
pub mod changes;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /changes/latest                                   latest published changes
/// /changes/by-user/{username}                       by user
/// /changes/by-site/{site_id}                        by site
/// /changes/by-app/{app_label}                       by application
/// /changes/by-model/{app.Model}                     by model kind
/// /changes/by-object/{app_label}/{model}/{id}       by record
///
/// /admin/apps                                       application choices
/// /admin/filter/content-types?app_label=            dependent model dropdown
/// /admin/change-types                               list, create
/// /admin/change-types/recount                       recount counters (POST)
/// /admin/change-types/{name}                        get, update, delete
/// /admin/changes                                    list, create
/// /admin/changes/fieldsets                          form field grouping
/// /admin/changes/{id}                               get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/changes", changes::router())
        .nest("/admin", admin::router())
}

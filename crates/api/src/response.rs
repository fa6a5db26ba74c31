//! Shared response envelope types for API handlers.
//!
//! All JSON API responses use a `{ "data": ... }` envelope, except the admin
//! dropdown filter, whose bare-array shape is consumed directly by the
//! select-box script.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: changes }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

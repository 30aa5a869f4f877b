//! Shared response envelope types for API handlers.
//!
//! Resource responses use a `{ "data": ... }` envelope; action endpoints
//! that only confirm something happened reply with `{ "detail": ... }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: events }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "detail": message }` body for action confirmations.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: &'static str,
}

//! Request handlers, one module per resource.
//!
//! List handlers answer an anonymous caller with 401 and an empty list under the usual key,
//! so clients can render an empty table without special-casing the error body.

pub mod dashboard;
pub mod health;
pub mod incidents;
pub mod indicators;
pub mod logs;
pub mod notifications;
pub mod risks;
pub mod session;
pub mod surveys;
pub mod units;
pub mod users;

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use mutu_core::{MutuError, RecordId};

/// Parses a path id; malformed ids are a 400.
pub(crate) fn record_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>()
        .map_err(|e| ApiError::Core(MutuError::from(e)))
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = body?;
    Ok(value)
}

/// Status for a list response: 200 for a signed-in caller, 401 otherwise.
pub(crate) fn list_status(signed_in: bool) -> StatusCode {
    if signed_in {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

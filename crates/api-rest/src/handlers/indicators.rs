//! Indicator submissions (the indicator definitions per unit) and indicator entries.

use super::{json_body, list_status, record_id};
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{
    ErrorRes, IndicatorRes, IndicatorSubmissionRes, IndicatorSubmissionsRes, IndicatorsRes, OkRes,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::records::indicator::{
    IndicatorPatch, IndicatorSubmission, IndicatorSubmissionPatch, NewIndicator,
    NewIndicatorSubmission,
};
use mutu_core::Actor;

#[utoipa::path(
    get,
    path = "/indicators",
    responses(
        (status = 200, description = "Indicator entries with their submission, latest period first", body = IndicatorsRes),
        (status = 401, description = "Not signed in; empty list", body = IndicatorsRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_indicators(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<IndicatorsRes>), ApiError> {
    let indicators = match &user {
        Some(user) => state.services.indicators.list(&user.scope())?,
        None => Vec::new(),
    };
    Ok((list_status(user.is_some()), Json(IndicatorsRes { indicators })))
}

#[utoipa::path(
    post,
    path = "/indicators",
    request_body = NewIndicator,
    responses(
        (status = 201, description = "Indicator entry recorded", body = IndicatorRes),
        (status = 400, description = "Invalid input or unknown submission", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Record an indicator entry
///
/// `numerator` and `denominator` may be JSON numbers or numeric strings. The response carries
/// the achievement percentage when the denominator is non-zero.
#[axum::debug_handler(state = AppState)]
pub async fn create_indicator(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewIndicator>, JsonRejection>,
) -> Result<(StatusCode, Json<IndicatorRes>), ApiError> {
    let indicator = state
        .services
        .indicators
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(IndicatorRes { indicator })))
}

#[utoipa::path(
    patch,
    path = "/indicators/{id}",
    request_body = IndicatorPatch,
    params(("id" = String, Path, description = "Indicator entry id")),
    responses(
        (status = 200, description = "Indicator entry updated", body = IndicatorRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_indicator(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<IndicatorPatch>, JsonRejection>,
) -> Result<Json<IndicatorRes>, ApiError> {
    let id = record_id(&id)?;
    let indicator = state
        .services
        .indicators
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(IndicatorRes { indicator }))
}

#[utoipa::path(
    delete,
    path = "/indicators/{id}",
    params(("id" = String, Path, description = "Indicator entry id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_indicator(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .indicators
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

#[utoipa::path(
    get,
    path = "/indicator-submissions",
    responses(
        (status = 200, description = "Indicator submissions, standard unit as display label", body = IndicatorSubmissionsRes),
        (status = 401, description = "Not signed in; empty list", body = IndicatorSubmissionsRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_indicator_submissions(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<IndicatorSubmissionsRes>), ApiError> {
    let indicator_submissions = match &user {
        Some(user) => state
            .services
            .indicator_submissions
            .find_all(&user.scope())?
            .iter()
            .map(IndicatorSubmission::view)
            .collect(),
        None => Vec::new(),
    };
    Ok((
        list_status(user.is_some()),
        Json(IndicatorSubmissionsRes {
            indicator_submissions,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/indicator-submissions",
    request_body = NewIndicatorSubmission,
    responses(
        (status = 201, description = "Indicator submission created", body = IndicatorSubmissionRes),
        (status = 400, description = "Invalid input or unknown standard unit", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Unit outside the caller's scope", body = ErrorRes)
    )
)]
/// Define an indicator for a unit
///
/// `standardUnit` takes the display label (`%`, `menit`, ...).
#[axum::debug_handler(state = AppState)]
pub async fn create_indicator_submission(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewIndicatorSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<IndicatorSubmissionRes>), ApiError> {
    let submission = state
        .services
        .indicator_submissions
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((
        StatusCode::CREATED,
        Json(IndicatorSubmissionRes {
            indicator_submission: submission.view(),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/indicator-submissions/{id}",
    request_body = IndicatorSubmissionPatch,
    params(("id" = String, Path, description = "Indicator submission id")),
    responses(
        (status = 200, description = "Indicator submission updated", body = IndicatorSubmissionRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_indicator_submission(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<IndicatorSubmissionPatch>, JsonRejection>,
) -> Result<Json<IndicatorSubmissionRes>, ApiError> {
    let id = record_id(&id)?;
    let submission = state
        .services
        .indicator_submissions
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(IndicatorSubmissionRes {
        indicator_submission: submission.view(),
    }))
}

#[utoipa::path(
    delete,
    path = "/indicator-submissions/{id}",
    params(("id" = String, Path, description = "Indicator submission id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_indicator_submission(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .indicator_submissions
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

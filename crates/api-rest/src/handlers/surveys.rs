use super::{json_body, list_status, record_id};
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{ErrorRes, OkRes, SurveyRes, SurveysRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::records::survey::{NewSurvey, SurveyPatch};
use mutu_core::Actor;

#[utoipa::path(
    get,
    path = "/surveys",
    responses(
        (status = 200, description = "Culture surveys, latest submission first", body = SurveysRes),
        (status = 401, description = "Not signed in; empty list", body = SurveysRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_surveys(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<SurveysRes>), ApiError> {
    let surveys = match &user {
        Some(user) => state.services.surveys.find_all(&user.scope())?,
        None => Vec::new(),
    };
    Ok((list_status(user.is_some()), Json(SurveysRes { surveys })))
}

#[utoipa::path(
    post,
    path = "/surveys",
    request_body = NewSurvey,
    responses(
        (status = 201, description = "Survey submitted", body = SurveyRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Unit outside the caller's scope", body = ErrorRes)
    )
)]
/// Submit a patient-safety culture survey
///
/// `scores` is keyed by dimension; percentages must each lie between 0 and 100.
#[axum::debug_handler(state = AppState)]
pub async fn create_survey(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewSurvey>, JsonRejection>,
) -> Result<(StatusCode, Json<SurveyRes>), ApiError> {
    let survey = state
        .services
        .surveys
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(SurveyRes { survey })))
}

#[utoipa::path(
    patch,
    path = "/surveys/{id}",
    request_body = SurveyPatch,
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Survey updated", body = SurveyRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_survey(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<SurveyPatch>, JsonRejection>,
) -> Result<Json<SurveyRes>, ApiError> {
    let id = record_id(&id)?;
    let survey = state
        .services
        .surveys
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(SurveyRes { survey }))
}

#[utoipa::path(
    delete,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_survey(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .surveys
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

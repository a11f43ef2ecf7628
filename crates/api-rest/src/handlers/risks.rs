use super::{json_body, list_status, record_id};
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{ErrorRes, OkRes, RiskRes, RisksRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::records::risk::{NewRisk, RiskPatch};
use mutu_core::Actor;

#[utoipa::path(
    get,
    path = "/risks",
    responses(
        (status = 200, description = "Risks visible to the caller", body = RisksRes),
        (status = 401, description = "Not signed in; empty list", body = RisksRes)
    )
)]
/// List the risk register
///
/// Each risk carries its inherent score, residual score (when rated), grade and the resolved
/// person in charge.
#[axum::debug_handler(state = AppState)]
pub async fn list_risks(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<RisksRes>), ApiError> {
    let risks = match &user {
        Some(user) => state.services.risks.list(&user.scope())?,
        None => Vec::new(),
    };
    Ok((list_status(user.is_some()), Json(RisksRes { risks })))
}

#[utoipa::path(
    get,
    path = "/risks/{id}",
    params(("id" = String, Path, description = "Risk id")),
    responses(
        (status = 200, description = "Risk", body = RiskRes),
        (status = 400, description = "Malformed id", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_risk(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<RiskRes>, ApiError> {
    let risk = state.services.risks.find(&user.scope(), &record_id(&id)?)?;
    Ok(Json(RiskRes { risk }))
}

#[utoipa::path(
    post,
    path = "/risks",
    request_body = NewRisk,
    responses(
        (status = 201, description = "Risk registered", body = RiskRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Unit outside the caller's scope", body = ErrorRes)
    )
)]
/// Register a risk
///
/// Consequence, likelihood and controllability are whole numbers from 1 to 5, given as JSON
/// numbers or numeric strings.
#[axum::debug_handler(state = AppState)]
pub async fn create_risk(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewRisk>, JsonRejection>,
) -> Result<(StatusCode, Json<RiskRes>), ApiError> {
    let risk = state
        .services
        .risks
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(RiskRes { risk })))
}

#[utoipa::path(
    patch,
    path = "/risks/{id}",
    request_body = RiskPatch,
    params(("id" = String, Path, description = "Risk id")),
    responses(
        (status = 200, description = "Risk updated", body = RiskRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_risk(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<RiskPatch>, JsonRejection>,
) -> Result<Json<RiskRes>, ApiError> {
    let id = record_id(&id)?;
    let risk = state
        .services
        .risks
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(RiskRes { risk }))
}

#[utoipa::path(
    delete,
    path = "/risks/{id}",
    params(("id" = String, Path, description = "Risk id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_risk(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .risks
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

use super::{json_body, list_status, record_id};
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{ErrorRes, IncidentRes, IncidentsRes, OkRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::records::incident::{IncidentPatch, NewIncident};
use mutu_core::Actor;

#[utoipa::path(
    get,
    path = "/incidents",
    responses(
        (status = 200, description = "Incidents visible to the caller, latest first", body = IncidentsRes),
        (status = 401, description = "Not signed in; empty list", body = IncidentsRes)
    )
)]
/// List incident reports
///
/// Central roles see every unit; other roles see their own unit only.
#[axum::debug_handler(state = AppState)]
pub async fn list_incidents(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<IncidentsRes>), ApiError> {
    let incidents = match &user {
        Some(user) => state.services.incidents.list(&user.scope())?,
        None => Vec::new(),
    };
    Ok((list_status(user.is_some()), Json(IncidentsRes { incidents })))
}

#[utoipa::path(
    get,
    path = "/incidents/{id}",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Incident", body = IncidentRes),
        (status = 400, description = "Malformed id", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_incident(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<IncidentRes>, ApiError> {
    let incident = state
        .services
        .incidents
        .find(&user.scope(), &record_id(&id)?)?;
    Ok(Json(IncidentRes { incident }))
}

#[utoipa::path(
    post,
    path = "/incidents",
    request_body = NewIncident,
    responses(
        (status = 201, description = "Incident reported", body = IncidentRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Unit outside the caller's scope", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Report an incident
///
/// The chronology is normalised before it is stored, and the patient-safety subcommittee is
/// notified.
#[axum::debug_handler(state = AppState)]
pub async fn create_incident(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewIncident>, JsonRejection>,
) -> Result<(StatusCode, Json<IncidentRes>), ApiError> {
    let incident = state
        .services
        .incidents
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(IncidentRes { incident })))
}

#[utoipa::path(
    patch,
    path = "/incidents/{id}",
    request_body = IncidentPatch,
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Incident updated", body = IncidentRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 404, description = "Missing or outside the caller's unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_incident(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<IncidentPatch>, JsonRejection>,
) -> Result<Json<IncidentRes>, ApiError> {
    let id = record_id(&id)?;
    let incident = state
        .services
        .incidents
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(IncidentRes { incident }))
}

#[utoipa::path(
    delete,
    path = "/incidents/{id}",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_incident(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .incidents
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

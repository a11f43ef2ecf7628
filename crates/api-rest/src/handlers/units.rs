use super::{json_body, list_status, record_id};
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{ErrorRes, OkRes, UnitRes, UnitsRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::records::unit::{NewUnit, UnitPatch};
use mutu_core::Actor;

#[utoipa::path(
    get,
    path = "/units",
    responses(
        (status = 200, description = "All hospital units", body = UnitsRes),
        (status = 401, description = "Not signed in; empty list", body = UnitsRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_units(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<UnitsRes>), ApiError> {
    let units = match &user {
        Some(user) => state.services.units.find_all(&user.scope())?,
        None => Vec::new(),
    };
    Ok((list_status(user.is_some()), Json(UnitsRes { units })))
}

#[utoipa::path(
    post,
    path = "/units",
    request_body = NewUnit,
    responses(
        (status = 201, description = "Unit created", body = UnitRes),
        (status = 400, description = "Blank or duplicate name", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Caller may not manage units", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_unit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewUnit>, JsonRejection>,
) -> Result<(StatusCode, Json<UnitRes>), ApiError> {
    let unit = state
        .services
        .units
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(UnitRes { unit })))
}

#[utoipa::path(
    patch,
    path = "/units/{id}",
    request_body = UnitPatch,
    params(("id" = String, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit renamed", body = UnitRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 403, description = "Caller may not manage units", body = ErrorRes),
        (status = 404, description = "No such unit", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_unit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<UnitPatch>, JsonRejection>,
) -> Result<Json<UnitRes>, ApiError> {
    let id = record_id(&id)?;
    let unit = state
        .services
        .units
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(UnitRes { unit }))
}

#[utoipa::path(
    delete,
    path = "/units/{id}",
    params(("id" = String, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Caller may not manage units", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_unit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .units
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

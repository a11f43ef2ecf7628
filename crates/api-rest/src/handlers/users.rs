use super::{json_body, list_status, record_id};
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{ErrorRes, OkRes, UserRes, UsersRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::records::user::{NewUser, UserPatch};
use mutu_core::Actor;

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "User accounts visible to the caller, without password hashes", body = UsersRes),
        (status = 401, description = "Not signed in; empty list", body = UsersRes)
    )
)]
/// List user accounts
///
/// Central roles see every account; unit roles see the accounts of their own unit.
#[axum::debug_handler(state = AppState)]
pub async fn list_users(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<UsersRes>), ApiError> {
    let users = match &user {
        Some(user) => state.services.users.list(&user.scope())?,
        None => Vec::new(),
    };
    Ok((list_status(user.is_some()), Json(UsersRes { users })))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = UserRes),
        (status = 400, description = "Invalid input or email already registered", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Caller may not manage users", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRes>), ApiError> {
    let created = state
        .services
        .users
        .create(&Actor::from(&user), json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(UserRes { user: created })))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = UserPatch,
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated", body = UserRes),
        (status = 400, description = "Invalid input or id", body = ErrorRes),
        (status = 403, description = "Caller may not manage users", body = ErrorRes),
        (status = 404, description = "No such user", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserRes>, ApiError> {
    let id = record_id(&id)?;
    let updated = state
        .services
        .users
        .update(&Actor::from(&user), &id, json_body(body)?)?;
    Ok(Json(UserRes { user: updated }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Caller may not manage users", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<OkRes>, ApiError> {
    state
        .services
        .users
        .remove(&Actor::from(&user), &record_id(&id)?)?;
    Ok(Json(OkRes::yes()))
}

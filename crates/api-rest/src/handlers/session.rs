//! Sign-in, sign-out and the current session.

use super::json_body;
use crate::error::ApiError;
use crate::extract::{MaybeUser, RequireUser};
use crate::router::AppState;
use api_shared::{ErrorRes, OkRes, SessionRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::Json;
use mutu_core::MutuError;
use serde::Deserialize;
use utoipa::ToSchema;

/// Credentials for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

fn cookie_header(value: String) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(&value)
        .map_err(|e| MutuError::store("building session cookie", e))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "The signed-in user, or null", body = SessionRes))
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_session(MaybeUser(user): MaybeUser) -> Json<SessionRes> {
    Json(SessionRes { user })
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Signed in; the session cookie is set", body = SessionRes),
        (status = 400, description = "Malformed body", body = ErrorRes),
        (status = 401, description = "Wrong email or password", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginReq>, JsonRejection>,
) -> Result<(HeaderMap, Json<SessionRes>), ApiError> {
    let req = json_body(body)?;
    let user = state.services.users.login(&req.email, &req.password)?;
    let token = state.services.sessions.encode(&user)?;
    let headers = cookie_header(format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax",
        state.cfg.session_cookie()
    ))?;
    Ok((headers, Json(SessionRes { user: Some(user) })))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Signed out; the session cookie is cleared", body = OkRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn logout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<(HeaderMap, Json<OkRes>), ApiError> {
    state.services.users.logout(&user)?;
    let headers = cookie_header(format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        state.cfg.session_cookie()
    ))?;
    Ok((headers, Json(OkRes::yes())))
}

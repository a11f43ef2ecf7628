//! Session extraction.
//!
//! The session token travels in a cookie (named by `CoreConfig::session_cookie`). These
//! extractors check its signature and re-read the named user from the store, so the role and
//! unit used for authorisation are always the account's current ones.

use crate::error::ApiError;
use crate::router::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use mutu_core::{MutuError, SessionUser};

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn session_user(parts: &Parts, state: &AppState) -> Result<Option<SessionUser>, ApiError> {
    let token = cookie_value(&parts.headers, state.cfg.session_cookie());
    Ok(state.services.current_user(token)?)
}

/// The signed-in user, if any. Only a failing user store rejects.
pub struct MaybeUser(pub Option<SessionUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_user(parts, state).map(MaybeUser)
    }
}

/// The signed-in user; rejects with 401 when there is none.
pub struct RequireUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_user(parts, state)?
            .map(RequireUser)
            .ok_or(ApiError::Core(MutuError::Unauthenticated))
    }
}

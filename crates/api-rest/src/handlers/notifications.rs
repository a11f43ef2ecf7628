use super::json_body;
use crate::error::ApiError;
use crate::extract::MaybeUser;
use crate::router::AppState;
use api_shared::{ErrorRes, NotificationRes, NotificationsRes};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use mutu_core::notifications::{NewNotification, NotificationFilter};
use mutu_core::records::UnitName;
use mutu_core::Role;
use serde::Deserialize;
use utoipa::IntoParams;

/// Reader to filter notifications for. Blank values count as absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Role name as shown in the UI, e.g. `Direktur`.
    pub role: Option<String>,
    pub unit: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications addressed to the reader, newest first", body = NotificationsRes),
        (status = 400, description = "Unknown role", body = ErrorRes)
    )
)]
/// List notifications
///
/// Without `role` and `unit` parameters the signed-in user's own role and unit are used. An
/// anonymous reader with no parameters sees broadcasts only.
#[axum::debug_handler(state = AppState)]
pub async fn list_notifications(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    query: Result<Query<NotificationQuery>, QueryRejection>,
) -> Result<Json<NotificationsRes>, ApiError> {
    let Query(query) = query?;
    let role = present(query.role);
    let unit = present(query.unit);

    let filter = if role.is_none() && unit.is_none() {
        match user {
            Some(user) => NotificationFilter {
                role: Some(user.role),
                unit: user.unit,
            },
            None => NotificationFilter::default(),
        }
    } else {
        NotificationFilter {
            role: role.as_deref().map(str::parse::<Role>).transpose()?,
            unit: unit.and_then(|u| UnitName::new(u).ok()),
        }
    };

    let notifications = state.services.notifications.list(&filter)?;
    Ok(Json(NotificationsRes { notifications }))
}

#[utoipa::path(
    post,
    path = "/notifications",
    request_body = NewNotification,
    responses(
        (status = 201, description = "Notification published", body = NotificationRes),
        (status = 400, description = "Title or description missing", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_notification(
    State(state): State<AppState>,
    body: Result<Json<NewNotification>, JsonRejection>,
) -> Result<(StatusCode, Json<NotificationRes>), ApiError> {
    let notification = state.services.notifications.add(json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(NotificationRes { notification })))
}

use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::router::AppState;
use api_shared::{ErrorRes, LogsRes};
use axum::extract::State;
use axum::Json;
use mutu_core::{Actor, Role};

#[utoipa::path(
    get,
    path = "/logs",
    responses(
        (status = 200, description = "System log, newest first", body = LogsRes),
        (status = 401, description = "Not signed in", body = ErrorRes),
        (status = 403, description = "Caller does not hold a central role", body = ErrorRes)
    )
)]
/// Read the system log
///
/// Restricted to central roles.
#[axum::debug_handler(state = AppState)]
pub async fn list_logs(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<LogsRes>, ApiError> {
    Actor::from(&user).require(Role::is_central, "read the system log")?;
    let logs = state.services.logs.list()?;
    Ok(Json(LogsRes { logs }))
}

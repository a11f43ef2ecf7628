use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::router::AppState;
use api_shared::{DashboardRes, ErrorRes};
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Record counts over the caller's scope", body = DashboardRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<DashboardRes>, ApiError> {
    let summary = state.services.dashboard(&user.scope())?;
    Ok(Json(DashboardRes { summary }))
}

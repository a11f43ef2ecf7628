use api_shared::{HealthRes, HealthService};
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthRes))
)]
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

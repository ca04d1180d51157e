use axum::Json;
use nimbus_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("nimbus-auth", env!("CARGO_PKG_VERSION")))
}

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use nimbus_shared::errors::AppResult;
use nimbus_shared::types::ApiResponse;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResendVerificationRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    state.accounts.resend_verification(&req.email).await?;

    Ok(Json(ApiResponse::ok(
        "verification email sent, please check your inbox",
    )))
}

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use nimbus_shared::errors::AppResult;
use nimbus_shared::types::ApiResponse;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    state.accounts.verify_email(&req.token).await?;

    Ok(Json(ApiResponse::ok("email verified")))
}

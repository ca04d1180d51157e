use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use nimbus_shared::errors::AppResult;
use nimbus_shared::types::ApiResponse;

use crate::services::account_service::ResetTokenInfo;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResetTokenQuery {
    #[serde(default)]
    pub token: String,
}

/// Pre-flight check used by the reset form before the user types a new
/// password.
pub async fn verify_reset_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResetTokenQuery>,
) -> AppResult<Json<ApiResponse<ResetTokenInfo>>> {
    let info = state.accounts.verify_reset_token(&query.token).await?;

    Ok(Json(ApiResponse::ok(info)))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    state
        .accounts
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::ok("password reset successful")))
}

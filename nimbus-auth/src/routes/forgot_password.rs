use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use nimbus_shared::errors::AppResult;
use nimbus_shared::types::ApiResponse;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    state.accounts.request_password_reset(&req.email).await?;

    // Same body whether or not the address is registered.
    Ok(Json(ApiResponse::ok(
        "if an account exists with this email, a reset link has been sent",
    )))
}

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use nimbus_shared::errors::{AppError, AppResult, ErrorCode};
use nimbus_shared::types::ApiResponse;

use crate::services::account_service::SignUpReceipt;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<SignUpReceipt>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let receipt = state
        .accounts
        .sign_up(&req.name, &req.email, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        receipt,
        "account created, please check your email to verify your account",
    )))
}

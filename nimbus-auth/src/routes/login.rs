use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use nimbus_shared::errors::AppResult;
use nimbus_shared::types::auth::Session;
use nimbus_shared::types::ApiResponse;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<Session>>> {
    let session = state.accounts.sign_in(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::ok(session)))
}

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }
}

/// Established session handed back to the client after a successful sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl Session {
    pub fn new(user_id: Uuid, access_token: String, expires_in: i64) -> Self {
        Self {
            user_id,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

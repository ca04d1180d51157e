use jsonwebtoken::{encode, EncodingKey, Header};

use nimbus_shared::errors::{AppError, AppResult};
use nimbus_shared::types::auth::{Claims, Session};

use crate::models::User;

/// Injected identity capability: given an already-authenticated user,
/// establishes a session. Cookie and refresh mechanics live with the
/// implementor, not with the account lifecycle.
pub trait SessionProvider: Send + Sync {
    fn establish(&self, user: &User) -> AppResult<Session>;
}

pub struct JwtSessions {
    secret: String,
    access_ttl: i64,
}

impl JwtSessions {
    pub fn new(secret: &str, access_ttl: i64) -> Self {
        Self {
            secret: secret.to_string(),
            access_ttl,
        }
    }
}

impl SessionProvider for JwtSessions {
    fn establish(&self, user: &User) -> AppResult<Session> {
        let claims = Claims::new(user.id, self.access_ttl);
        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))?;

        Ok(Session::new(user.id, access_token, self.access_ttl))
    }
}

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints an opaque single-use token: 32 bytes of entropy, hex-encoded, with
/// its expiry stamped `now + validity`. The string carries no decodable
/// structure; it is purely a lookup key.
pub fn issue_token(validity: Duration) -> IssuedToken {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();

    IssuedToken {
        token: hex::encode(bytes),
        expires_at: Utc::now() + validity,
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use nimbus_shared::errors::AppResult;

use crate::models::{NewUser, User};

mod postgres;

pub use postgres::PgUserStore;

#[cfg(test)]
pub mod memory;

/// Gateway to the user table. All lookups expect the email key already
/// lowercased; token reads and consumptions treat `expires <= now` rows as
/// absent.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Read-only probe for a still-valid reset token. Does not consume.
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Inserts a new user, deleting any unverified row with the same email
    /// in the same transaction. A verified row with that email must be
    /// rejected by the caller beforehand; hitting one here surfaces as a
    /// unique-constraint database error.
    async fn insert_replacing_unverified(&self, user: NewUser) -> AppResult<User>;

    /// Overwrites the verification token pair, invalidating any prior token.
    async fn set_verification_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Overwrites the reset token pair, invalidating any prior token.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()>;

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()>;

    /// Atomically marks the matching user verified and clears the
    /// verification pair, but only while the token is unexpired. Returns the
    /// updated row, or `None` when no live token matched. At-most-once even
    /// under concurrent replay of the same link.
    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Atomically replaces the password hash and clears the reset pair for
    /// the matching unexpired token. Returns the updated row, or `None` when
    /// no live token matched.
    async fn consume_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    async fn delete_by_id(&self, id: Uuid) -> AppResult<()>;

    /// Opportunistically nulls token pairs whose expiry has passed. Returns
    /// the number of rows touched.
    async fn clear_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<usize>;
}

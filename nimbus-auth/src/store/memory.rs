//! In-memory `UserStore` used by the service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use nimbus_shared::errors::AppResult;

use crate::models::{NewUser, User};

use super::UserStore;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.email == email).cloned()
    }

    /// Direct row edit, for backdating expiries and the like.
    pub fn tamper(&self, email: &str, f: impl FnOnce(&mut User)) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            f(user);
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.snapshot_by_email(email))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| {
                u.password_reset_token.as_deref() == Some(token)
                    && u.password_reset_expires.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn insert_replacing_unverified(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        users.retain(|u| !(u.email == user.email && u.email_verified.is_none()));

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            email_verified: None,
            email_verification_token: user.email_verification_token,
            email_verification_expires: user.email_verification_expires,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn set_verification_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.email_verification_token = Some(token.to_string());
            user.email_verification_expires = Some(expires);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_reset_token = Some(token.to_string());
            user.password_reset_expires = Some(expires);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_reset_token = None;
            user.password_reset_expires = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| {
            u.email_verification_token.as_deref() == Some(token)
                && u.email_verification_expires.is_some_and(|exp| exp > now)
        });
        Ok(user.map(|u| {
            u.email_verified = Some(now);
            u.email_verification_token = None;
            u.email_verification_expires = None;
            u.updated_at = now;
            u.clone()
        }))
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| {
            u.password_reset_token.as_deref() == Some(token)
                && u.password_reset_expires.is_some_and(|exp| exp > now)
        });
        Ok(user.map(|u| {
            u.password_hash = Some(new_password_hash.to_string());
            u.password_reset_token = None;
            u.password_reset_expires = None;
            u.updated_at = now;
            u.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        users.retain(|u| u.id != id);
        Ok(())
    }

    async fn clear_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut users = self.users.lock().unwrap();
        let mut touched = 0;
        for user in users.iter_mut() {
            if user.email_verification_expires.is_some_and(|exp| exp <= now) {
                user.email_verification_token = None;
                user.email_verification_expires = None;
                touched += 1;
            }
            if user.password_reset_expires.is_some_and(|exp| exp <= now) {
                user.password_reset_token = None;
                user.password_reset_expires = None;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

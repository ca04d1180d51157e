use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;

use nimbus_shared::errors::{AppError, AppResult, ErrorCode};
use nimbus_shared::types::auth::Session;

use crate::config::AppConfig;
use crate::models::NewUser;
use crate::services::credential_service;
use crate::services::mailer::Mailer;
use crate::services::session_service::SessionProvider;
use crate::services::token_service;
use crate::store::UserStore;

/// Validity and throttle windows for the two token slots.
///
/// The throttles are derived from remaining token validity rather than a
/// dedicated last-issued column: a resend is refused while the current
/// verification token still has more than `verification_ttl -
/// resend_cooldown` left, and likewise for reset requests. Throttle window
/// and token lifetime are therefore coupled.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pub verification_ttl: Duration,
    pub reset_ttl: Duration,
    pub resend_cooldown: Duration,
    pub reset_cooldown: Duration,
}

impl TokenPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            verification_ttl: Duration::hours(config.verification_ttl_hours),
            reset_ttl: Duration::minutes(config.reset_ttl_minutes),
            resend_cooldown: Duration::minutes(config.resend_cooldown_minutes),
            reset_cooldown: Duration::minutes(config.reset_cooldown_minutes),
        }
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            verification_ttl: Duration::hours(24),
            reset_ttl: Duration::minutes(60),
            resend_cooldown: Duration::minutes(60),
            reset_cooldown: Duration::minutes(5),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpReceipt {
    pub email: String,
    pub requires_verification: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetTokenInfo {
    pub email: String,
    pub name: String,
}

/// Orchestrates the account credential and token lifecycle: sign-up with
/// email verification, credential sign-in, resend, and the password reset
/// flow. Expected failures come back as `AppError::Known`; only store and
/// provider faults propagate as internal errors.
pub struct AccountService {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    sessions: Arc<dyn SessionProvider>,
    policy: TokenPolicy,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        sessions: Arc<dyn SessionProvider>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            store,
            mailer,
            sessions,
            policy,
        }
    }

    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<SignUpReceipt> {
        credential_service::validate_name(name)?;
        credential_service::validate_password(password)?;

        let email = normalize_email(email);

        if let Some(existing) = self.store.find_by_email(&email).await? {
            if existing.is_verified() {
                return Err(AppError::new(
                    ErrorCode::EmailAlreadyExists,
                    "an account already exists with this email address",
                ));
            }
            // Stale unverified account: replaced inside the insert below.
        }

        let password_hash = credential_service::hash_password(password)?;
        let issued = token_service::issue_token(self.policy.verification_ttl);

        let user = self
            .store
            .insert_replacing_unverified(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash: Some(password_hash),
                email_verification_token: Some(issued.token.clone()),
                email_verification_expires: Some(issued.expires_at),
            })
            .await?;

        if let Err(e) = self
            .mailer
            .send_verification(&user.email, &user.name, &issued.token)
            .await
        {
            tracing::error!(error = %e, "failed to send verification email");
            // The freshly minted token is unreachable without the email, so
            // the account goes too; the caller can sign up again.
            if let Err(del) = self.store.delete_by_id(user.id).await {
                tracing::error!(error = %del, user_id = %user.id, "sign-up rollback failed");
            }
            return Err(AppError::new(
                ErrorCode::EmailDeliveryFailed,
                "failed to send verification email, please try again",
            ));
        }

        tracing::info!(user_id = %user.id, email = %user.email, "user signed up");

        Ok(SignUpReceipt {
            email: user.email,
            requires_verification: true,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = normalize_email(email);

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !user.is_verified() {
            return Err(AppError::new(
                ErrorCode::EmailNotVerified,
                "please verify your email before signing in",
            ));
        }

        // OAuth-only accounts have no password hash and cannot sign in here.
        let hash = user.password_hash.as_deref().ok_or_else(invalid_credentials)?;
        if !credential_service::verify_password(password, hash)? {
            return Err(invalid_credentials());
        }

        let session = self.sessions.establish(&user)?;

        tracing::info!(user_id = %user.id, "user signed in");

        Ok(session)
    }

    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        if token.is_empty() {
            return Err(verification_token_invalid());
        }

        let now = Utc::now();
        match self.store.consume_verification_token(token, now).await? {
            Some(user) => {
                tracing::info!(user_id = %user.id, "email verified");
                Ok(())
            }
            None => Err(verification_token_invalid()),
        }
    }

    pub async fn resend_verification(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);

        let user = self.store.find_by_email(&email).await?.ok_or_else(|| {
            AppError::new(ErrorCode::NotFound, "no account found with this email address")
        })?;

        if user.is_verified() {
            return Err(AppError::new(
                ErrorCode::AlreadyVerified,
                "email is already verified",
            ));
        }

        if let Some(expires) = user.email_verification_expires {
            let remaining = expires - Utc::now();
            if remaining > self.policy.verification_ttl - self.policy.resend_cooldown {
                return Err(AppError::new(
                    ErrorCode::RateLimited,
                    "please wait a few minutes before requesting another verification email",
                ));
            }
        }

        let issued = token_service::issue_token(self.policy.verification_ttl);
        self.store
            .set_verification_token(user.id, &issued.token, issued.expires_at)
            .await?;

        if let Err(e) = self
            .mailer
            .send_verification(&user.email, &user.name, &issued.token)
            .await
        {
            tracing::error!(error = %e, "failed to send verification email");
            return Err(AppError::new(
                ErrorCode::EmailDeliveryFailed,
                "failed to send verification email, please try again",
            ));
        }

        tracing::info!(user_id = %user.id, "verification email resent");

        Ok(())
    }

    /// Never discloses whether the address is registered: unknown emails get
    /// the same success as dispatched resets. The one exception is a known
    /// but unverified account, which is told to verify first.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            return Ok(());
        };

        if !user.is_verified() {
            return Err(AppError::new(
                ErrorCode::EmailNotVerified,
                "please verify your email address first",
            ));
        }

        if let Some(expires) = user.password_reset_expires {
            let minutes_left = (expires - Utc::now()).num_minutes();
            let threshold = (self.policy.reset_ttl - self.policy.reset_cooldown).num_minutes();
            if minutes_left > threshold {
                let wait = minutes_left - threshold;
                return Err(AppError::with_details(
                    ErrorCode::RateLimited,
                    format!("please wait {wait} minutes before requesting another reset link"),
                    json!({ "retry_after_minutes": wait }),
                ));
            }
        }

        let issued = token_service::issue_token(self.policy.reset_ttl);
        self.store
            .set_reset_token(user.id, &issued.token, issued.expires_at)
            .await?;

        if let Err(e) = self
            .mailer
            .send_password_reset(&user.email, &user.name, &issued.token)
            .await
        {
            tracing::error!(error = %e, "failed to send reset email");
            // Clear the pair so no unreachable token lingers.
            if let Err(clear) = self.store.clear_reset_token(user.id).await {
                tracing::error!(error = %clear, user_id = %user.id, "reset rollback failed");
            }
            return Err(AppError::new(
                ErrorCode::EmailDeliveryFailed,
                "failed to send reset email, please try again",
            ));
        }

        tracing::info!(user_id = %user.id, "password reset requested");

        Ok(())
    }

    /// Validity probe for the reset form; does not consume the token.
    pub async fn verify_reset_token(&self, token: &str) -> AppResult<ResetTokenInfo> {
        if token.is_empty() {
            return Err(reset_token_invalid());
        }

        let now = Utc::now();
        match self.store.find_by_reset_token(token, now).await? {
            Some(user) => Ok(ResetTokenInfo {
                email: user.email,
                name: user.name,
            }),
            None => Err(reset_token_invalid()),
        }
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        credential_service::validate_password(new_password)?;

        if token.is_empty() {
            return Err(reset_token_invalid());
        }

        let password_hash = credential_service::hash_password(new_password)?;
        let now = Utc::now();

        match self
            .store
            .consume_reset_token(token, &password_hash, now)
            .await?
        {
            Some(user) => {
                tracing::info!(user_id = %user.id, "password reset");
                Ok(())
            }
            None => Err(reset_token_invalid()),
        }
    }

    /// Lazy invalidation already treats expired tokens as absent; this sweep
    /// just nulls the stale columns.
    pub async fn purge_expired_tokens(&self) -> AppResult<usize> {
        self.store.clear_expired_tokens(Utc::now()).await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::new(ErrorCode::InvalidCredentials, "invalid email or password")
}

fn verification_token_invalid() -> AppError {
    AppError::new(
        ErrorCode::TokenInvalidOrExpired,
        "invalid or expired verification token",
    )
}

fn reset_token_invalid() -> AppError {
    AppError::new(
        ErrorCode::TokenInvalidOrExpired,
        "invalid or expired reset token",
    )
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use nimbus_shared::clients::db::DbPool;
use nimbus_shared::errors::{AppError, AppResult};

use crate::models::{NewUser, User};
use crate::schema::users;

use super::UserStore;

pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().map_err(|e| AppError::internal(e.to_string()))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()?;
        Ok(user)
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::password_reset_token.eq(token))
            .filter(users::password_reset_expires.gt(now))
            .first::<User>(&mut conn)
            .optional()?;
        Ok(user)
    }

    async fn insert_replacing_unverified(&self, user: NewUser) -> AppResult<User> {
        let mut conn = self.conn()?;
        let created = conn.transaction::<User, diesel::result::Error, _>(|conn| {
            diesel::delete(
                users::table
                    .filter(users::email.eq(&user.email))
                    .filter(users::email_verified.is_null()),
            )
            .execute(conn)?;

            diesel::insert_into(users::table)
                .values(&user)
                .get_result::<User>(conn)
        })?;
        Ok(created)
    }

    async fn set_verification_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::email_verification_token.eq(Some(token)),
                users::email_verification_expires.eq(Some(expires)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::password_reset_token.eq(Some(token)),
                users::password_reset_expires.eq(Some(expires)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::password_reset_token.eq(None::<String>),
                users::password_reset_expires.eq(None::<DateTime<Utc>>),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        // Single conditional update: the row-level lock makes consumption
        // at-most-once when the same link is replayed concurrently.
        let user = diesel::update(
            users::table
                .filter(users::email_verification_token.eq(token))
                .filter(users::email_verification_expires.gt(now)),
        )
        .set((
            users::email_verified.eq(Some(now)),
            users::email_verification_token.eq(None::<String>),
            users::email_verification_expires.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(now),
        ))
        .get_result::<User>(&mut conn)
        .optional()?;
        Ok(user)
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = diesel::update(
            users::table
                .filter(users::password_reset_token.eq(token))
                .filter(users::password_reset_expires.gt(now)),
        )
        .set((
            users::password_hash.eq(Some(new_password_hash)),
            users::password_reset_token.eq(None::<String>),
            users::password_reset_expires.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(now),
        ))
        .get_result::<User>(&mut conn)
        .optional()?;
        Ok(user)
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::delete(users::table.filter(users::id.eq(id))).execute(&mut conn)?;
        Ok(())
    }

    async fn clear_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut conn = self.conn()?;
        let stale_verifications = diesel::update(
            users::table.filter(users::email_verification_expires.le(now)),
        )
        .set((
            users::email_verification_token.eq(None::<String>),
            users::email_verification_expires.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        let stale_resets = diesel::update(
            users::table.filter(users::password_reset_expires.le(now)),
        )
        .set((
            users::password_reset_token.eq(None::<String>),
            users::password_reset_expires.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        Ok(stale_verifications + stale_resets)
    }
}

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RegistrationStore, StoreError};
use crate::databases::auth::pending::PendingRegistration;
use crate::databases::auth::pendingdb;
use crate::databases::users::user::{NewUser, User};
use crate::databases::users::userdb;
use crate::otp::Channel;

#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RegistrationStore for PgRegistrationStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(userdb::list_users(&self.pool).await?)
    }

    async fn user_exists(&self, email: &str, phone_number: &str) -> Result<bool, StoreError> {
        Ok(userdb::user_exists(&self.pool, email, phone_number).await?)
    }

    async fn create_pending(&self, pending: PendingRegistration) -> Result<(), StoreError> {
        Ok(pendingdb::insert_pending(&self.pool, &pending).await?)
    }

    async fn find_pending(&self, temp_id: &str) -> Result<Option<PendingRegistration>, StoreError> {
        Ok(pendingdb::find_pending(&self.pool, temp_id).await?)
    }

    async fn set_code(
        &self,
        temp_id: &str,
        channel: Channel,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(pendingdb::set_code(&self.pool, temp_id, channel, code_hash, expires_at).await?)
    }

    async fn reserve_attempt(&self, temp_id: &str, max_attempts: i32) -> Result<Option<i32>, StoreError> {
        Ok(pendingdb::reserve_attempt(&self.pool, temp_id, max_attempts).await?)
    }

    async fn discard_pending(&self, temp_id: &str) -> Result<bool, StoreError> {
        Ok(pendingdb::take_pending(&self.pool, temp_id).await?.is_some())
    }

    async fn complete_registration(&self, temp_id: &str, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;

        if pendingdb::take_pending(&mut *tx, temp_id).await?.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        // Dropping `tx` rolls back, so the pending row survives a conflict.
        let user = match userdb::insert_user(&mut *tx, &user).await {
            Ok(user) => user,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => return Err(StoreError::Conflict),
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(Some(user))
    }
}

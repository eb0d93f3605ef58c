//! Storage seam between the HTTP handlers and PostgreSQL.
//!
//! Handlers are generic over [`RegistrationStore`] so they can run against
//! [`PgRegistrationStore`] in production and an in-memory store in tests.

use chrono::{DateTime, Utc};
use std::future::Future;

use crate::databases::auth::pending::PendingRegistration;
use crate::databases::users::user::{NewUser, User};
use crate::otp::Channel;

#[cfg(test)]
pub mod mock;
mod postgres;

pub use postgres::PgRegistrationStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A user with the same email or phone number already exists.
    #[error("user already exists")]
    Conflict,
}

pub trait RegistrationStore: Clone + Send + Sync + 'static {
    /// All registered users, ordered by id.
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, StoreError>> + Send;

    /// Whether a user already holds this email or phone number.
    fn user_exists(
        &self,
        email: &str,
        phone_number: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn create_pending(
        &self,
        pending: PendingRegistration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn find_pending(
        &self,
        temp_id: &str,
    ) -> impl Future<Output = Result<Option<PendingRegistration>, StoreError>> + Send;

    /// Replaces the code for one channel and resets the attempt counter.
    /// Returns `false` when the pending registration does not exist.
    fn set_code(
        &self,
        temp_id: &str,
        channel: Channel,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Counts one verification attempt, but only while fewer than
    /// `max_attempts` have been made. Returns the new count, or `None` when
    /// the limit is reached or the registration is gone.
    fn reserve_attempt(
        &self,
        temp_id: &str,
        max_attempts: i32,
    ) -> impl Future<Output = Result<Option<i32>, StoreError>> + Send;

    /// Drops a pending registration. Returns `false` if it did not exist.
    fn discard_pending(&self, temp_id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Atomically removes the pending registration and creates the user.
    /// Returns `None` when the pending registration was already consumed and
    /// [`StoreError::Conflict`] when the email or phone number got taken since.
    fn complete_registration(
        &self,
        temp_id: &str,
        user: NewUser,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

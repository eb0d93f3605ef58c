use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use super::pending::PendingRegistration;
use crate::otp::Channel;

const PENDING_COLUMNS: &str = "temp_id, email, phone_number, email_code_hash, email_code_expires_at, \
     phone_code_hash, phone_code_expires_at, attempts, created_at";

pub async fn insert_pending(pool: &PgPool, pending: &PendingRegistration) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO pending_registrations
            (temp_id, email, phone_number, email_code_hash, email_code_expires_at,
             phone_code_hash, phone_code_expires_at, attempts, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&pending.temp_id)
    .bind(&pending.email)
    .bind(&pending.phone_number)
    .bind(&pending.email_code_hash)
    .bind(pending.email_code_expires_at)
    .bind(&pending.phone_code_hash)
    .bind(pending.phone_code_expires_at)
    .bind(pending.attempts)
    .bind(pending.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_pending(pool: &PgPool, temp_id: &str) -> Result<Option<PendingRegistration>, sqlx::Error> {
    let query = format!("SELECT {PENDING_COLUMNS} FROM pending_registrations WHERE temp_id = $1");
    sqlx::query_as::<_, PendingRegistration>(&query)
        .bind(temp_id)
        .fetch_optional(pool)
        .await
}

/// Returns `false` when no pending registration has that `temp_id`.
pub async fn set_code(
    pool: &PgPool,
    temp_id: &str,
    channel: Channel,
    code_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let sql = match channel {
        Channel::Email => {
            "UPDATE pending_registrations
             SET email_code_hash = $2, email_code_expires_at = $3, attempts = 0
             WHERE temp_id = $1"
        }
        Channel::Phone => {
            "UPDATE pending_registrations
             SET phone_code_hash = $2, phone_code_expires_at = $3, attempts = 0
             WHERE temp_id = $1"
        }
    };

    let result = sqlx::query(sql)
        .bind(temp_id)
        .bind(code_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `None` once `max_attempts` is reached or the row is gone. The
/// limit is checked by the same statement that increments.
pub async fn reserve_attempt(pool: &PgPool, temp_id: &str, max_attempts: i32) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        "UPDATE pending_registrations SET attempts = attempts + 1
         WHERE temp_id = $1 AND attempts < $2
         RETURNING attempts",
    )
    .bind(temp_id)
    .bind(max_attempts)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(attempts,)| attempts))
}

/// Deletes the pending registration and hands it back. Of two concurrent
/// callers only one gets `Some`.
pub async fn take_pending<'e, E>(executor: E, temp_id: &str) -> Result<Option<PendingRegistration>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("DELETE FROM pending_registrations WHERE temp_id = $1 RETURNING {PENDING_COLUMNS}");
    sqlx::query_as::<_, PendingRegistration>(&query)
        .bind(temp_id)
        .fetch_optional(executor)
        .await
}

pub async fn purge_stale(pool: &PgPool, created_before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pending_registrations WHERE created_at < $1")
        .bind(created_before)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

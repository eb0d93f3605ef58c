use sqlx::{PgExecutor, PgPool};

use super::user::{NewUser, User};

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone_number, vehicle_number, payment_done, created_at
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Email is compared case-insensitively.
pub async fn user_exists(pool: &PgPool, email: &str, phone_number: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("SELECT 1 FROM users WHERE lower(email) = lower($1) OR phone_number = $2")
        .bind(email)
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;

    Ok(result.is_some())
}

pub async fn insert_user<'e, E>(executor: E, user: &NewUser) -> Result<User, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, phone_number, vehicle_number)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, name, phone_number, vehicle_number, payment_done, created_at
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.phone_number)
    .bind(&user.vehicle_number)
    .fetch_one(executor)
    .await
}

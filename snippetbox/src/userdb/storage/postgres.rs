use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::userdb::{errors::UserError, types::User};

use super::config::DB_TABLE_USERS;

// PostgreSQL implementations
pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            created TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn insert_user_postgres(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    hashed_password: &str,
    created: DateTime<Utc>,
) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_scalar::<_, i64>(&format!(
        r#"
        INSERT INTO {table_name} (name, email, hashed_password, created)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#
    ))
    .bind(name)
    .bind(email)
    .bind(hashed_password)
    .bind(created)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn get_user_by_id_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT id, name, email, hashed_password, created FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn get_user_by_email_postgres(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT id, name, email, hashed_password, created FROM {table_name} WHERE email = $1
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn user_exists_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<bool, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_scalar::<_, bool>(&format!(
        r#"
        SELECT EXISTS(SELECT 1 FROM {table_name} WHERE id = $1)
        "#
    ))
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_password_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    hashed_password: &str,
) -> Result<u64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET hashed_password = $1 WHERE id = $2
        "#
    ))
    .bind(hashed_password)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

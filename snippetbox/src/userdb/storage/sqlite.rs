use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::userdb::{errors::UserError, types::User};

use super::config::DB_TABLE_USERS;

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            created TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    hashed_password: &str,
    created: DateTime<Utc>,
) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (name, email, hashed_password, created)
        VALUES (?, ?, ?, ?)
        "#
    ))
    .bind(name)
    .bind(email)
    .bind(hashed_password)
    .bind(created)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub(super) async fn get_user_by_id_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT id, name, email, hashed_password, created FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn get_user_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT id, name, email, hashed_password, created FROM {table_name} WHERE email = ?
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn user_exists_sqlite(pool: &Pool<Sqlite>, id: i64) -> Result<bool, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_scalar::<_, bool>(&format!(
        r#"
        SELECT EXISTS(SELECT 1 FROM {table_name} WHERE id = ?)
        "#
    ))
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_password_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
    hashed_password: &str,
) -> Result<u64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET hashed_password = ? WHERE id = ?
        "#
    ))
    .bind(hashed_password)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

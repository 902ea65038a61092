use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::snippetdb::{errors::SnippetError, types::Snippet};

use super::config::{DB_TABLE_SNIPPETS, LATEST_SNIPPETS_LIMIT};

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(100) NOT NULL,
            content TEXT NOT NULL,
            created TIMESTAMPTZ NOT NULL,
            expires TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{table_name}_created ON {table_name} (created)
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn insert_snippet_postgres(
    pool: &Pool<Postgres>,
    title: &str,
    content: &str,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
) -> Result<i64, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(sqlx::query_scalar::<_, i64>(&format!(
        r#"
        INSERT INTO {table_name} (title, content, created, expires)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#
    ))
    .bind(title)
    .bind(content)
    .bind(created)
    .bind(expires)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn get_snippet_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Snippet>, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(sqlx::query_as::<_, Snippet>(&format!(
        r#"
        SELECT id, title, content, created, expires FROM {table_name}
        WHERE expires > $1 AND id = $2
        "#
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn latest_snippets_postgres(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
) -> Result<Vec<Snippet>, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(sqlx::query_as::<_, Snippet>(&format!(
        r#"
        SELECT id, title, content, created, expires FROM {table_name}
        WHERE expires > $1 ORDER BY id DESC LIMIT $2
        "#
    ))
    .bind(now)
    .bind(LATEST_SNIPPETS_LIMIT)
    .fetch_all(pool)
    .await?)
}

pub(super) async fn count_snippets_postgres(pool: &Pool<Postgres>) -> Result<i64, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table_name}"))
            .fetch_one(pool)
            .await?,
    )
}

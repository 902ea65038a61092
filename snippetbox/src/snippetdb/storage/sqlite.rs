use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::snippetdb::{errors::SnippetError, types::Snippet};

use super::config::{DB_TABLE_SNIPPETS, LATEST_SNIPPETS_LIMIT};

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created TIMESTAMP NOT NULL,
            expires TIMESTAMP NOT NULL
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

pub(super) async fn insert_snippet_sqlite(
    pool: &Pool<Sqlite>,
    title: &str,
    content: &str,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
) -> Result<i64, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (title, content, created, expires)
        VALUES (?, ?, ?, ?)
        "#
    ))
    .bind(title)
    .bind(content)
    .bind(created)
    .bind(expires)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub(super) async fn get_snippet_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Snippet>, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(sqlx::query_as::<_, Snippet>(&format!(
        r#"
        SELECT id, title, content, created, expires FROM {table_name}
        WHERE expires > ? AND id = ?
        "#
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn latest_snippets_sqlite(
    pool: &Pool<Sqlite>,
    now: DateTime<Utc>,
) -> Result<Vec<Snippet>, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(sqlx::query_as::<_, Snippet>(&format!(
        r#"
        SELECT id, title, content, created, expires FROM {table_name}
        WHERE expires > ? ORDER BY id DESC LIMIT ?
        "#
    ))
    .bind(now)
    .bind(LATEST_SNIPPETS_LIMIT)
    .fetch_all(pool)
    .await?)
}

pub(super) async fn count_snippets_sqlite(pool: &Pool<Sqlite>) -> Result<i64, SnippetError> {
    let table_name = DB_TABLE_SNIPPETS.as_str();

    Ok(
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table_name}"))
            .fetch_one(pool)
            .await?,
    )
}

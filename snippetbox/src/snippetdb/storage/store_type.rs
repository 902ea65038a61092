use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::snippetdb::{errors::SnippetError, types::Snippet};
use crate::storage::DataStore;

use super::postgres::*;
use super::sqlite::*;

#[derive(Clone)]
pub struct SnippetStore {
    store: Arc<dyn DataStore>,
}

impl SnippetStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Initialize the snippet tables
    pub async fn init(&self) -> Result<(), SnippetError> {
        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(SnippetError::Storage(
                "Unsupported database type".to_string(),
            )),
        }
    }

    /// Store a snippet that expires `expires_days` from now and return its id.
    #[tracing::instrument(skip(self, content))]
    pub async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i64,
    ) -> Result<i64, SnippetError> {
        let created = Utc::now();
        let expires = created + Duration::days(expires_days);

        let id = if let Some(pool) = self.store.as_sqlite() {
            insert_snippet_sqlite(pool, title, content, created, expires).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_snippet_postgres(pool, title, content, created, expires).await
        } else {
            Err(SnippetError::Storage(
                "Unsupported database type".to_string(),
            ))
        }?;

        tracing::info!(snippet_id = id, "Snippet created");
        Ok(id)
    }

    /// Fetch an unexpired snippet.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Snippet, SnippetError> {
        let now = Utc::now();

        let snippet = if let Some(pool) = self.store.as_sqlite() {
            get_snippet_sqlite(pool, id, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_snippet_postgres(pool, id, now).await
        } else {
            Err(SnippetError::Storage(
                "Unsupported database type".to_string(),
            ))
        }?;

        snippet.ok_or(SnippetError::NotFound)
    }

    /// The ten most recently created unexpired snippets, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn latest(&self) -> Result<Vec<Snippet>, SnippetError> {
        let now = Utc::now();

        if let Some(pool) = self.store.as_sqlite() {
            latest_snippets_sqlite(pool, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            latest_snippets_postgres(pool, now).await
        } else {
            Err(SnippetError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    /// Number of stored snippets, expired ones included.
    pub async fn count(&self) -> Result<i64, SnippetError> {
        if let Some(pool) = self.store.as_sqlite() {
            count_snippets_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            count_snippets_postgres(pool).await
        } else {
            Err(SnippetError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }
}

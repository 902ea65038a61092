//! Shared helpers for unit tests in this crate.

use std::sync::Arc;

use crate::storage::{DataStore, connect_data_store};

/// A private in-memory SQLite database. Every call returns a fresh one.
pub(crate) async fn memory_data_store() -> Arc<dyn DataStore> {
    connect_data_store("sqlite", "sqlite::memory:")
        .await
        .expect("in-memory sqlite store")
}

use std::{env, sync::LazyLock};

use crate::storage::DB_TABLE_PREFIX;

/// Snippets table name
pub(super) static DB_TABLE_SNIPPETS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_SNIPPETS")
        .unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "snippets"))
});

/// Number of snippets shown on the home page.
pub(super) const LATEST_SNIPPETS_LIMIT: i64 = 10;

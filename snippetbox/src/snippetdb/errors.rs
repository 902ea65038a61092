use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum SnippetError {
    #[error("Snippet not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for SnippetError {
    fn from(err: sqlx::Error) -> Self {
        SnippetError::Storage(err.to_string())
    }
}

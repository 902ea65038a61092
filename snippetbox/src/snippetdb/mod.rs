mod errors;
mod storage;
mod types;

pub use errors::SnippetError;
pub use storage::SnippetStore;
pub use types::Snippet;

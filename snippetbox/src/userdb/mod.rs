mod errors;
mod password;
mod storage;
mod types;

pub use errors::UserError;
pub use storage::UserStore;
pub use types::User;

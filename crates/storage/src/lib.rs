pub mod db;
pub mod sessions;
pub mod spreadsheets;
pub mod users;

pub use db::{create_db, DbPool};
pub use sessions::{cleanup_expired_sessions, create_session, delete_session, validate_session, Session};
pub use spreadsheets::{
    add_spreadsheet, delete_spreadsheet, get_user_spreadsheets, user_owns_spreadsheet,
    UserSpreadsheet,
};
pub use users::{authenticate_user, create_user, User};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("username or email already exists")]
    DuplicateUser,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("database error: {0}")]
    Db(String),
}

/// Postgres reports unique-index violations through the driver error text;
/// the SQLite wording is matched as well for local tooling.
pub fn is_unique_violation(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

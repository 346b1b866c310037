use thiserror::Error;

use crate::catalog::ValidationError;
use crate::guidebox::FetchError;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection error: {0}")]
    Connection(#[from] diesel::result::ConnectionError),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("No {kind} found for title {title:?}")]
    NotFound { kind: &'static str, title: String },

    #[error("{kind} {id} does not exist")]
    MissingRow { kind: &'static str, id: i32 },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, StageError>;

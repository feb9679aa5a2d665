// Error types for database and frame operations
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Row has {got} values but the frame has {expected} columns")]
    ColumnCountMismatch { expected: usize, got: usize },

    #[error("Frame has no columns")]
    EmptyFrame,

    #[error("Table '{0}' needs at least one column")]
    NoColumns(String),
}

pub type Result<T> = std::result::Result<T, Error>;

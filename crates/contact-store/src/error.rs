use thiserror::Error;

pub type Result<T, E = StoreError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("import failed at line {line}: {reason}")]
    Import { line: usize, reason: String },
    #[error("invalid column index: {0}")]
    InvalidColumn(String),
    #[error("no contact matches {0:?}")]
    ContactNotFound(String),
    #[error("no data directory available for the default database path")]
    NoDataDir,
}

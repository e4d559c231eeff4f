use thiserror::Error;

/// Failures while reading or writing a save.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("save schema {0} is newer than this build understands")]
    FutureSchema(u32),
    #[error("invalid save key {0:?}")]
    BadKey(String),
}

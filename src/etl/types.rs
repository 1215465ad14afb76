use std::path::PathBuf;

/// Errors that can occur while preparing or loading datasets
#[derive(Debug, thiserror::Error)]
pub enum ETLError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("{orphans} sale(s) reference a missing customer or product")]
    ReferentialIntegrity { orphans: usize },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<csv::Error> for ETLError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ETLError::Io(io),
            _ => ETLError::Parse(message),
        }
    }
}

impl ETLError {
    /// Coarse classification reported to callers of a stage run.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ETLError::NotFound(_) => ErrorKind::NotFound,
            ETLError::Schema(_) => ErrorKind::Schema,
            ETLError::Parse(_) => ErrorKind::Parse,
            ETLError::ReferentialIntegrity { .. } => ErrorKind::ReferentialIntegrity,
            ETLError::Io(_)
            | ETLError::Database(_)
            | ETLError::Connection(_)
            | ETLError::Configuration(_) => ErrorKind::Io,
        }
    }
}

/// Error taxonomy surfaced by [`LoadResult`](super::LoadResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Schema,
    Parse,
    Io,
    ReferentialIntegrity,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Io => "IOError",
            ErrorKind::ReferentialIntegrity => "ReferentialIntegrityError",
        };
        f.write_str(name)
    }
}

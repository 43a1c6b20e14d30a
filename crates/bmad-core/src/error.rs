use thiserror::Error;

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("invalid tier '{0}': expected free, pro, or enterprise")]
    InvalidTier(String),

    #[error("preference store i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference encoding: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] client::ClientError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// Line shown on stderr; client errors use their user-facing text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures that abort the application, as opposed to per-request
/// [`crate::client::ClientError`]s which are surfaced inside the UI.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
}

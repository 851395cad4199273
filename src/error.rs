use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    // Fetcher Errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Engine Errors
    #[error("Upstream payload shape changed: {0}")]
    UpstreamShapeChanged(String),

    // Render Errors
    #[error("Render failed: {0}")]
    RenderFailed(String),

    // Metrics Errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

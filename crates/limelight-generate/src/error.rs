use thiserror::Error;

/// Errors from the generation collaborator. All of them are expected at
/// runtime — the service is network-bound and its output is model text.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

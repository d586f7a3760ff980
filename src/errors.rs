use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{method} {path} failed with status {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("Failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Batch of {size} identifiers exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
}


use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid response shape: {0}")]
    Shape(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Config error: {0}")]
    Config(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("navigation to '{url}' failed: {message}")]
    Navigation { url: String, message: String },

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("ledger authentication failed: {0}")]
    Authentication(String),

    #[error("transient network error: {0}")]
    TransientNetwork(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ledger error: {message}")]
    Ledger { message: String },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

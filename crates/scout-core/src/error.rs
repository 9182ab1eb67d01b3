use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ScoutError {
    /// Returns `true` when the error came from talking to the search API
    /// (network, timeout, bad status, undecodable body) rather than from
    /// local configuration or caller input.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Serialization(_) | Self::RemoteFetch(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;

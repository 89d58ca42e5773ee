use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Expected JSON while fetching {url}")]
    ExpectedJson { url: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("request to remote failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid request header {name}")]
    InvalidHeader { name: String },
    #[error("invalid remote URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// True when the remote did not answer within the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(err) if err.is_timeout())
    }
}

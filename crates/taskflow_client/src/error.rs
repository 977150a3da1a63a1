use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url `{0}`")]
    InvalidBaseUrl(String),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure envelope returned by the server.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of a server-side failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

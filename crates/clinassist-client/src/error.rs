use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("response decode error: {0}")]
    Decode(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::Unauthorized { status, .. } | ClientError::Http { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

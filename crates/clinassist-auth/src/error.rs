use clinassist_client::ClientError;
use clinassist_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Login rejected, or the login call itself could not complete.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

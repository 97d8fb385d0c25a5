use clinassist_auth::AuthError;
use clinassist_client::ClientError;
use clinassist_core::CoreError;
use clinassist_core::models::seance::SeanceStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("seance {seance_id}: cannot move from {from} to {to}")]
    InvalidTransition {
        seance_id: i64,
        from: SeanceStatus,
        to: SeanceStatus,
    },

    #[error("not authenticated")]
    NotAuthenticated,
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Client(e) if e.is_not_found())
    }
}

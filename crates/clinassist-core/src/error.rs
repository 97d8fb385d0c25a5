use thiserror::Error;

use crate::models::seance::SeanceStatus;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid seance transition: {from} -> {to}")]
    InvalidTransition { from: SeanceStatus, to: SeanceStatus },

    #[error("invalid page size: {0}")]
    InvalidPageSize(u32),

    #[error("missing required field: {0}")]
    MissingField(String),
}

use crate::types::ComplaintStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Complaint {0} not found")]
    NotFound(i64),

    #[error("Complaint {id} is already '{current}'")]
    SameStatus { id: i64, current: ComplaintStatus },

    #[error("Invalid transition for complaint {id}: '{from}' -> '{to}'")]
    InvalidTransition {
        id: i64,
        from: ComplaintStatus,
        to: ComplaintStatus,
    },

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

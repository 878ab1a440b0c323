use crate::core::error::{GameSetupError, MoveError};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{service} service is unavailable")]
    Unavailable { service: &'static str },

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Setup(#[from] GameSetupError),
}

impl ServiceError {
    /// Only environment failures are worth retrying; contract errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Unavailable { .. })
    }
}

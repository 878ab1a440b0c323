use crate::core::{board::BoardLoadError, error::MoveError};
use crate::service::ServiceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a move is already in progress")]
    MoveInFlight,

    #[error("the game changed before the move could be applied")]
    Superseded,

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("failed to load board")]
    Board(#[from] BoardLoadError),
}

impl SessionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Service(err) => err.is_retryable(),
            _ => false,
        }
    }
}

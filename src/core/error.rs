use crate::core::game_state::GameStatus;
use thiserror::Error;

/// Contract violations when resolving a move. None of these are retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game is {status}, moves are only accepted while playing")]
    NotPlaying { status: GameStatus },

    #[error("it is player {expected}'s turn, not player {provided}'s")]
    WrongPlayer { expected: usize, provided: usize },

    #[error("dice roll {0} is outside 1..=6")]
    DiceOutOfRange(u8),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameSetupError {
    #[error("a game needs at least one player")]
    EmptyRoster,
}

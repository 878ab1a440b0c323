use crate::core::{game_state::GameState, move_outcome::MoveOutcome};
use serde::Serialize;

/// Notifications published by a [`GameSession`](super::GameSession).
///
/// Delivery is best-effort; a subscriber that falls behind the channel
/// capacity skips the oldest events.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    GameStarted {
        generation: u64,
        state: GameState,
    },
    GameReset {
        generation: u64,
    },
    DiceRolled {
        player_index: usize,
        roll: u8,
    },
    PlayerMoved {
        outcome: MoveOutcome,
    },
    GameWon {
        winner_index: usize,
        winner: String,
    },
    AiTurnScheduled {
        player_index: usize,
        delay_ms: u64,
    },
}

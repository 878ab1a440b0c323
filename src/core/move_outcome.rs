use crate::core::{cell::CellType, game_state::GameState};
use serde::{Deserialize, Serialize};
use std::fmt;
use tsify::Tsify;

/// What happened when one player's roll was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub player_index: usize,
    pub dice_roll: u8,
    pub start_position: u32,
    pub final_position: u32,
    pub overshoot: bool,
    pub had_special_effect: bool,
    pub effect_type: Option<CellType>,
    pub won_game: bool,
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        self.final_position != self.start_position
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P{} rolled {}: {}->{}",
            self.player_index + 1,
            self.dice_roll,
            self.start_position,
            self.final_position
        )?;

        if self.overshoot {
            f.write_str(" (overshoot)")?;
        }
        if let Some(effect_type) = self.effect_type {
            write!(f, " ({effect_type})")?;
        }
        if self.won_game {
            f.write_str(" WIN")?;
        }

        Ok(())
    }
}

/// Reply shape of the game service's `movePlayer`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub new_position: u32,
    pub had_snake_or_ladder: bool,
    pub snake_or_ladder: Option<CellType>,
    pub game_state: GameState,
    pub outcome: MoveOutcome,
}

impl MoveResult {
    pub fn new(outcome: MoveOutcome, game_state: GameState) -> Self {
        Self {
            new_position: outcome.final_position,
            had_snake_or_ladder: outcome.had_special_effect,
            snake_or_ladder: outcome.effect_type,
            game_state,
            outcome,
        }
    }
}

use crate::core::{error::GameSetupError, player::Player, player::PlayerId, rule_helper};
use serde::{Deserialize, Serialize};
use std::fmt;
use tsify::Tsify;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
    Won,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Playing => "playing",
            GameStatus::Won => "won",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_player_index: usize,
    pub player_positions: Vec<u32>,
    pub status: GameStatus,
    pub turn_count: u32,
    pub last_dice_roll: Option<u8>,
    pub players: Vec<Player>,
    pub winner_index: Option<usize>,
}

impl GameState {
    /// The template a session holds before any game is started.
    pub fn waiting() -> Self {
        Self::default()
    }

    /// Fresh game for `roster`; player ids are reassigned to roster order.
    pub fn start(roster: impl IntoIterator<Item = Player>) -> Result<Self, GameSetupError> {
        let players = roster
            .into_iter()
            .enumerate()
            .map(|(idx, player)| player.with_id(PlayerId(idx as u32)))
            .collect::<Vec<_>>();

        if players.is_empty() {
            return Err(GameSetupError::EmptyRoster);
        }

        Ok(GameState {
            current_player_index: 0,
            player_positions: vec![rule_helper::START_POSITION; players.len()],
            status: GameStatus::Playing,
            turn_count: 0,
            last_dice_roll: None,
            players,
            winner_index: None,
        })
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn has_winner(&self) -> bool {
        self.status == GameStatus::Won
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner_index.and_then(|idx| self.players.get(idx))
    }

    /// True when the game is running and waiting on an AI player.
    pub fn awaits_ai_turn(&self) -> bool {
        self.is_playing() && self.current_player().is_some_and(|player| player.is_ai)
    }

    pub fn position_of(&self, player_index: usize) -> Option<u32> {
        self.player_positions.get(player_index).copied()
    }

    pub fn player_text(&self, player_index: usize) -> String {
        self.players
            .get(player_index)
            .map(|player| player.to_string())
            .unwrap_or_else(|| format!("P{}", player_index + 1))
    }

    pub fn summary(&self, indentation_level: usize) -> String {
        let leading_text = " ".repeat(indentation_level);
        let mut sb = format!(
            "{leading_text}Turn {}, {}, LastRoll={}",
            self.turn_count,
            self.status,
            self.last_dice_roll
                .map(|roll| roll.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );

        for (idx, position) in self.player_positions.iter().enumerate() {
            sb.push_str(&format!(
                "\n{leading_text}  {}@{}",
                self.player_text(idx),
                position
            ));

            if self.is_playing() && idx == self.current_player_index {
                sb.push_str(" *");
            }

            if self.winner_index == Some(idx) {
                sb.push_str(" WON");
            }
        }

        sb
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary(0))
    }
}

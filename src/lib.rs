use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod core;
pub mod util;

#[cfg(not(target_arch = "wasm32"))]
pub mod service;
#[cfg(not(target_arch = "wasm32"))]
pub mod session;

use crate::core::{
    board::Board,
    dice::DiceRoller,
    game_state::GameState,
    move_outcome::{MoveOutcome, MoveResult},
    player::{self, Player},
    turn_engine,
};

const DEFAULT_AI_THINK_DELAY_MS: u32 = 2000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveReply {
    is_valid: bool,
    validation_message: String,
    result: Option<MoveResult>,
}

fn to_move_reply_json(reply: &MoveReply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|_| {
        "{\"isValid\":false,\"validationMessage\":\"Move serialization failed.\",\"result\":null}"
            .to_string()
    })
}

fn invalid_move_json(message: String) -> String {
    to_move_reply_json(&MoveReply {
        is_valid: false,
        validation_message: message,
        result: None,
    })
}

fn parse_roster(roster_json: &str) -> Result<Vec<Player>, String> {
    let trimmed = roster_json.trim();
    if trimmed.is_empty() {
        return Ok(player::default_roster());
    }

    serde_json::from_str::<Vec<Player>>(trimmed).map_err(|err| format!("Invalid roster JSON: {err}"))
}

#[cfg(target_arch = "wasm32")]
fn default_dice() -> Box<dyn DiceRoller> {
    Box::new(crate::core::dice::JsDice)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_dice() -> Box<dyn DiceRoller> {
    Box::new(crate::core::dice::RandDice::from_entropy())
}

/// Browser-side game. JS owns the timers; the handle owns the rules.
///
/// Every new game or reset bumps `generation`. A timer that fires for an AI
/// turn hands back the generation it was started under, and stale timers are
/// refused by [`LadderRushHandle::play_ai_turn`].
#[wasm_bindgen]
pub struct LadderRushHandle {
    board: Board,
    state: GameState,
    roster: Vec<Player>,
    history: Vec<MoveOutcome>,
    generation: u32,
    ai_think_delay_ms: u32,
    dice: Box<dyn DiceRoller>,
}

impl LadderRushHandle {
    fn with_board(board: Board, dice: Box<dyn DiceRoller>) -> Self {
        Self {
            board,
            state: GameState::waiting(),
            roster: player::default_roster(),
            history: Vec::new(),
            generation: 0,
            ai_think_delay_ms: DEFAULT_AI_THINK_DELAY_MS,
            dice,
        }
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.history.clear();
    }

    fn apply_move(&mut self, player_index: usize, dice_roll: u8) -> Result<MoveResult, String> {
        let (next, outcome) = turn_engine::resolve_move(&self.board, &self.state, player_index, dice_roll)
            .map_err(|err| err.to_string())?;
        self.state = next;
        self.history.push(outcome);
        Ok(MoveResult::new(outcome, self.state.clone()))
    }

    fn move_reply(&mut self, player_index: usize, dice_roll: u8) -> String {
        match self.apply_move(player_index, dice_roll) {
            Ok(result) => to_move_reply_json(&MoveReply {
                is_valid: true,
                validation_message: String::new(),
                result: Some(result),
            }),
            Err(message) => invalid_move_json(message),
        }
    }
}

#[wasm_bindgen]
impl LadderRushHandle {
    pub fn summary(&self, indentation_level: usize) -> String {
        self.state.summary(indentation_level)
    }

    #[wasm_bindgen(js_name = "boardName")]
    pub fn board_name(&self) -> String {
        self.board.name.clone()
    }

    #[wasm_bindgen(js_name = "gameStateJson")]
    pub fn game_state_json(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = "gameState")]
    pub fn game_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.state).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[wasm_bindgen(js_name = "hasWinner")]
    pub fn has_winner(&self) -> bool {
        self.state.has_winner()
    }

    #[wasm_bindgen(js_name = "currentPlayerIsAi")]
    pub fn current_player_is_ai(&self) -> bool {
        self.state.awaits_ai_turn()
    }

    #[wasm_bindgen(js_name = "aiThinkDelayMs")]
    pub fn ai_think_delay_ms(&self) -> u32 {
        self.ai_think_delay_ms
    }

    #[wasm_bindgen(js_name = "setAiThinkDelayMs")]
    pub fn set_ai_think_delay_ms(&mut self, delay_ms: u32) {
        self.ai_think_delay_ms = delay_ms;
    }

    /// Roster used by `startNewGame("")`, as JSON.
    #[wasm_bindgen(js_name = "rosterJson")]
    pub fn roster_json(&self) -> String {
        serde_json::to_string(&self.roster).unwrap_or_else(|_| "[]".to_string())
    }

    /// Returns an empty string on success, otherwise the reason the roster was refused.
    #[wasm_bindgen(js_name = "setRoster")]
    pub fn set_roster(&mut self, roster_json: &str) -> String {
        match parse_roster(roster_json) {
            Ok(roster) => {
                self.roster = roster;
                String::new()
            }
            Err(message) => message,
        }
    }

    /// Starts a game with `roster_json`, or with the stored roster when it is empty.
    #[wasm_bindgen(js_name = "startNewGame")]
    pub fn start_new_game(&mut self, roster_json: &str) -> String {
        let roster = if roster_json.trim().is_empty() {
            self.roster.clone()
        } else {
            match parse_roster(roster_json) {
                Ok(roster) => roster,
                Err(message) => return message,
            }
        };

        match GameState::start(roster) {
            Ok(state) => {
                self.bump_generation();
                self.state = state;
                String::new()
            }
            Err(err) => err.to_string(),
        }
    }

    #[wasm_bindgen(js_name = "resetGame")]
    pub fn reset_game(&mut self) {
        self.bump_generation();
        self.state = GameState::waiting();
    }

    #[wasm_bindgen(js_name = "rollDice")]
    pub fn roll_dice(&mut self) -> u8 {
        let roll = self.dice.roll();
        if self.state.is_playing() {
            self.state.last_dice_roll = Some(roll);
        }
        roll
    }

    #[wasm_bindgen(js_name = "validateMove")]
    pub fn validate_move(&self, player_index: usize, dice_roll: u8) -> String {
        match turn_engine::check_move(&self.state, player_index, dice_roll) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        }
    }

    #[wasm_bindgen(js_name = "movePlayer")]
    pub fn move_player(&mut self, player_index: usize, dice_roll: u8) -> String {
        self.move_reply(player_index, dice_roll)
    }

    #[wasm_bindgen(js_name = "rollAndMove")]
    pub fn roll_and_move(&mut self) -> String {
        if let Err(err) = turn_engine::check_move(
            &self.state,
            self.state.current_player_index,
            crate::core::rule_helper::DICE_MIN,
        ) {
            return invalid_move_json(err.to_string());
        }

        let roll = self.roll_dice();
        self.move_reply(self.state.current_player_index, roll)
    }

    /// Plays the AI's turn if `generation` is still current and an AI is up.
    #[wasm_bindgen(js_name = "playAiTurn")]
    pub fn play_ai_turn(&mut self, generation: u32) -> String {
        if generation != self.generation {
            return invalid_move_json(format!(
                "AI turn was scheduled for game {generation}, current game is {}.",
                self.generation
            ));
        }
        if !self.state.awaits_ai_turn() {
            return invalid_move_json("It is not an AI player's turn.".to_string());
        }

        self.roll_and_move()
    }

    #[wasm_bindgen(js_name = "historyJson")]
    pub fn history_json(&self) -> String {
        serde_json::to_string(&self.history).unwrap_or_else(|_| "[]".to_string())
    }

    /// Configured cells only.
    #[wasm_bindgen(js_name = "boardCellsJson")]
    pub fn board_cells_json(&self) -> String {
        let cells = self.board.cells.values().collect::<Vec<_>>();
        serde_json::to_string(&cells).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = "snakesAndLaddersJson")]
    pub fn snakes_and_ladders_json(&self) -> String {
        serde_json::to_string(&self.board.snakes_and_ladders()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Cell JSON for `number`, or an empty string when the board has no such cell.
    #[wasm_bindgen(js_name = "cellByNumber")]
    pub fn cell_by_number(&self, number: u32) -> String {
        self.board
            .cell_by_number(number)
            .and_then(|cell| serde_json::to_string(&cell).ok())
            .unwrap_or_default()
    }

    /// Like `cellByNumber`, but unconfigured numbers come back as plain cells.
    #[wasm_bindgen(js_name = "lookupCell")]
    pub fn lookup_cell(&self, number: u32) -> String {
        serde_json::to_string(&self.board.lookup_cell(number)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Cell numbers in display order, ten per row, top row first.
    #[wasm_bindgen(js_name = "gridCellNumbers")]
    pub fn grid_cell_numbers(&self) -> Vec<u32> {
        Board::grid_rows().into_iter().flatten().collect::<Vec<_>>()
    }
}

#[wasm_bindgen(js_name = "newLadderRushGame")]
pub fn new_ladder_rush_game() -> LadderRushHandle {
    LadderRushHandle::with_board(Board::classic(), default_dice())
}

#[wasm_bindgen(js_name = "newLadderRushGameFromBoardJson")]
pub fn new_ladder_rush_game_from_board_json(board_json: &str) -> Result<LadderRushHandle, JsValue> {
    let board = Board::from_json_str(board_json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(LadderRushHandle::with_board(board, default_dice()))
}

pub mod board;
pub mod cell;
pub mod dice;
pub mod error;
pub mod game_state;
pub mod move_outcome;
pub mod player;
pub mod rule_helper;
pub mod turn_engine;

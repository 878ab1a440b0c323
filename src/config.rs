//! Session configuration: simulated service latencies, AI pacing, board file.
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

/// Simulated latency of each mock service call, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceLatency {
    pub get_state_ms: u64,
    pub start_game_ms: u64,
    pub roll_dice_ms: u64,
    pub move_player_ms: u64,
    /// Extra pause after a snake or ladder, for its animation.
    pub special_cell_ms: u64,
    pub reset_game_ms: u64,
    pub board_list_ms: u64,
    pub cell_lookup_ms: u64,
    pub player_read_ms: u64,
    pub player_write_ms: u64,
}

impl ServiceLatency {
    pub fn none() -> Self {
        Self {
            get_state_ms: 0,
            start_game_ms: 0,
            roll_dice_ms: 0,
            move_player_ms: 0,
            special_cell_ms: 0,
            reset_game_ms: 0,
            board_list_ms: 0,
            cell_lookup_ms: 0,
            player_read_ms: 0,
            player_write_ms: 0,
        }
    }

    pub fn get_state(&self) -> Duration {
        Duration::from_millis(self.get_state_ms)
    }

    pub fn start_game(&self) -> Duration {
        Duration::from_millis(self.start_game_ms)
    }

    pub fn roll_dice(&self) -> Duration {
        Duration::from_millis(self.roll_dice_ms)
    }

    pub fn move_player(&self) -> Duration {
        Duration::from_millis(self.move_player_ms)
    }

    pub fn special_cell(&self) -> Duration {
        Duration::from_millis(self.special_cell_ms)
    }

    pub fn reset_game(&self) -> Duration {
        Duration::from_millis(self.reset_game_ms)
    }

    pub fn board_list(&self) -> Duration {
        Duration::from_millis(self.board_list_ms)
    }

    pub fn cell_lookup(&self) -> Duration {
        Duration::from_millis(self.cell_lookup_ms)
    }

    pub fn player_read(&self) -> Duration {
        Duration::from_millis(self.player_read_ms)
    }

    pub fn player_write(&self) -> Duration {
        Duration::from_millis(self.player_write_ms)
    }
}

impl Default for ServiceLatency {
    fn default() -> Self {
        Self {
            get_state_ms: 200,
            start_game_ms: 300,
            roll_dice_ms: 1000,
            move_player_ms: 500,
            special_cell_ms: 800,
            reset_game_ms: 200,
            board_list_ms: 200,
            cell_lookup_ms: 100,
            player_read_ms: 200,
            player_write_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub latency: ServiceLatency,
    /// Pause before an AI player rolls on its own.
    pub ai_think_delay_ms: u64,
    /// Board JSON to load instead of the built-in board.
    pub board_path: Option<PathBuf>,
    /// Event buffer per subscriber.
    pub event_capacity: usize,
}

impl SessionConfig {
    /// No latency and no AI pause; used by tests and headless runs.
    pub fn instant() -> Self {
        Self {
            latency: ServiceLatency::none(),
            ai_think_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn ai_think_delay(&self) -> Duration {
        Duration::from_millis(self.ai_think_delay_ms)
    }

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LADDER_RUSH_INSTANT` - any value other than `0`/`false` drops all latency
    /// - `LADDER_RUSH_AI_THINK_MS` - AI pause before rolling (default: 2000)
    /// - `LADDER_RUSH_DICE_MS` - dice animation time (default: 1000)
    /// - `LADDER_RUSH_MOVE_MS` - move latency (default: 500)
    /// - `LADDER_RUSH_SPECIAL_MS` - snake/ladder animation time (default: 800)
    /// - `LADDER_RUSH_BOARD` - path to a board JSON file
    pub fn from_env() -> Self {
        let mut config = if read_env_flag("LADDER_RUSH_INSTANT") {
            Self::instant()
        } else {
            Self::default()
        };

        if let Some(ms) = read_env::<u64>("LADDER_RUSH_AI_THINK_MS") {
            config.ai_think_delay_ms = ms;
        }
        if let Some(ms) = read_env::<u64>("LADDER_RUSH_DICE_MS") {
            config.latency.roll_dice_ms = ms;
        }
        if let Some(ms) = read_env::<u64>("LADDER_RUSH_MOVE_MS") {
            config.latency.move_player_ms = ms;
        }
        if let Some(ms) = read_env::<u64>("LADDER_RUSH_SPECIAL_MS") {
            config.latency.special_cell_ms = ms;
        }
        if let Some(path) = read_env::<PathBuf>("LADDER_RUSH_BOARD") {
            config.board_path = Some(path);
        }

        config
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            latency: ServiceLatency::default(),
            ai_think_delay_ms: 2000,
            board_path: None,
            event_capacity: 64,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config json")]
    Json(#[from] serde_json::Error),
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false"))
        .unwrap_or(false)
}

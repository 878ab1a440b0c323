use super::{Availability, ServiceError, simulate_latency};
use crate::config::ServiceLatency;
use crate::core::{
    board::Board,
    dice::DiceRoller,
    game_state::GameState,
    move_outcome::MoveResult,
    player::Player,
    turn_engine,
};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Holds the one authoritative [`GameState`] and resolves moves against it.
pub struct GameService {
    board: Arc<Board>,
    state: Mutex<GameState>,
    dice: StdMutex<Box<dyn DiceRoller>>,
    latency: ServiceLatency,
    ai_think_delay: Duration,
    availability: Availability,
}

impl GameService {
    pub fn new(
        board: Arc<Board>,
        dice: Box<dyn DiceRoller>,
        latency: ServiceLatency,
        ai_think_delay: Duration,
    ) -> Self {
        Self {
            board,
            state: Mutex::new(GameState::waiting()),
            dice: StdMutex::new(dice),
            latency,
            ai_think_delay,
            availability: Availability::new("game"),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.availability.set_online(online);
    }

    /// Current state without simulated latency.
    pub async fn snapshot(&self) -> GameState {
        self.state.lock().await.clone()
    }

    pub async fn get_game_state(&self) -> Result<GameState, ServiceError> {
        simulate_latency(self.latency.get_state()).await;
        self.availability.check()?;
        Ok(self.snapshot().await)
    }

    pub async fn start_new_game(&self, players: Vec<Player>) -> Result<GameState, ServiceError> {
        simulate_latency(self.latency.start_game()).await;
        self.availability.check()?;
        let fresh = GameState::start(players)?;
        *self.state.lock().await = fresh.clone();
        info!(num_players = fresh.num_players(), "new game started");
        Ok(fresh)
    }

    /// Rolls the die; while a game is running the roll is recorded as the last one.
    pub async fn roll_dice(&self) -> Result<u8, ServiceError> {
        simulate_latency(self.latency.roll_dice()).await;
        self.availability.check()?;
        let roll = self.roll();
        let mut state = self.state.lock().await;
        if state.is_playing() {
            state.last_dice_roll = Some(roll);
        }
        debug!(roll, "dice rolled");
        Ok(roll)
    }

    /// Moves the current player by `dice_roll`.
    ///
    /// The new state is committed in one step. The pause for a snake or ladder
    /// comes after the commit.
    pub async fn move_player(
        &self,
        player_index: usize,
        dice_roll: u8,
    ) -> Result<MoveResult, ServiceError> {
        simulate_latency(self.latency.move_player()).await;
        self.availability.check()?;

        let result = {
            let mut state = self.state.lock().await;
            let (next, outcome) =
                turn_engine::resolve_move(&self.board, &state, player_index, dice_roll)?;
            *state = next.clone();
            MoveResult::new(outcome, next)
        };

        debug!(outcome = %result.outcome, "move resolved");
        if result.had_snake_or_ladder {
            simulate_latency(self.latency.special_cell()).await;
        }

        Ok(result)
    }

    /// AI players just think for a while and then roll.
    pub async fn get_ai_move(&self) -> Result<u8, ServiceError> {
        simulate_latency(self.ai_think_delay).await;
        self.roll_dice().await
    }

    pub async fn reset_game(&self) -> Result<GameState, ServiceError> {
        simulate_latency(self.latency.reset_game()).await;
        self.availability.check()?;
        let waiting = GameState::waiting();
        *self.state.lock().await = waiting.clone();
        info!("game reset");
        Ok(waiting)
    }

    fn roll(&self) -> u8 {
        match self.dice.lock() {
            Ok(mut dice) => dice.roll(),
            Err(poisoned) => poisoned.into_inner().roll(),
        }
    }
}

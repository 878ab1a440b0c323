//! One running game: ties the services together, serialises moves and
//! drives AI players.
//!
//! A session keeps a generation counter that moves forward on every new game
//! and every reset. Anything scheduled for an older generation (a pending AI
//! turn, a move waiting to be applied) notices the change and drops out
//! instead of touching the new game.

mod error;
mod events;

pub use error::{Result, SessionError};
pub use events::SessionEvent;

use crate::config::SessionConfig;
use crate::core::{
    board::Board,
    cell::Cell,
    dice::{DiceRoller, RandDice},
    game_state::GameState,
    move_outcome::{MoveOutcome, MoveResult},
    player::Player,
    rule_helper, turn_engine,
};
use crate::service::{BoardService, GameService, PlayerService};
use crate::util::cancellation::{
    AtomicCancellationToken, CancellationToken, EitherToken, GenerationToken,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{Mutex, Notify, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything a front end needs to draw the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub state: GameState,
    pub cells: Vec<Cell>,
}

/// Identifies the exact turn an AI move was scheduled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct TurnTicket {
    generation: u64,
    turn_count: u32,
}

struct PendingAiTurn {
    ticket: TurnTicket,
    token: Arc<AtomicCancellationToken>,
    handle: JoinHandle<()>,
}

impl PendingAiTurn {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

struct SessionInner {
    games: GameService,
    boards: BoardService,
    players: PlayerService,
    config: SessionConfig,
    generation: AtomicU64,
    move_in_flight: AtomicBool,
    move_finished: Notify,
    apply_lock: Mutex<()>,
    pending_ai: StdMutex<Option<PendingAiTurn>>,
    history: StdMutex<Vec<MoveOutcome>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Cheap to clone; all clones drive the same game.
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<SessionInner>,
}

impl GameSession {
    pub fn new(board: Board, dice: Box<dyn DiceRoller>, config: SessionConfig) -> Self {
        let board = Arc::new(board);
        let latency = config.latency.clone();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let inner = SessionInner {
            games: GameService::new(
                Arc::clone(&board),
                dice,
                latency.clone(),
                config.ai_think_delay(),
            ),
            boards: BoardService::new(board, latency.clone()),
            players: PlayerService::new(crate::core::player::default_roster(), latency),
            config,
            generation: AtomicU64::new(0),
            move_in_flight: AtomicBool::new(false),
            move_finished: Notify::new(),
            apply_lock: Mutex::new(()),
            pending_ai: StdMutex::new(None),
            history: StdMutex::new(Vec::new()),
            events,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Session over the configured board file (or the classic board) with real dice.
    pub fn from_config(config: SessionConfig) -> Result<Self> {
        let board = match &config.board_path {
            Some(path) => Board::from_json_file(path)?,
            None => Board::classic(),
        };
        info!(board = %board.name, cells = board.cells.len(), "board loaded");
        Ok(Self::new(board, Box::new(RandDice::from_entropy()), config))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn games(&self) -> &GameService {
        &self.inner.games
    }

    pub fn boards(&self) -> &BoardService {
        &self.inner.boards
    }

    pub fn players(&self) -> &PlayerService {
        &self.inner.players
    }

    pub fn board(&self) -> &Board {
        self.inner.boards.board()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn is_move_in_flight(&self) -> bool {
        self.inner.move_in_flight.load(Ordering::SeqCst)
    }

    pub fn has_pending_ai_turn(&self) -> bool {
        self.lock_pending().is_some()
    }

    /// Fetches game state and board in parallel; fails if either does.
    pub async fn load(&self) -> Result<SessionSnapshot> {
        let (state, cells) =
            tokio::try_join!(self.inner.games.get_game_state(), self.inner.boards.get_all())?;
        Ok(SessionSnapshot { state, cells })
    }

    /// [`load`](Self::load), retrying retryable failures with a linear back-off.
    pub async fn load_with_retry(
        &self,
        max_attempts: u32,
        backoff: Duration,
    ) -> Result<SessionSnapshot> {
        let mut attempt = 1;
        loop {
            match self.load().await {
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, error = %err, "load failed, retrying");
                    tokio::time::sleep(backoff * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Authoritative state, without simulated latency.
    pub async fn state(&self) -> GameState {
        self.inner.games.snapshot().await
    }

    pub fn history(&self) -> Vec<MoveOutcome> {
        self.lock_history().clone()
    }

    /// Starts over with `roster`. Pending AI turns and moves of the previous
    /// game are abandoned once the game service has accepted the new game; a
    /// rejected start leaves the running game untouched.
    pub async fn start_new_game(&self, roster: Vec<Player>) -> Result<GameState> {
        let apply_guard = self.inner.apply_lock.lock().await;
        let state = self.inner.games.start_new_game(roster).await?;
        self.cancel_pending_ai();
        let generation = self.bump_generation();

        info!(generation, players = state.num_players(), "game started");
        self.emit(SessionEvent::GameStarted {
            generation,
            state: state.clone(),
        });

        drop(apply_guard);
        self.schedule_ai_turn_if_needed(&state, generation);
        Ok(state)
    }

    /// New game with the player service's current roster.
    pub async fn new_game(&self) -> Result<GameState> {
        let roster = self.inner.players.get_all().await?;
        self.start_new_game(roster).await
    }

    pub async fn reset_game(&self) -> Result<GameState> {
        let _apply_guard = self.inner.apply_lock.lock().await;
        let state = self.inner.games.reset_game().await?;
        self.cancel_pending_ai();
        let generation = self.bump_generation();

        info!(generation, "game reset");
        self.emit(SessionEvent::GameReset { generation });
        Ok(state)
    }

    /// Rolls for the current player and moves them. Cancels a pending AI turn,
    /// so a human can play the AI's roll during its think delay.
    pub async fn roll_and_move(&self) -> Result<MoveResult> {
        self.play_turn(None).await
    }

    async fn play_turn(&self, ticket: Option<TurnTicket>) -> Result<MoveResult> {
        let in_flight =
            InFlightGuard::acquire(&self.inner.move_in_flight, &self.inner.move_finished)
                .ok_or(SessionError::MoveInFlight)?;
        let generation = self.generation();
        let state = self.inner.games.snapshot().await;

        match ticket {
            None => self.cancel_pending_ai(),
            Some(ticket) => {
                let still_due = ticket.generation == generation
                    && ticket.turn_count == state.turn_count
                    && state.awaits_ai_turn();
                if !still_due {
                    return Err(SessionError::Superseded);
                }
            }
        }

        let player_index = state.current_player_index;
        turn_engine::check_move(&state, player_index, rule_helper::DICE_MIN)?;

        let roll = self.inner.games.roll_dice().await?;
        self.emit(SessionEvent::DiceRolled { player_index, roll });

        let apply_guard = self.inner.apply_lock.lock().await;
        if self.generation() != generation {
            debug!(generation, "move dropped, game changed");
            return Err(SessionError::Superseded);
        }

        let result = self.inner.games.move_player(player_index, roll).await?;
        let outcome = result.outcome;
        self.lock_history().push(outcome);
        info!(%outcome, "player moved");
        self.emit(SessionEvent::PlayerMoved { outcome });

        if outcome.won_game {
            let winner = result.game_state.player_text(player_index);
            info!(%winner, turns = result.game_state.turn_count, "game won");
            self.emit(SessionEvent::GameWon {
                winner_index: player_index,
                winner,
            });
        }

        drop(apply_guard);
        drop(in_flight);
        self.schedule_ai_turn_if_needed(&result.game_state, generation);
        Ok(result)
    }

    fn schedule_ai_turn_if_needed(&self, state: &GameState, generation: u64) {
        if !state.awaits_ai_turn() || self.generation() != generation {
            return;
        }

        let ticket = TurnTicket {
            generation,
            turn_count: state.turn_count,
        };
        let delay = self.inner.config.ai_think_delay();
        let token = Arc::new(AtomicCancellationToken::new());

        // The slot stays locked until the task is registered, so even a task
        // that starts immediately finds its own ticket there.
        let mut slot = self.lock_pending();
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let session = self.clone();
        let task_token = Arc::clone(&token);
        let handle = tokio::spawn(async move {
            session.run_ai_turn(ticket, task_token, delay).await;
        });
        *slot = Some(PendingAiTurn {
            ticket,
            token,
            handle,
        });
        drop(slot);

        debug!(player = state.current_player_index, ?delay, "AI turn scheduled");
        self.emit(SessionEvent::AiTurnScheduled {
            player_index: state.current_player_index,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        });
    }

    async fn run_ai_turn(
        &self,
        ticket: TurnTicket,
        token: Arc<AtomicCancellationToken>,
        delay: Duration,
    ) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        {
            let stale = GenerationToken::new(ticket.generation, &self.inner.generation);
            if EitherToken::new(token.as_ref(), &stale).is_cancellation_requested() {
                debug!(generation = stale.issued_for(), "AI turn cancelled");
                return;
            }

            let mut slot = self.lock_pending();
            if !slot.as_ref().is_some_and(|pending| pending.ticket == ticket) {
                return;
            }
            slot.take();
        }

        loop {
            // Registered before trying, so a move finishing in between still wakes us.
            let move_finished = self.inner.move_finished.notified();
            tokio::pin!(move_finished);
            move_finished.as_mut().enable();

            match self.play_turn(Some(ticket)).await {
                Ok(_) => return,
                Err(SessionError::MoveInFlight) => {
                    debug!(turn = ticket.turn_count, "AI turn waiting for the move in flight");
                    move_finished.await;
                }
                Err(SessionError::Superseded) => {
                    debug!("AI turn superseded");
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "AI turn failed");
                    return;
                }
            }
        }
    }

    fn cancel_pending_ai(&self) {
        if let Some(pending) = self.lock_pending().take() {
            debug!(turn = pending.ticket.turn_count, "cancelling pending AI turn");
            pending.cancel();
        }
    }

    fn bump_generation(&self) -> u64 {
        self.lock_history().clear();
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn emit(&self, event: SessionEvent) {
        if self.inner.events.send(event).is_err() {
            tracing::trace!("no session event subscribers");
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingAiTurn>> {
        self.inner
            .pending_ai
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<MoveOutcome>> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds the single-move slot; released on drop, including on early return.
/// Releasing wakes everyone waiting on `finished`.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    finished: &'a Notify,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, finished: &'a Notify) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag, finished })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.finished.notify_waiters();
    }
}

//! End-to-end session tests over the in-memory services.

use ladder_rush_rust::config::SessionConfig;
use ladder_rush_rust::core::{
    board::Board,
    dice::ScriptedDice,
    error::MoveError,
    game_state::{GameState, GameStatus},
    player::{Player, PlayerId},
};
use ladder_rush_rust::session::{GameSession, SessionError, SessionEvent};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{sleep, timeout};

const WAIT_LIMIT: Duration = Duration::from_secs(5);

fn human(name: &str) -> Player {
    Player::human(PlayerId(0), name, "#FF6B6B")
}

fn ai(name: &str) -> Player {
    Player::ai(PlayerId(0), name, "#4ECDC4")
}

fn session_with(board: Board, rolls: &[u8], config: SessionConfig) -> GameSession {
    GameSession::new(board, Box::new(ScriptedDice::new(rolls.to_vec())), config)
}

fn instant_session(rolls: &[u8]) -> GameSession {
    session_with(Board::classic(), rolls, SessionConfig::instant())
}

fn slow_ai_config() -> SessionConfig {
    SessionConfig {
        ai_think_delay_ms: 200,
        ..SessionConfig::instant()
    }
}

async fn wait_until(session: &GameSession, done: impl Fn(&GameState) -> bool) -> GameState {
    timeout(WAIT_LIMIT, async {
        loop {
            let state = session.state().await;
            if done(&state) && !session.is_move_in_flight() {
                return state;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session never reached the expected state")
}

/// Test that a reset followed by a new game gives a clean start.
#[tokio::test]
async fn test_reset_then_start_is_clean() {
    let session = instant_session(&[4]);
    session.start_new_game(vec![human("A"), human("B")]).await.unwrap();
    session.roll_and_move().await.unwrap();

    session.reset_game().await.unwrap();
    let state = session
        .start_new_game(vec![human("A"), human("B")])
        .await
        .unwrap();

    assert_eq!(state.player_positions, vec![0, 0]);
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.turn_count, 0);
    assert_eq!(state.current_player_index, 0);
    assert_eq!(state.last_dice_roll, None);
    assert_eq!(
        state.players.iter().map(|player| player.id).collect::<Vec<_>>(),
        vec![PlayerId(0), PlayerId(1)]
    );
}

/// Test that only one move can be in flight at a time.
#[tokio::test]
async fn test_second_move_is_rejected_while_first_is_in_flight() {
    let mut config = SessionConfig::instant();
    config.latency.move_player_ms = 200;
    let session = session_with(Board::classic(), &[2], config);
    session.start_new_game(vec![human("A"), human("B")]).await.unwrap();

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.roll_and_move().await }
    });
    sleep(Duration::from_millis(50)).await;
    assert!(session.is_move_in_flight());

    let second = session.roll_and_move().await;
    assert!(matches!(second, Err(SessionError::MoveInFlight)));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.game_state.player_positions, vec![2, 0]);
    assert!(!session.is_move_in_flight());
    assert_eq!(session.state().await.turn_count, 1);
}

/// Test that AI turns chain until a human is up again.
#[tokio::test]
async fn test_ai_turns_chain_until_human_turn() {
    let session = instant_session(&[2]);
    session
        .start_new_game(vec![human("A"), ai("B"), ai("C")])
        .await
        .unwrap();

    session.roll_and_move().await.unwrap();
    let state = wait_until(&session, |state| state.turn_count == 3).await;

    assert_eq!(state.current_player_index, 0);
    assert_eq!(state.player_positions, vec![2, 2, 2]);
    sleep(Duration::from_millis(50)).await;
    assert!(!session.has_pending_ai_turn());
    assert_eq!(session.state().await.turn_count, 3);
    assert_eq!(session.history().len(), 3);
}

/// Test that an all-AI game plays itself to the end and then stops.
#[tokio::test]
async fn test_all_ai_game_stops_at_win() {
    let session = session_with(Board::new("plain", []), &[5], SessionConfig::instant());
    let mut events = session.subscribe_events();
    session.start_new_game(vec![ai("A"), ai("B")]).await.unwrap();

    let winner_index = timeout(WAIT_LIMIT, async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::GameWon { winner_index, .. }) => return winner_index,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => panic!("event stream closed"),
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(winner_index, 0);

    let state = wait_until(&session, |state| state.has_winner()).await;
    assert_eq!(state.player_positions, vec![100, 95]);
    assert_eq!(state.turn_count, 38);
    assert_eq!(state.winner_index, Some(0));
    assert!(!session.has_pending_ai_turn());
    assert_eq!(session.history().len(), 39);

    let err = session.roll_and_move().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Move(MoveError::NotPlaying {
            status: GameStatus::Won
        })
    ));
}

/// Test that a new game abandons the previous game's pending AI turn.
#[tokio::test]
async fn test_new_game_cancels_pending_ai_turn() {
    let session = session_with(Board::classic(), &[2], slow_ai_config());
    session.start_new_game(vec![human("A"), ai("B")]).await.unwrap();
    session.roll_and_move().await.unwrap();
    assert!(session.has_pending_ai_turn());

    let generation = session.generation();
    session.start_new_game(vec![human("A"), ai("B")]).await.unwrap();
    assert_eq!(session.generation(), generation + 1);
    assert!(!session.has_pending_ai_turn());

    sleep(Duration::from_millis(400)).await;
    let state = session.state().await;
    assert_eq!(state.turn_count, 0);
    assert_eq!(state.player_positions, vec![0, 0]);
}

/// Test that the new game's AI still plays when the old game's move is in flight.
#[tokio::test]
async fn test_new_game_ai_waits_out_an_abandoned_move() {
    let mut config = SessionConfig {
        ai_think_delay_ms: 10,
        ..SessionConfig::instant()
    };
    config.latency.roll_dice_ms = 300;
    let session = session_with(Board::classic(), &[2, 3], config);
    session.start_new_game(vec![human("A"), human("B")]).await.unwrap();

    let old_move = tokio::spawn({
        let session = session.clone();
        async move { session.roll_and_move().await }
    });
    sleep(Duration::from_millis(50)).await;
    assert!(session.is_move_in_flight());

    session.start_new_game(vec![ai("Bot"), human("B")]).await.unwrap();
    assert!(matches!(
        old_move.await.unwrap(),
        Err(SessionError::Superseded)
    ));

    let state = wait_until(&session, |state| state.turn_count >= 1).await;
    assert_eq!(state.current_player_index, 1);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].player_index, 0);
}

/// Test that a rejected new game leaves the running game and its AI turn alone.
#[tokio::test]
async fn test_rejected_new_game_keeps_ai_chain_running() {
    let session = session_with(Board::classic(), &[2, 3], slow_ai_config());
    session.start_new_game(vec![human("A"), ai("B")]).await.unwrap();
    session.roll_and_move().await.unwrap();
    let generation = session.generation();

    let err = session.start_new_game(Vec::new()).await.unwrap_err();
    assert!(!err.is_retryable());
    assert_eq!(session.generation(), generation);
    assert!(session.has_pending_ai_turn());

    let state = wait_until(&session, |state| state.turn_count == 2).await;
    assert_eq!(state.current_player_index, 0);
    assert_eq!(session.history().len(), 2);
}

/// Test that a reset refused by an offline service changes nothing.
#[tokio::test]
async fn test_offline_reset_keeps_ai_chain_running() {
    let session = session_with(Board::classic(), &[2, 3], slow_ai_config());
    session.start_new_game(vec![human("A"), ai("B")]).await.unwrap();
    session.roll_and_move().await.unwrap();

    session.games().set_online(false);
    assert!(session.reset_game().await.unwrap_err().is_retryable());
    session.games().set_online(true);
    assert!(session.has_pending_ai_turn());

    let state = wait_until(&session, |state| state.turn_count == 2).await;
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(session.history().len(), 2);
}

/// Test that a reset during the think delay keeps the AI from playing.
#[tokio::test]
async fn test_reset_cancels_pending_ai_turn() {
    let session = session_with(Board::classic(), &[2], slow_ai_config());
    session.start_new_game(vec![human("A"), ai("B")]).await.unwrap();
    session.roll_and_move().await.unwrap();

    session.reset_game().await.unwrap();
    sleep(Duration::from_millis(400)).await;
    assert_eq!(session.state().await, GameState::waiting());
    assert!(session.history().is_empty());
}

/// Test that rolling by hand during the AI's think delay takes its turn.
#[tokio::test]
async fn test_manual_roll_replaces_pending_ai_turn() {
    let session = session_with(Board::classic(), &[2], slow_ai_config());
    session.start_new_game(vec![human("A"), ai("B")]).await.unwrap();
    session.roll_and_move().await.unwrap();
    assert!(session.has_pending_ai_turn());

    let result = session.roll_and_move().await.unwrap();
    assert_eq!(result.outcome.player_index, 1);
    assert!(!session.has_pending_ai_turn());

    sleep(Duration::from_millis(400)).await;
    let state = session.state().await;
    assert_eq!(state.turn_count, 2);
    assert_eq!(state.current_player_index, 0);
}

/// Test the event sequence of a single human move onto a ladder.
#[tokio::test]
async fn test_move_events_describe_the_ladder() {
    let session = instant_session(&[1]);
    session.start_new_game(vec![human("A"), human("B")]).await.unwrap();
    let mut events = session.subscribe_events();

    session.roll_and_move().await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::DiceRolled {
            player_index: 0,
            roll: 1
        }
    );
    match events.recv().await.unwrap() {
        SessionEvent::PlayerMoved { outcome } => {
            assert_eq!(outcome.final_position, 38);
            assert!(outcome.had_special_effect);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

/// Test that service outages surface as retryable errors and recover.
#[tokio::test]
async fn test_load_survives_a_short_outage() {
    let session = instant_session(&[1]);
    session.games().set_online(false);

    let err = session.load().await.unwrap_err();
    assert!(err.is_retryable());
    let err = session.start_new_game(vec![human("A")]).await.unwrap_err();
    assert!(err.is_retryable());

    let restore = tokio::spawn({
        let session = session.clone();
        async move {
            sleep(Duration::from_millis(30)).await;
            session.games().set_online(true);
        }
    });

    let snapshot = session
        .load_with_retry(10, Duration::from_millis(20))
        .await
        .unwrap();
    restore.await.unwrap();

    assert_eq!(snapshot.state, GameState::waiting());
    assert_eq!(snapshot.cells.len(), Board::classic().cells.len());
}

/// Test that contract errors are not retried.
#[tokio::test]
async fn test_load_gives_up_on_persistent_outage() {
    let session = instant_session(&[1]);
    session.boards().set_online(false);

    let err = session
        .load_with_retry(2, Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(!SessionError::MoveInFlight.is_retryable());
}

/// Test that the roster kept by the player service feeds new games.
#[tokio::test]
async fn test_new_game_uses_player_roster() {
    let session = instant_session(&[3]);
    let added = session.players().create(human("Zed")).await.unwrap();
    assert_eq!(added.id, PlayerId(2));

    let state = session.new_game().await.unwrap();
    assert_eq!(state.num_players(), 3);
    assert_eq!(state.players[2].name, "Zed");
    assert_eq!(state.players[2].id, PlayerId(2));
}

/// Test that a missing board file is reported, not replaced.
#[tokio::test]
async fn test_from_config_reports_missing_board() {
    let config = SessionConfig {
        board_path: Some("does/not/exist.json".into()),
        ..SessionConfig::instant()
    };
    let err = GameSession::from_config(config).err().unwrap();
    assert!(matches!(err, SessionError::Board(_)));
}

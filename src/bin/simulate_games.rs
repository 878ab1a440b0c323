use ladder_rush_rust::core::{
    board::Board,
    cell::CellType,
    dice::{DiceRoller, RandDice},
    game_state::GameState,
    player::{Player, PlayerId},
    turn_engine,
};
use std::time::Instant;
use tracing::{error, info};

const DEFAULT_NUM_GAMES: usize = 1000;
const DEFAULT_NUM_PLAYERS: usize = 2;
const DEFAULT_SEED: u64 = 7;
const MAX_TURNS_PER_GAME: u32 = 10_000;

#[derive(Default)]
struct GameTally {
    turns: u32,
    snakes: u32,
    ladders: u32,
    overshoots: u32,
    winner_index: Option<usize>,
}

fn play_one(board: &Board, num_players: usize, dice: &mut impl DiceRoller) -> Result<GameTally, String> {
    let roster = (0..num_players)
        .map(|idx| Player::ai(PlayerId(idx as u32), format!("Bot {}", idx + 1), "#4ECDC4"))
        .collect::<Vec<_>>();
    let mut state = GameState::start(roster).map_err(|err| err.to_string())?;
    let mut tally = GameTally::default();

    while state.is_playing() && state.turn_count < MAX_TURNS_PER_GAME {
        let (next, outcome) =
            turn_engine::resolve_move(board, &state, state.current_player_index, dice.roll())
                .map_err(|err| err.to_string())?;
        match outcome.effect_type {
            Some(CellType::Snake) => tally.snakes += 1,
            Some(CellType::Ladder) => tally.ladders += 1,
            _ => {}
        }
        if outcome.overshoot {
            tally.overshoots += 1;
        }
        state = next;
    }

    tally.turns = state.turn_count;
    tally.winner_index = state.winner_index;
    Ok(tally)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let num_games = args.first().and_then(|arg| arg.parse().ok()).unwrap_or(DEFAULT_NUM_GAMES);
    let num_players = args.get(1).and_then(|arg| arg.parse().ok()).unwrap_or(DEFAULT_NUM_PLAYERS);
    let seed = args.get(2).and_then(|arg| arg.parse().ok()).unwrap_or(DEFAULT_SEED);

    let board = match args.get(3) {
        Some(path) => match Board::from_json_file(path) {
            Ok(board) => board,
            Err(err) => {
                error!(%path, error = %err, "failed to load board");
                return;
            }
        },
        None => Board::classic(),
    };
    info!(
        board = %board.name,
        snakes = board.count_of(CellType::Snake),
        ladders = board.count_of(CellType::Ladder),
        num_games,
        num_players,
        seed,
        "simulating"
    );

    let mut dice = RandDice::seeded(seed);
    let mut tallies = Vec::with_capacity(num_games);
    let started = Instant::now();
    for _ in 0..num_games {
        match play_one(&board, num_players, &mut dice) {
            Ok(tally) => tallies.push(tally),
            Err(message) => {
                error!(%message, "simulation stopped");
                return;
            }
        }
    }
    let elapsed = started.elapsed();

    if tallies.is_empty() {
        println!("games=0");
        return;
    }

    let total_turns = tallies.iter().map(|tally| u64::from(tally.turns)).sum::<u64>();
    let min_turns = tallies.iter().map(|tally| tally.turns).min().unwrap_or_default();
    let max_turns = tallies.iter().map(|tally| tally.turns).max().unwrap_or_default();
    let unfinished = tallies.iter().filter(|tally| tally.winner_index.is_none()).count();
    let mut wins = vec![0usize; num_players];
    for winner_index in tallies.iter().filter_map(|tally| tally.winner_index) {
        wins[winner_index] += 1;
    }

    println!(
        "games={} meanTurns={:.2} minTurns={} maxTurns={} unfinished={} timeSec={:.4}",
        tallies.len(),
        total_turns as f64 / tallies.len() as f64,
        min_turns,
        max_turns,
        unfinished,
        elapsed.as_secs_f64()
    );
    println!(
        "snakes={} ladders={} overshoots={} wins={:?}",
        tallies.iter().map(|tally| tally.snakes).sum::<u32>(),
        tallies.iter().map(|tally| tally.ladders).sum::<u32>(),
        tallies.iter().map(|tally| tally.overshoots).sum::<u32>(),
        wins
    );
}

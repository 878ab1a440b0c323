use crossterm::style::{Color, Stylize};
use itertools::Itertools;
use ladder_rush_rust::config::SessionConfig;
use ladder_rush_rust::core::{
    board::Board,
    cell::CellType,
    game_state::GameState,
    player::{Player, PlayerId, PlayerUpdate},
};
use ladder_rush_rust::session::{GameSession, SessionError, SessionEvent};
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

const LOAD_ATTEMPTS: u32 = 3;
const LOAD_BACKOFF: Duration = Duration::from_millis(250);

pub struct Session {
    game: GameSession,
    should_quit: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Ok(Self {
            game: GameSession::from_config(config)?,
            should_quit: false,
        })
    }

    pub async fn start(&mut self) {
        self.spawn_event_printer();

        match self.game.load_with_retry(LOAD_ATTEMPTS, LOAD_BACKOFF).await {
            Ok(snapshot) => {
                println!(
                    "  Board: {} ({} configured cells)",
                    self.game.board().name,
                    snapshot.cells.len()
                );
                println!("{}", snapshot.state.summary(1));
            }
            Err(err) => {
                println!("  failed to load game: {err}");
                return;
            }
        }

        self.interpretation_loop().await;
    }

    fn spawn_event_printer(&self) {
        let mut events = self.game.subscribe_events();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => print_event(&event),
                    Err(RecvError::Lagged(skipped)) => println!("  ({skipped} events skipped)"),
                    Err(RecvError::Closed) => return,
                }
            }
        });
    }

    async fn interpretation_loop(&mut self) {
        let mut lines = BufReader::new(io::stdin()).lines();

        loop {
            let prompt = self.user_prompt_text().await;
            let mut stdout = io::stdout();
            let _ = stdout.write_all(prompt.as_bytes()).await;
            let _ = stdout.flush().await;

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => return,
            };

            for directive in expand_directives(&line) {
                self.interpret_directive(&directive).await;
                if self.should_quit {
                    return;
                }
            }
        }
    }

    async fn interpret_directive(&mut self, directive: &str) {
        const TAG_QUIT: &str = "q";
        const TAG_DISPLAY: &str = "d";
        const TAG_ROLL: &str = "r";
        const TAG_NEW_GAME: &str = "n";
        const TAG_RESET: &str = "reset";
        const TAG_BOARD: &str = "b";
        const TAG_CELL: &str = "c";
        const TAG_HISTORY: &str = "h";
        const TAG_PLAYERS: &str = "p";
        const TAG_SERVICE: &str = "svc";
        const TAG_WAIT: &str = "w";

        let tokens = directive.split_whitespace().collect::<Vec<_>>();
        let Some(directive_tag) = tokens.first().map(|token| token.to_lowercase()) else {
            return;
        };

        if directive_tag == TAG_QUIT {
            self.should_quit = true;
        } else if directive_tag == TAG_DISPLAY {
            println!("{}", self.game.state().await.summary(1));
        } else if directive_tag == TAG_ROLL {
            match self.game.roll_and_move().await {
                Ok(result) => println!("{}", result.game_state.summary(1)),
                Err(err) => println!("  invalid roll: {err}"),
            }
        } else if directive_tag == TAG_NEW_GAME {
            println!("(NEW GAME)");
            self.report(self.game.new_game().await);
        } else if directive_tag == TAG_RESET {
            println!("(RESET)");
            self.report(self.game.reset_game().await);
        } else if directive_tag == TAG_BOARD {
            let state = self.game.state().await;
            print_board(self.game.board(), &state);
        } else if directive_tag == TAG_CELL {
            self.print_cell(&tokens).await;
        } else if directive_tag == TAG_HISTORY {
            let history = self.game.history();
            if history.is_empty() {
                println!("  no moves yet");
            }
            for (turn_idx, outcome) in history.iter().enumerate() {
                println!("  {:>3}. {outcome}", turn_idx + 1);
            }
        } else if directive_tag == TAG_PLAYERS {
            self.handle_players(&tokens[1..]).await;
        } else if directive_tag == TAG_SERVICE {
            self.handle_service(&tokens[1..]);
        } else if directive_tag == TAG_WAIT {
            self.wait_for_ai().await;
        } else {
            let mut explanations = vec![
                "b       | draw the board",
                "c [int] | show cell [int]",
                "d       | display game state",
                "h       | display move history",
                "n       | new game with the current roster",
                "p       | list players",
                "p add [name] [#rrggbb] [ai] | add a player",
                "p rm [id] | remove a player",
                "p ai [id] [bool] | make a player AI or human",
                "q       | quit",
                "r       | roll and move the current player",
                "reset   | back to the waiting state",
                "svc [game|board|player] [on|off] | simulate a service outage",
                "w       | wait until it is a human's turn",
                "x [n] [cmd] | repeat [cmd] n times",
            ];
            explanations.sort();
            println!("  unrecognized directive '{directive}'");
            for explanation in explanations {
                println!("  {explanation}");
            }
        }
    }

    fn report(&self, result: Result<GameState, SessionError>) {
        match result {
            Ok(state) => println!("{}", state.summary(1)),
            Err(err) if err.is_retryable() => println!("  {err}; try again"),
            Err(err) => println!("  {err}"),
        }
    }

    async fn print_cell(&self, tokens: &[&str]) {
        let Some(number) = tokens.get(1).and_then(|token| token.parse::<u32>().ok()) else {
            println!("  cell directive needs one integer token");
            return;
        };

        match self.game.boards().get_cell_by_number(number).await {
            Ok(Some(cell)) => println!("  {cell}"),
            Ok(None) => println!("  {}", self.game.board().lookup_cell(number)),
            Err(err) => println!("  {err}"),
        }
    }

    async fn handle_players(&self, tokens: &[&str]) {
        let players = self.game.players();
        let result = match tokens {
            [] => players.get_all().await.map(|roster| {
                for player in roster {
                    println!("  {}: {}", player.id, paint(&player.to_string(), &player));
                }
            }),
            ["add", name, color, rest @ ..] => {
                let is_ai = rest.first().is_some_and(|token| token.eq_ignore_ascii_case("ai"));
                let player = Player::new(PlayerId::default(), *name, *color, is_ai);
                players
                    .create(player)
                    .await
                    .map(|created| println!("  added {}: {created}", created.id))
            }
            ["rm", id] => match id.parse::<u32>() {
                Ok(id) => players.delete(PlayerId(id)).await.map(|deleted| match deleted {
                    Some(player) => println!("  removed {player}"),
                    None => println!("  no player {id}"),
                }),
                Err(_) => {
                    println!("  player id must be an integer");
                    Ok(())
                }
            },
            ["ai", id, is_ai] => match (id.parse::<u32>(), is_ai.parse::<bool>()) {
                (Ok(id), Ok(is_ai)) => {
                    let update = PlayerUpdate {
                        is_ai: Some(is_ai),
                        ..PlayerUpdate::default()
                    };
                    players.update(PlayerId(id), update).await.map(|updated| match updated {
                        Some(player) => println!("  updated {player}"),
                        None => println!("  no player {id}"),
                    })
                }
                _ => {
                    println!("  p ai directive needs an integer id and a bool");
                    Ok(())
                }
            },
            _ => {
                println!("  unrecognized players directive");
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("  {err}");
        }
    }

    fn handle_service(&self, tokens: &[&str]) {
        let (Some(name), Some(setting)) = (tokens.first(), tokens.get(1)) else {
            println!("  svc directive needs a service name and on/off");
            return;
        };
        let online = match *setting {
            "on" => true,
            "off" => false,
            _ => {
                println!("  svc directive needs on or off, not '{setting}'");
                return;
            }
        };

        match *name {
            "game" => self.game.games().set_online(online),
            "board" => self.game.boards().set_online(online),
            "player" => self.game.players().set_online(online),
            _ => {
                println!("  unknown service '{name}'");
                return;
            }
        }
        println!("  {name} service {}", if online { "online" } else { "offline" });
    }

    async fn wait_for_ai(&self) {
        while self.game.has_pending_ai_turn() || self.game.is_move_in_flight() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        println!("{}", self.game.state().await.summary(1));
    }

    async fn user_prompt_text(&self) -> String {
        let state = self.game.state().await;
        if let Some(winner) = state.winner() {
            return format!("{winner} WON> ");
        }

        match state.current_player() {
            Some(player) if state.is_playing() => {
                let position = state.position_of(state.current_player_index).unwrap_or_default();
                format!("{player}@{position}> ")
            }
            _ => format!("{}> ", state.status),
        }
    }
}

/// Splits a line on `;` and unrolls `x [n] [cmd]` repetitions.
fn expand_directives(line: &str) -> Vec<String> {
    const TAG_REPEAT: &str = "x";

    let mut directives = Vec::new();
    for subline in line.split(';') {
        let tokens = subline.split_whitespace().collect::<Vec<_>>();
        match tokens.as_slice() {
            [] => {}
            [tag, count, rest @ ..] if tag.eq_ignore_ascii_case(TAG_REPEAT) && !rest.is_empty() => {
                match count.parse::<usize>() {
                    Ok(num_repeats) => {
                        let directive_text = rest.join(" ");
                        println!("(REPEAT {num_repeats}: {directive_text})");
                        for _ in 0..num_repeats {
                            directives.extend(expand_directives(&directive_text));
                        }
                    }
                    Err(_) => println!("directive {tag} needs repetition count and directive to repeat"),
                }
            }
            [tag, ..] if tag.eq_ignore_ascii_case(TAG_REPEAT) => {
                println!("directive {tag} needs repetition count and directive to repeat");
            }
            _ => directives.push(subline.trim().to_string()),
        }
    }
    directives
}

fn paint(text: &str, player: &Player) -> String {
    match player.rgb() {
        Some((r, g, b)) => text.with(Color::Rgb { r, g, b }).to_string(),
        None => text.to_string(),
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::DiceRolled { player_index, roll } => {
            println!("  [P{} rolled {roll}]", player_index + 1);
        }
        SessionEvent::PlayerMoved { outcome } => println!("  [{outcome}]"),
        SessionEvent::GameWon { winner, .. } => println!("  [{winner} wins!]"),
        SessionEvent::AiTurnScheduled { player_index, delay_ms } => {
            println!("  [P{} thinking for {delay_ms}ms]", player_index + 1);
        }
        SessionEvent::GameStarted { .. } | SessionEvent::GameReset { .. } => {}
    }
}

fn print_board(board: &Board, state: &GameState) {
    for row in Board::grid_rows() {
        let line = row
            .iter()
            .map(|number| cell_text(board, state, *number))
            .join(" ");
        println!("  {line}");
    }

    let legend = board
        .snakes_and_ladders()
        .iter()
        .map(|cell| cell.to_string())
        .join(" ");
    println!("  {legend}");
}

fn cell_text(board: &Board, state: &GameState, number: u32) -> String {
    let occupant = state
        .player_positions
        .iter()
        .enumerate()
        .filter(|(_, position)| **position == number)
        .map(|(player_idx, _)| player_idx)
        .last();

    if let Some(player_idx) = occupant {
        let label = format!("{:>4}", format!("P{}", player_idx + 1));
        return match state.players.get(player_idx) {
            Some(player) => paint(&label, player),
            None => label,
        };
    }

    let label = format!("{number:>4}");
    match board.lookup_cell(number).cell_type {
        CellType::Snake => label.with(Color::Red).to_string(),
        CellType::Ladder => label.with(Color::Green).to_string(),
        CellType::Finish => label.with(Color::Yellow).to_string(),
        CellType::Normal => label,
    }
}

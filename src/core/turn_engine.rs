use crate::core::{
    board::Board,
    error::MoveError,
    game_state::{GameState, GameStatus},
    move_outcome::MoveOutcome,
    rule_helper,
};

/// Checks the preconditions of [`resolve_move`] without touching the state.
pub fn check_move(state: &GameState, player_index: usize, dice_roll: u8) -> Result<(), MoveError> {
    if state.status != GameStatus::Playing {
        return Err(MoveError::NotPlaying {
            status: state.status,
        });
    }

    if player_index != state.current_player_index || player_index >= state.num_players() {
        return Err(MoveError::WrongPlayer {
            expected: state.current_player_index,
            provided: player_index,
        });
    }

    if !rule_helper::is_valid_dice_roll(dice_roll) {
        return Err(MoveError::DiceOutOfRange(dice_roll));
    }

    Ok(())
}

/// Resolves one roll for the current player and returns the next state.
///
/// A roll that would pass the finish leaves the player where they are but
/// still hands the turn on. Otherwise the piece lands on `position + roll` and,
/// if that cell is a snake or ladder, follows it once. Reaching the finish
/// ends the game without advancing the turn. The input state is never
/// modified, so a rejected call leaves nothing half-applied.
pub fn resolve_move(
    board: &Board,
    state: &GameState,
    player_index: usize,
    dice_roll: u8,
) -> Result<(GameState, MoveOutcome), MoveError> {
    check_move(state, player_index, dice_roll)?;

    let start_position = state.player_positions[player_index];
    let overshoot = rule_helper::overshoots(start_position, dice_roll);

    let (final_position, effect_type) = if overshoot {
        (start_position, None)
    } else {
        let cell = board.lookup_cell(start_position + u32::from(dice_roll));
        let effect_type = cell.is_special().then_some(cell.cell_type);
        (cell.destination(), effect_type)
    };

    let mut next = state.clone();
    next.player_positions[player_index] = final_position;
    next.last_dice_roll = Some(dice_roll);

    let won_game = rule_helper::is_winning_position(final_position);
    if won_game {
        next.status = GameStatus::Won;
        next.winner_index = Some(player_index);
    } else {
        next.current_player_index = rule_helper::next_player_index(player_index, next.num_players());
        next.turn_count += 1;
    }

    let outcome = MoveOutcome {
        player_index,
        dice_roll,
        start_position,
        final_position,
        overshoot,
        had_special_effect: effect_type.is_some(),
        effect_type,
        won_game,
    };

    Ok((next, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        cell::{Cell, CellType},
        player::{Player, PlayerId},
    };

    fn sample_board() -> Board {
        Board::new(
            "test",
            [
                Cell::snake(17, 4),
                Cell::ladder(3, 22),
                Cell::ladder(90, 100),
                Cell::finish(100),
            ],
        )
    }

    fn two_player_state() -> GameState {
        GameState::start([
            Player::human(PlayerId(0), "Ann", "#FF6B6B"),
            Player::ai(PlayerId(1), "Bot", "#4ECDC4"),
        ])
        .unwrap()
    }

    fn with_positions(positions: &[u32]) -> GameState {
        let mut state = two_player_state();
        state.player_positions = positions.to_vec();
        state
    }

    #[test]
    fn exact_landing_on_100_wins_without_turn_advance() {
        let state = with_positions(&[95, 95]);
        let (next, outcome) = resolve_move(&sample_board(), &state, 0, 5).unwrap();

        assert_eq!(next.status, GameStatus::Won);
        assert_eq!(next.winner_index, Some(0));
        assert_eq!(next.current_player_index, 0);
        assert_eq!(next.turn_count, 0);
        assert_eq!(next.last_dice_roll, Some(5));
        assert!(outcome.won_game);
        assert_eq!(outcome.final_position, 100);
    }

    #[test]
    fn overshoot_stays_put_and_passes_turn() {
        let state = with_positions(&[98, 0]);
        let (next, outcome) = resolve_move(&sample_board(), &state, 0, 5).unwrap();

        assert_eq!(next.player_positions, vec![98, 0]);
        assert_eq!(next.current_player_index, 1);
        assert_eq!(next.turn_count, 1);
        assert_eq!(next.status, GameStatus::Playing);
        assert!(outcome.overshoot);
        assert!(!outcome.had_special_effect);
        assert!(!outcome.moved());
    }

    #[test]
    fn snake_sends_player_down() {
        let state = with_positions(&[11, 0]);
        let (next, outcome) = resolve_move(&sample_board(), &state, 0, 6).unwrap();

        assert_eq!(next.player_positions[0], 4);
        assert_eq!(outcome.effect_type, Some(CellType::Snake));
        assert!(outcome.had_special_effect);
    }

    #[test]
    fn seven_is_not_a_dice_roll_even_onto_a_snake() {
        let state = with_positions(&[10, 0]);
        let before = state.clone();
        assert_eq!(
            resolve_move(&sample_board(), &state, 0, 7),
            Err(MoveError::DiceOutOfRange(7))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn ladder_climbs_and_ladder_to_finish_wins() {
        let state = with_positions(&[0, 0]);
        let (next, outcome) = resolve_move(&sample_board(), &state, 0, 3).unwrap();
        assert_eq!(next.player_positions[0], 22);
        assert_eq!(outcome.effect_type, Some(CellType::Ladder));

        let mut state = with_positions(&[0, 86]);
        state.current_player_index = 1;
        let (next, outcome) = resolve_move(&sample_board(), &state, 1, 4).unwrap();
        assert!(outcome.won_game);
        assert_eq!(next.winner_index, Some(1));
        assert_eq!(next.current_player_index, 1);
    }

    #[test]
    fn landing_on_the_finish_cell_is_not_a_special_effect() {
        let state = with_positions(&[94, 0]);
        let (_, outcome) = resolve_move(&sample_board(), &state, 0, 6).unwrap();
        assert!(!outcome.had_special_effect);
        assert_eq!(outcome.effect_type, None);
        assert!(outcome.won_game);
    }

    #[test]
    fn rejects_wrong_player() {
        let state = two_player_state();
        assert_eq!(
            resolve_move(&sample_board(), &state, 1, 3),
            Err(MoveError::WrongPlayer {
                expected: 0,
                provided: 1
            })
        );
    }

    #[test]
    fn rejects_out_of_range_rolls() {
        let state = two_player_state();
        assert_eq!(
            resolve_move(&sample_board(), &state, 0, 0),
            Err(MoveError::DiceOutOfRange(0))
        );
        assert_eq!(
            resolve_move(&sample_board(), &state, 0, 7),
            Err(MoveError::DiceOutOfRange(7))
        );
    }

    #[test]
    fn rejects_moves_outside_playing_status() {
        assert_eq!(
            resolve_move(&sample_board(), &GameState::waiting(), 0, 3),
            Err(MoveError::NotPlaying {
                status: GameStatus::Waiting
            })
        );

        let state = with_positions(&[95, 0]);
        let (won, _) = resolve_move(&sample_board(), &state, 0, 5).unwrap();
        assert_eq!(
            resolve_move(&sample_board(), &won, 0, 1),
            Err(MoveError::NotPlaying {
                status: GameStatus::Won
            })
        );
    }

    #[test]
    fn turn_rotation_cycles_after_n_moves() {
        let board = sample_board();
        let mut state = two_player_state();

        for _ in 0..state.num_players() {
            let player_index = state.current_player_index;
            state = resolve_move(&board, &state, player_index, 1).unwrap().0;
        }

        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.turn_count, 2);
    }
}

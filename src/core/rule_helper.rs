use std::ops::RangeInclusive;

pub const START_POSITION: u32 = 0;
pub const FIRST_CELL: u32 = 1;
pub const FINISH_CELL: u32 = 100;
pub const BOARD_WIDTH: u32 = 10;

pub const DICE_MIN: u8 = 1;
pub const DICE_MAX: u8 = 6;

pub const DEFAULT_BOARD_NAME: &str = "BoardClassic";

pub fn cell_numbers() -> RangeInclusive<u32> {
    FIRST_CELL..=FINISH_CELL
}

pub fn is_cell_number(number: u32) -> bool {
    cell_numbers().contains(&number)
}

pub fn is_valid_dice_roll(dice_roll: u8) -> bool {
    (DICE_MIN..=DICE_MAX).contains(&dice_roll)
}

pub fn is_winning_position(position: u32) -> bool {
    position >= FINISH_CELL
}

/// A roll that would carry a player past the finish forfeits the move.
pub fn overshoots(position: u32, dice_roll: u8) -> bool {
    position + u32::from(dice_roll) > FINISH_CELL
}

pub fn next_player_index(player_index: usize, num_players: usize) -> usize {
    (player_index + 1) % num_players
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overshoot_only_past_finish() {
        assert!(!overshoots(94, 6));
        assert!(!overshoots(95, 5));
        assert!(overshoots(95, 6));
        assert!(overshoots(98, 5));
    }

    #[test]
    fn next_player_index_wraps() {
        assert_eq!(next_player_index(0, 3), 1);
        assert_eq!(next_player_index(2, 3), 0);
        assert_eq!(next_player_index(0, 1), 0);
    }

    #[test]
    fn dice_and_cell_ranges_are_inclusive() {
        assert!(!is_valid_dice_roll(0));
        assert!(is_valid_dice_roll(1));
        assert!(is_valid_dice_roll(6));
        assert!(!is_valid_dice_roll(7));
        assert!(!is_cell_number(0));
        assert!(is_cell_number(100));
        assert!(!is_cell_number(101));
    }
}

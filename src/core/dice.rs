use crate::core::rule_helper;
use std::collections::VecDeque;

pub trait DiceRoller: Send {
    /// A roll in `1..=6`.
    fn roll(&mut self) -> u8;
}

/// Replays the given rolls in order, then starts over.
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        let rolls = rolls.into_iter().collect::<VecDeque<_>>();
        Self { rolls }
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let Some(roll) = self.rolls.pop_front() else {
            return rule_helper::DICE_MIN;
        };
        self.rolls.push_back(roll);
        roll
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::RandDice;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::DiceRoller;
    use crate::core::rule_helper;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    /// Uniform dice backed by `rand`.
    pub struct RandDice {
        rng: StdRng,
    }

    impl RandDice {
        pub fn from_entropy() -> Self {
            Self {
                rng: StdRng::from_entropy(),
            }
        }

        pub fn seeded(seed: u64) -> Self {
            Self {
                rng: StdRng::seed_from_u64(seed),
            }
        }
    }

    impl Default for RandDice {
        fn default() -> Self {
            Self::from_entropy()
        }
    }

    impl DiceRoller for RandDice {
        fn roll(&mut self) -> u8 {
            self.rng.gen_range(rule_helper::DICE_MIN..=rule_helper::DICE_MAX)
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::JsDice;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::DiceRoller;
    use crate::core::rule_helper;

    /// Uniform dice backed by `Math.random`.
    #[derive(Default)]
    pub struct JsDice;

    impl DiceRoller for JsDice {
        fn roll(&mut self) -> u8 {
            let faces = f64::from(rule_helper::DICE_MAX - rule_helper::DICE_MIN + 1);
            let offset = (js_sys::Math::random() * faces).floor() as u8;
            rule_helper::DICE_MIN + offset.min(rule_helper::DICE_MAX - rule_helper::DICE_MIN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_dice_cycle() {
        let mut dice = ScriptedDice::new([2, 5]);
        assert_eq!(
            (0..5).map(|_| dice.roll()).collect::<Vec<_>>(),
            vec![2, 5, 2, 5, 2]
        );
    }

    #[test]
    fn empty_script_rolls_minimum() {
        let mut dice = ScriptedDice::new([]);
        assert_eq!(dice.roll(), rule_helper::DICE_MIN);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn rand_dice_stay_in_range() {
        let mut dice = RandDice::seeded(7);
        let rolls = (0..600).map(|_| dice.roll()).collect::<Vec<_>>();
        assert!(rolls.iter().all(|roll| rule_helper::is_valid_dice_roll(*roll)));
        for face in rule_helper::DICE_MIN..=rule_helper::DICE_MAX {
            assert!(rolls.contains(&face));
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn seeded_dice_are_reproducible() {
        let mut a = RandDice::seeded(42);
        let mut b = RandDice::seeded(42);
        assert!((0..50).all(|_| a.roll() == b.roll()));
    }
}

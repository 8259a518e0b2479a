//! Action resolution: difficulty rolls, outcomes and relationship deltas.

use rand::Rng;

use crate::domain::TraitStats;

use super::catalog::Card;

/// Rolls are drawn uniformly from `0..DIFFICULTY_RANGE`.
pub const DIFFICULTY_RANGE: i32 = 100;

/// Difficulties at or below this always succeed greatly.
pub const GREAT_SUCCESS_MAX: i32 = 5;

/// Difficulties at or above this always fail greatly.
pub const GREAT_FAILURE_MIN: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    GreatSuccess,
    Success,
    Failure,
    GreatFailure,
}

impl Outcome {
    /// Wire code: `2`, `1`, `-1` or `-2`.
    pub fn code(self) -> i8 {
        match self {
            Outcome::GreatSuccess => 2,
            Outcome::Success => 1,
            Outcome::Failure => -1,
            Outcome::GreatFailure => -2,
        }
    }

    /// Factor applied to a card's relationship vector.
    pub fn multiplier(self) -> f32 {
        match self {
            Outcome::GreatSuccess => 1.5,
            Outcome::Success => 1.0,
            Outcome::Failure => -1.0,
            Outcome::GreatFailure => -1.5,
        }
    }

    /// Shift applied to the counterpart's roll when this is the holder's outcome.
    pub fn target_shift(self) -> i32 {
        match self {
            Outcome::GreatSuccess => -20,
            Outcome::Success => -10,
            Outcome::Failure => 10,
            Outcome::GreatFailure => 20,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::GreatSuccess => "Great success",
            Outcome::Success => "Success",
            Outcome::Failure => "Failure",
            Outcome::GreatFailure => "Great failure",
        }
    }
}

/// A rolled difficulty and the outcome it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll {
    /// The raw roll, before any shift.
    pub difficulty: i32,
    pub outcome: Outcome,
}

/// Evaluate a difficulty against a stat vector and a requirement set.
///
/// Extreme difficulties ignore the stats. Otherwise the action succeeds when
/// at least half of the required stats reach the difficulty; an empty
/// requirement set always succeeds.
pub fn resolve(difficulty: i32, stats: &TraitStats, requires: &[usize]) -> Outcome {
    if difficulty <= GREAT_SUCCESS_MAX {
        return Outcome::GreatSuccess;
    }
    if difficulty >= GREAT_FAILURE_MIN {
        return Outcome::GreatFailure;
    }
    let met = requires
        .iter()
        .filter(|&&index| i32::from(stats.get(index)) >= difficulty)
        .count();
    if met * 2 >= requires.len() {
        Outcome::Success
    } else {
        Outcome::Failure
    }
}

/// Roll a fresh difficulty, shift it, and resolve it for `card`.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, shift: i32, stats: &TraitStats, card: &Card) -> Roll {
    let difficulty = rng.gen_range(0..DIFFICULTY_RANGE);
    Roll {
        difficulty,
        outcome: resolve(difficulty + shift, stats, &card.requires),
    }
}

/// Add the card's scaled relationship vector onto `entry`.
pub fn apply_delta(entry: &mut [f32; 3], card: &Card, outcome: Outcome) {
    let multiplier = outcome.multiplier();
    for (value, delta) in entry.iter_mut().zip(card.relationship) {
        *value += delta * multiplier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stats(values: [u8; 8]) -> TraitStats {
        TraitStats::new(values).unwrap()
    }

    fn card(requires: Vec<usize>, relationship: [f32; 3]) -> Card {
        Card {
            name: "card".to_string(),
            requires,
            growth: 1,
            relationship,
        }
    }

    #[test]
    fn test_extreme_difficulties_ignore_stats() {
        // テスト項目: 難易度 5 以下は大成功、90 以上は大失敗になる
        // given (前提条件):
        let weak = stats([10; 8]);
        let strong = stats([90; 8]);
        let all = [0, 1, 2, 3, 4, 5, 6, 7];

        // when (操作):
        // then (期待する結果):
        for difficulty in 0..=GREAT_SUCCESS_MAX {
            assert_eq!(resolve(difficulty, &weak, &all), Outcome::GreatSuccess);
        }
        for difficulty in GREAT_FAILURE_MIN..DIFFICULTY_RANGE {
            assert_eq!(resolve(difficulty, &strong, &all), Outcome::GreatFailure);
        }
        assert_eq!(resolve(-15, &weak, &all), Outcome::GreatSuccess);
        assert_eq!(resolve(110, &strong, &all), Outcome::GreatFailure);
    }

    #[test]
    fn test_half_of_requirements_is_enough() {
        // テスト項目: 必要特性の半数以上が難易度に達していれば成功
        // given (前提条件):
        let stats = stats([60, 60, 20, 20, 10, 10, 10, 10]);

        // when (操作):
        let half = resolve(50, &stats, &[0, 2, 1, 3]);
        let less = resolve(50, &stats, &[0, 2, 3, 4]);
        let exact = resolve(60, &stats, &[0]);

        // then (期待する結果):
        assert_eq!(half, Outcome::Success);
        assert_eq!(less, Outcome::Failure);
        assert_eq!(exact, Outcome::Success);
    }

    #[test]
    fn test_empty_requirements_succeed() {
        // テスト項目: 必要特性がないカードは中間の難易度で常に成功する
        // given (前提条件):
        let stats = stats([10; 8]);

        // when (操作):
        let outcome = resolve(80, &stats, &[]);

        // then (期待する結果):
        assert_eq!(outcome, Outcome::Success);
    }

    #[test]
    fn test_success_applies_card_vector() {
        // テスト項目: 条件 2 つがともに難易度 50 以上なら成功し、関係値がカードのベクトル × 1.0 だけ加算される
        // given (前提条件):
        let stats = stats([55, 70, 10, 10, 10, 10, 10, 10]);
        let card = card(vec![0, 1], [2.0, -1.0, 0.5]);
        let mut entry = [1.0, 1.0, 1.0];

        // when (操作):
        let outcome = resolve(50, &stats, &card.requires);
        apply_delta(&mut entry, &card, outcome);

        // then (期待する結果):
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(entry, [3.0, 0.0, 1.5]);
    }

    #[test]
    fn test_multipliers_by_outcome() {
        // テスト項目: 結果ごとの倍率が正しく適用される
        // given (前提条件):
        let card = card(vec![], [2.0, 0.0, -2.0]);

        // when (操作):
        // then (期待する結果):
        for (outcome, expected) in [
            (Outcome::GreatSuccess, [3.0, 0.0, -3.0]),
            (Outcome::Success, [2.0, 0.0, -2.0]),
            (Outcome::Failure, [-2.0, 0.0, 2.0]),
            (Outcome::GreatFailure, [-3.0, 0.0, 3.0]),
        ] {
            let mut entry = [0.0; 3];
            apply_delta(&mut entry, &card, outcome);
            assert_eq!(entry, expected);
        }
    }

    #[test]
    fn test_codes_and_shifts() {
        // テスト項目: 結果コードと相手側の難易度補正
        // given (前提条件):
        // when (操作):
        // then (期待する結果):
        assert_eq!(Outcome::GreatSuccess.code(), 2);
        assert_eq!(Outcome::GreatFailure.code(), -2);
        assert_eq!(Outcome::GreatSuccess.target_shift(), -20);
        assert_eq!(Outcome::Success.target_shift(), -10);
        assert_eq!(Outcome::Failure.target_shift(), 10);
        assert_eq!(Outcome::GreatFailure.target_shift(), 20);
    }

    #[test]
    fn test_roll_reports_unshifted_difficulty() {
        // テスト項目: ロールは補正前の難易度を報告し、補正後の値で判定する
        // given (前提条件):
        let strong = stats([90; 8]);
        let card = card(vec![0], [0.0; 3]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // when (操作):
        // then (期待する結果):
        for _ in 0..200 {
            let roll = roll(&mut rng, 20, &strong, &card);
            assert!((0..DIFFICULTY_RANGE).contains(&roll.difficulty));
            assert_eq!(roll.outcome, resolve(roll.difficulty + 20, &strong, &card.requires));
        }
    }
}

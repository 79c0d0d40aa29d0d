//! SimpleScore - single-level score

use std::fmt;

use super::traits::Score;
use super::ScoreLevel;

/// A score with one level.
///
/// # Examples
///
/// ```
/// use planforge_core::{Score, SimpleScore};
///
/// let score = SimpleScore::of(-5);
/// assert_eq!(score.score(), -5);
/// assert!(SimpleScore::of(-1) > score);
/// assert_eq!(score.to_string(), "-5");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    score: i64,
}

impl SimpleScore {
    pub const ZERO: SimpleScore = SimpleScore { score: 0 };
    pub const ONE: SimpleScore = SimpleScore { score: 1 };

    #[inline]
    pub const fn of(score: i64) -> Self {
        SimpleScore { score }
    }

    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

impl Score for SimpleScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        true
    }

    #[inline]
    fn zero() -> Self {
        SimpleScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        1
    }

    impl_score_levels!(SimpleScore { score } => of);

    fn level_label(_index: usize) -> ScoreLevel {
        ScoreLevel::Soft
    }
}

impl_score_ops!(SimpleScore { score } => of);
impl_score_text!(SimpleScore { score => "" } => of);

impl fmt::Debug for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleScore({})", self.score)
    }
}

//! HardSoftScore - hard and soft levels

use std::fmt;

use super::traits::Score;
use super::ScoreLevel;

/// A score with a hard level and a soft level.
///
/// The hard level decides feasibility and always dominates the soft level.
///
/// # Examples
///
/// ```
/// use planforge_core::{HardSoftScore, Score};
///
/// let infeasible = HardSoftScore::of(-1, 0);
/// let feasible = HardSoftScore::of(0, -200);
/// assert!(feasible > infeasible);
/// assert!(feasible.is_feasible());
///
/// let parsed: HardSoftScore = "0hard/-200soft".parse().unwrap();
/// assert_eq!(parsed, feasible);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };
    pub const ONE_HARD: HardSoftScore = HardSoftScore { hard: 1, soft: 0 };
    pub const ONE_SOFT: HardSoftScore = HardSoftScore { hard: 0, soft: 1 };

    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftScore { hard, soft }
    }

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore { hard, soft: 0 }
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore { hard: 0, soft }
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl Score for HardSoftScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    #[inline]
    fn zero() -> Self {
        HardSoftScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        2
    }

    impl_score_levels!(HardSoftScore { hard, soft } => of);

    fn level_label(index: usize) -> ScoreLevel {
        if index == 0 {
            ScoreLevel::Hard
        } else {
            ScoreLevel::Soft
        }
    }
}

impl_score_ops!(HardSoftScore { hard, soft } => of);
impl_score_text!(HardSoftScore { hard => "hard", soft => "soft" } => of);

impl fmt::Debug for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftScore({}, {})", self.hard, self.soft)
    }
}

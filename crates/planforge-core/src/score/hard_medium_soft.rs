//! HardMediumSoftScore - three-level score

use std::fmt;

use super::traits::Score;
use super::ScoreLevel;

/// A score with hard, medium and soft levels.
///
/// The medium level typically expresses "assign as much as possible" on
/// over-constrained problems, ranking below feasibility but above quality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardMediumSoftScore {
    hard: i64,
    medium: i64,
    soft: i64,
}

impl HardMediumSoftScore {
    pub const ZERO: HardMediumSoftScore = HardMediumSoftScore { hard: 0, medium: 0, soft: 0 };
    pub const ONE_HARD: HardMediumSoftScore = HardMediumSoftScore { hard: 1, medium: 0, soft: 0 };
    pub const ONE_MEDIUM: HardMediumSoftScore = HardMediumSoftScore { hard: 0, medium: 1, soft: 0 };
    pub const ONE_SOFT: HardMediumSoftScore = HardMediumSoftScore { hard: 0, medium: 0, soft: 1 };

    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftScore { hard, medium, soft }
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn medium(&self) -> i64 {
        self.medium
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl Score for HardMediumSoftScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    #[inline]
    fn zero() -> Self {
        HardMediumSoftScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        3
    }

    impl_score_levels!(HardMediumSoftScore { hard, medium, soft } => of);

    fn level_label(index: usize) -> ScoreLevel {
        match index {
            0 => ScoreLevel::Hard,
            1 => ScoreLevel::Medium,
            _ => ScoreLevel::Soft,
        }
    }
}

impl_score_ops!(HardMediumSoftScore { hard, medium, soft } => of);
impl_score_text!(HardMediumSoftScore { hard => "hard", medium => "medium", soft => "soft" } => of);

impl fmt::Debug for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardMediumSoftScore({}, {}, {})", self.hard, self.medium, self.soft)
    }
}

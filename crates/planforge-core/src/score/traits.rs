//! The `Score` trait shared by all score types.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use thiserror::Error;

use super::ScoreLevel;

/// Solution quality measure.
///
/// Scores are compared level by level, higher is better. Every level is an
/// integer so that sums of contributions are exact and independent of the
/// order in which they were added.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + Eq
    + Ord
    + Hash
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + FromStr<Err = ScoreParseError>
    + 'static
{
    /// Returns true if no hard level is negative.
    fn is_feasible(&self) -> bool;

    /// The additive identity.
    fn zero() -> Self;

    /// Number of levels of this score type.
    fn levels_count() -> usize;

    /// Level values, most important first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Builds a score from level values, `None` if the level count is wrong.
    fn from_level_numbers(levels: &[i64]) -> Option<Self>;

    /// Multiplies every level by `factor`.
    fn scaled(&self, factor: i64) -> Self;

    fn abs(&self) -> Self;

    /// Priority class of the level at `index`.
    fn level_label(index: usize) -> ScoreLevel;

    /// Index of the only nonzero level, if exactly one level is nonzero.
    fn single_level(&self) -> Option<usize> {
        let mut found = None;
        for (index, level) in self.to_level_numbers().into_iter().enumerate() {
            if level != 0 {
                if found.is_some() {
                    return None;
                }
                found = Some(index);
            }
        }
        found
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    #[inline]
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    #[inline]
    fn is_not_worse_than(&self, other: &Self) -> bool {
        self >= other
    }
}

/// Error returned when a score string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScoreParseError {
    pub message: String,
}

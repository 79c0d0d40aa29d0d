//! Collectors aggregating the members of a group.
//!
//! A [`Collector`] creates one [`Accumulator`] per group key. Accumulators
//! receive each member value through [`Accumulator::add`]. An accumulator
//! that can undo a single value implements [`Accumulator::remove`]; one that
//! cannot (like [`min`] and [`max`]) keeps the default, and the group node
//! rebuilds only that group from its remaining members.
//!
//! Results must not depend on the order values arrive in.
//!
//! # Example
//!
//! ```
//! use planforge_scoring::collector::{self, Accumulator, Collector};
//!
//! let mut acc = collector::sum().create_accumulator();
//! acc.add(4);
//! acc.add(6);
//! assert!(acc.remove(4));
//! assert_eq!(acc.result(), 6);
//!
//! let mut acc = collector::max().create_accumulator();
//! acc.add(4);
//! assert!(!acc.remove(4));
//! ```

use std::collections::HashMap;
use std::fmt::Debug;

/// Factory for per-group accumulators.
pub trait Collector: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn create_accumulator(&self) -> Box<dyn Accumulator>;
}

/// Running aggregate of one group.
pub trait Accumulator: Send + Sync + Debug {
    fn add(&mut self, value: i64);

    /// Removes one previously added value.
    ///
    /// Returns `false` when the accumulator cannot remove values; the caller
    /// then rebuilds it from the remaining values.
    fn remove(&mut self, _value: i64) -> bool {
        false
    }

    fn result(&self) -> i64;

    fn box_clone(&self) -> Box<dyn Accumulator>;
}

impl Clone for Box<dyn Accumulator> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Counts group members, ignoring their values.
pub fn count() -> CountCollector {
    CountCollector
}

/// Sums member values.
pub fn sum() -> SumCollector {
    SumCollector
}

/// Counts distinct member values.
pub fn count_distinct() -> CountDistinctCollector {
    CountDistinctCollector
}

/// Smallest member value.
pub fn min() -> MinCollector {
    MinCollector
}

/// Largest member value.
pub fn max() -> MaxCollector {
    MaxCollector
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountCollector;

#[derive(Debug, Clone, Copy, Default)]
pub struct SumCollector;

#[derive(Debug, Clone, Copy, Default)]
pub struct CountDistinctCollector;

#[derive(Debug, Clone, Copy, Default)]
pub struct MinCollector;

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCollector;

impl Collector for CountCollector {
    fn name(&self) -> &'static str {
        "count"
    }

    fn create_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(CountAccumulator(0))
    }
}

impl Collector for SumCollector {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn create_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(SumAccumulator(0))
    }
}

impl Collector for CountDistinctCollector {
    fn name(&self) -> &'static str {
        "count_distinct"
    }

    fn create_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(CountDistinctAccumulator::default())
    }
}

impl Collector for MinCollector {
    fn name(&self) -> &'static str {
        "min"
    }

    fn create_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(ExtremumAccumulator {
            current: None,
            pick: i64::min,
        })
    }
}

impl Collector for MaxCollector {
    fn name(&self) -> &'static str {
        "max"
    }

    fn create_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(ExtremumAccumulator {
            current: None,
            pick: i64::max,
        })
    }
}

#[derive(Debug, Clone)]
struct CountAccumulator(i64);

impl Accumulator for CountAccumulator {
    fn add(&mut self, _value: i64) {
        self.0 += 1;
    }

    fn remove(&mut self, _value: i64) -> bool {
        self.0 -= 1;
        true
    }

    fn result(&self) -> i64 {
        self.0
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone)]
struct SumAccumulator(i64);

impl Accumulator for SumAccumulator {
    fn add(&mut self, value: i64) {
        self.0 += value;
    }

    fn remove(&mut self, value: i64) -> bool {
        self.0 -= value;
        true
    }

    fn result(&self) -> i64 {
        self.0
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Default)]
struct CountDistinctAccumulator {
    occurrences: HashMap<i64, usize>,
}

impl Accumulator for CountDistinctAccumulator {
    fn add(&mut self, value: i64) {
        *self.occurrences.entry(value).or_insert(0) += 1;
    }

    fn remove(&mut self, value: i64) -> bool {
        if let Some(n) = self.occurrences.get_mut(&value) {
            *n -= 1;
            if *n == 0 {
                self.occurrences.remove(&value);
            }
        }
        true
    }

    fn result(&self) -> i64 {
        self.occurrences.len() as i64
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }
}

/// Min or max. Cannot remove a value without knowing the runner-up.
#[derive(Debug, Clone)]
struct ExtremumAccumulator {
    current: Option<i64>,
    pick: fn(i64, i64) -> i64,
}

impl Accumulator for ExtremumAccumulator {
    fn add(&mut self, value: i64) {
        self.current = Some(match self.current {
            Some(current) => (self.pick)(current, value),
            None => value,
        });
    }

    fn result(&self) -> i64 {
        self.current.unwrap_or(0)
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(collector: &dyn Collector, values: &[i64]) -> Box<dyn Accumulator> {
        let mut acc = collector.create_accumulator();
        for &v in values {
            acc.add(v);
        }
        acc
    }

    #[test]
    fn test_count_ignores_values() {
        let mut acc = fill(&count(), &[7, 7, -3]);
        assert_eq!(acc.result(), 3);
        assert!(acc.remove(100));
        assert_eq!(acc.result(), 2);
    }

    #[test]
    fn test_sum_remove() {
        let mut acc = fill(&sum(), &[5, 10, 20]);
        assert!(acc.remove(10));
        assert_eq!(acc.result(), 25);
    }

    #[test]
    fn test_count_distinct() {
        let mut acc = fill(&count_distinct(), &[1, 1, 2]);
        assert_eq!(acc.result(), 2);
        assert!(acc.remove(1));
        assert_eq!(acc.result(), 2);
        assert!(acc.remove(1));
        assert_eq!(acc.result(), 1);
    }

    #[test]
    fn test_min_max_are_not_invertible() {
        let mut lo = fill(&min(), &[4, -2, 9]);
        let mut hi = fill(&max(), &[4, -2, 9]);
        assert_eq!(lo.result(), -2);
        assert_eq!(hi.result(), 9);
        assert!(!lo.remove(-2));
        assert!(!hi.remove(9));
    }

    #[test]
    fn test_boxed_clone_is_independent() {
        let acc = fill(&sum(), &[1, 2]);
        let mut copy = acc.clone();
        copy.add(10);
        assert_eq!(acc.result(), 3);
        assert_eq!(copy.result(), 13);
    }
}

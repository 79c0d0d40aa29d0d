//! Constraint identity and impact direction.

use std::fmt;

/// Reference to a constraint for identification.
///
/// # Example
///
/// ```
/// use planforge_core::ConstraintRef;
///
/// let cr = ConstraintRef::new("scheduling", "NoOverlap");
/// assert_eq!(cr.full_name(), "scheduling/NoOverlap");
///
/// let simple = ConstraintRef::new("", "Simple");
/// assert_eq!(simple.full_name(), "Simple");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    /// Package the constraint belongs to, may be empty.
    pub package: String,
    /// Name of the constraint, unique within its package.
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Direction in which a constraint moves the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    /// Subtract from the score.
    Penalty,
    /// Add to the score.
    Reward,
}

impl ImpactType {
    /// Returns the sign applied to a match weight.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            ImpactType::Penalty => -1,
            ImpactType::Reward => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_with_package() {
        let cr = ConstraintRef::new("nqueens", "RowConflict");
        assert_eq!(cr.full_name(), "nqueens/RowConflict");
        assert_eq!(cr.to_string(), "nqueens/RowConflict");
    }

    #[test]
    fn test_impact_sign() {
        assert_eq!(ImpactType::Penalty.sign(), -1);
        assert_eq!(ImpactType::Reward.sign(), 1);
    }
}

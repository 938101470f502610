//! Postselection constraints on detection patterns.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::FockState;

/// The photon count summed over `modes` must equal `count`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeConstraint {
    /// Modes whose counts are summed.
    pub modes: Vec<usize>,
    /// Required total.
    pub count: u32,
}

/// A conjunction of [`ModeConstraint`]s.
///
/// An empty `PostSelect` accepts every outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSelect {
    constraints: Vec<ModeConstraint>,
}

impl PostSelect {
    /// Create an empty (always accepting) postselection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `sum(modes) == count`.
    pub fn eq(mut self, modes: impl IntoIterator<Item = usize>, count: u32) -> Self {
        self.constraints.push(ModeConstraint {
            modes: modes.into_iter().collect(),
            count,
        });
        self
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[ModeConstraint] {
        &self.constraints
    }

    /// Check whether there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check an outcome against every constraint.
    pub fn accepts(&self, state: &FockState) -> bool {
        self.constraints
            .iter()
            .all(|c| c.modes.iter().map(|&m| state.count(m)).sum::<u32>() == c.count)
    }
}

impl fmt::Display for PostSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .constraints
            .iter()
            .map(|c| {
                let modes: Vec<String> = c.modes.iter().map(usize::to_string).collect();
                format!("[{}]=={}", modes.join(","), c.count)
            })
            .collect();
        write!(f, "{}", parts.join(" & "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        let ps = PostSelect::new().eq([0, 1], 1).eq([2], 0).eq([3], 1);
        assert!(ps.accepts(&FockState::new(vec![1, 0, 0, 1])));
        assert!(ps.accepts(&FockState::new(vec![0, 1, 0, 1])));
        assert!(!ps.accepts(&FockState::new(vec![1, 1, 0, 0])));
        assert!(!ps.accepts(&FockState::new(vec![0, 1, 1, 0])));
    }

    #[test]
    fn test_empty_accepts_everything() {
        let ps = PostSelect::new();
        assert!(ps.is_empty());
        assert!(ps.accepts(&FockState::new(vec![2, 0])));
    }

    #[test]
    fn test_display() {
        let ps = PostSelect::new().eq([0, 1], 1).eq([2], 0);
        assert_eq!(ps.to_string(), "[0,1]==1 & [2]==0");
    }
}

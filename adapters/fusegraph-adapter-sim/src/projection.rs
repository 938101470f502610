//! Early postselection.
//!
//! A constraint `sum(S) == c` on the detected pattern can be enforced on the
//! state long before the detectors. Walking the network backwards, the set
//! `S` is carried through permutations, and an element acting entirely
//! inside or entirely outside `S` leaves the photon count in `S` unchanged.
//! The first element (from the end) that straddles `S` is the latest point
//! at which the count may still change, so right after it the state can be
//! projected onto `sum(S) == c`. The projection commutes with everything
//! that follows, which keeps the result exact while the state stays small.
//!
//! Two constraints over disjoint sets also imply the constraint over their
//! union. For compiled networks this is what makes a photon's two output
//! modes collapse back onto its single source mode.

use std::collections::BTreeSet;

use fusegraph_ir::{ModeConstraint, Network, OpticalElement, PostSelect};

/// A constraint that becomes enforceable after a given number of elements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Projection {
    /// Number of placements applied before projecting.
    pub after: usize,
    /// Spatial modes whose counts are summed at that point.
    pub modes: Vec<usize>,
    /// Required total.
    pub count: u32,
}

/// Projections grouped by the element after which they apply.
#[derive(Debug, Clone, Default)]
pub struct ProjectionPlan {
    steps: Vec<Vec<Projection>>,
}

impl ProjectionPlan {
    /// Schedule every constraint of `postselect` (and every union of two
    /// disjoint constraints) over `network`.
    pub fn new(network: &Network, postselect: &PostSelect) -> Self {
        let constraints = postselect.constraints();
        let mut scheduled: BTreeSet<Projection> = BTreeSet::new();
        for (i, a) in constraints.iter().enumerate() {
            scheduled.insert(schedule(network, &a.modes, a.count));
            for b in &constraints[i + 1..] {
                if let Some(union) = disjoint_union(a, b) {
                    scheduled.insert(schedule(network, &union.modes, union.count));
                }
            }
        }

        let mut steps = vec![Vec::new(); network.len() + 1];
        for projection in scheduled {
            steps[projection.after].push(projection);
        }
        Self { steps }
    }

    /// Projections due once `applied` placements have been simulated.
    pub fn due(&self, applied: usize) -> &[Projection] {
        self.steps.get(applied).map_or(&[], Vec::as_slice)
    }

    /// Total number of scheduled projections.
    pub fn len(&self) -> usize {
        self.steps.iter().map(Vec::len).sum()
    }

    /// Check whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn disjoint_union(a: &ModeConstraint, b: &ModeConstraint) -> Option<ModeConstraint> {
    if a.modes.iter().any(|m| b.modes.contains(m)) {
        return None;
    }
    let mut modes = a.modes.clone();
    modes.extend_from_slice(&b.modes);
    Some(ModeConstraint {
        modes,
        count: a.count + b.count,
    })
}

fn schedule(network: &Network, modes: &[usize], count: u32) -> Projection {
    let mut set: BTreeSet<usize> = modes.iter().copied().collect();
    for (index, placement) in network.placements().iter().enumerate().rev() {
        let span = placement.modes();
        if let OpticalElement::Permutation { perm } = &placement.element {
            let first = span.start;
            set = set
                .into_iter()
                .map(|m| {
                    if span.contains(&m) {
                        perm.iter()
                            .position(|&target| first + target == m)
                            .map_or(m, |source| first + source)
                    } else {
                        m
                    }
                })
                .collect();
            continue;
        }
        let inside = span.clone().filter(|m| set.contains(m)).count();
        if inside != 0 && inside != span.len() {
            return Projection {
                after: index + 1,
                modes: set.into_iter().collect(),
                count,
            };
        }
    }
    Projection {
        after: 0,
        modes: set.into_iter().collect(),
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mode_waits_for_last_straddling_pbs() {
        let mut net = Network::new("chain", 3);
        net.pbs(0).unwrap().hwp(1, 0.3).unwrap().pbs(1).unwrap().hwp(2, 0.1).unwrap();
        let plan = ProjectionPlan::new(&net, &PostSelect::new().eq([2], 1));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.due(3), &[Projection { after: 3, modes: vec![2], count: 1 }]);
    }

    #[test]
    fn test_pair_inside_pbs_is_conserved() {
        let mut net = Network::new("pair", 2);
        net.hwp(0, 0.3).unwrap().pbs(0).unwrap();
        let plan = ProjectionPlan::new(&net, &PostSelect::new().eq([0, 1], 1));
        assert_eq!(plan.due(0).len(), 1);
        assert!(plan.due(2).is_empty());
    }

    #[test]
    fn test_sets_follow_permutations_backwards() {
        let mut net = Network::new("layout", 4);
        net.pbs(0)
            .unwrap()
            .add(0, OpticalElement::permutation(vec![0, 2, 1, 3]).unwrap())
            .unwrap()
            .pbs(2)
            .unwrap();
        // [2,3] after the permutation is [1,3] before it, which the first
        // PBS straddles.
        let plan = ProjectionPlan::new(&net, &PostSelect::new().eq([2, 3], 1));
        assert_eq!(plan.due(1), &[Projection { after: 1, modes: vec![1, 3], count: 1 }]);
    }

    #[test]
    fn test_disjoint_pairs_add_their_union() {
        let mut net = Network::new("split", 2);
        net.pbs(0).unwrap();
        let plan = ProjectionPlan::new(&net, &PostSelect::new().eq([0], 0).eq([1], 1));
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.due(0), &[Projection { after: 0, modes: vec![0, 1], count: 1 }]);
        assert_eq!(plan.due(1).len(), 2);
    }

    #[test]
    fn test_empty_postselection() {
        let net = Network::new("empty", 2);
        assert!(ProjectionPlan::new(&net, &PostSelect::new()).is_empty());
    }
}

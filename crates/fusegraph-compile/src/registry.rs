//! Photon allocation and fusion discovery.
//!
//! Photons are allocated cluster by cluster with a provisional role. Fusion
//! discovery is a separate pure pass: it groups photons by source node and
//! returns the fusion pairs plus the set of photons that become witnesses.
//! The registry applies those overrides once and is frozen afterwards.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_4, FRAC_PI_8, PI};
use std::fmt;

use fusegraph_ir::{NodeId, OpticalElement};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::decompose::Cluster;

/// What a photon contributes to the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhotonRole {
    /// Measured in a rotated basis.
    Compute,
    /// Carries a logical output bit.
    Readout,
    /// Consumed by a fusion; only its detection pattern matters.
    Witness,
}

impl fmt::Display for PhotonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotonRole::Compute => write!(f, "compute"),
            PhotonRole::Readout => write!(f, "readout"),
            PhotonRole::Witness => write!(f, "witness"),
        }
    }
}

/// One photon, standing for one occurrence of a graph node in a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    /// Dense id; also the photon's input mode.
    pub id: usize,
    /// Role after fusion discovery.
    pub role: PhotonRole,
    /// Graph node the photon stands for.
    pub node: NodeId,
    /// Measurement angle in units of π.
    pub angle: Option<f64>,
}

impl Photon {
    /// Half-wave plate angle selecting the measurement basis.
    ///
    /// An angle `a` maps to `(π - 2aπ) / 8`; the X basis (`a = 0`) gives π/8.
    pub fn hwp_angle(&self) -> f64 {
        match self.angle {
            Some(a) if a != 0.0 => (PI - 2.0 * a * PI) / 8.0,
            _ => FRAC_PI_8,
        }
    }

    /// Basis-rotation plates for a compute photon, in application order.
    pub fn measurement_plates(&self) -> Option<[OpticalElement; 2]> {
        (self.role == PhotonRole::Compute)
            .then(|| [OpticalElement::qwp(FRAC_PI_4), OpticalElement::hwp(self.hwp_angle())])
    }
}

/// Two photons of the same node joined by a fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FusionPair {
    /// Lower photon id; keeps its role.
    pub first: usize,
    /// Higher photon id; becomes a witness.
    pub second: usize,
    /// The shared node.
    pub node: NodeId,
}

impl fmt::Display for FusionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} (node {})", self.first, self.second, self.node)
    }
}

/// Fusion pairs and the witness promotions they imply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionPlan {
    /// Pairs in discovery order.
    pub pairs: Vec<FusionPair>,
    /// Photons to promote to witness.
    pub witnesses: FxHashSet<usize>,
}

/// Group photons by node and pair every extra copy with the first one.
///
/// Nodes are visited in order of their first photon. For photons
/// `p0 < p1 < … < pk` of one node the pairs are `(p0, p1), (p0, p2), …`, so
/// `p0` is the only copy that keeps its role.
pub fn discover_fusions(photons: &[Photon]) -> FusionPlan {
    let mut groups: Vec<(NodeId, Vec<usize>)> = vec![];
    let mut index: FxHashMap<NodeId, usize> = FxHashMap::default();
    for photon in photons {
        let slot = *index.entry(photon.node).or_insert_with(|| {
            groups.push((photon.node, vec![]));
            groups.len() - 1
        });
        groups[slot].1.push(photon.id);
    }

    let mut plan = FusionPlan::default();
    for (node, mut ids) in groups {
        ids.sort_unstable();
        if let Some((&anchor, rest)) = ids.split_first() {
            for &id in rest {
                plan.pairs.push(FusionPair {
                    first: anchor,
                    second: id,
                    node,
                });
                plan.witnesses.insert(id);
            }
        }
    }
    plan
}

/// Photons allocated for a sequence of clusters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotonRegistry {
    photons: Vec<Photon>,
    by_node: BTreeMap<NodeId, Vec<usize>>,
}

impl PhotonRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate one photon per node of `cluster` and return their ids.
    ///
    /// Output nodes get [`PhotonRole::Readout`], every other node
    /// [`PhotonRole::Compute`].
    pub fn register(
        &mut self,
        cluster: &Cluster,
        angles: &BTreeMap<NodeId, f64>,
        outputs: &[NodeId],
    ) -> std::ops::Range<usize> {
        let first = self.photons.len();
        for node in cluster.nodes() {
            let id = self.photons.len();
            let role = if outputs.contains(&node) {
                PhotonRole::Readout
            } else {
                PhotonRole::Compute
            };
            self.photons.push(Photon {
                id,
                role,
                node,
                angle: angles.get(&node).copied(),
            });
            self.by_node.entry(node).or_default().push(id);
        }
        first..self.photons.len()
    }

    /// Promote the plan's witnesses.
    pub fn apply(&mut self, plan: &FusionPlan) {
        for photon in &mut self.photons {
            if plan.witnesses.contains(&photon.id) {
                photon.role = PhotonRole::Witness;
            }
        }
    }

    /// All photons by id.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Photon ids standing for `node`, ascending.
    pub fn photons_of(&self, node: NodeId) -> &[usize] {
        self.by_node.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of photons.
    pub fn len(&self) -> usize {
        self.photons.len()
    }

    /// Check whether no photon was allocated.
    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Consume the registry.
    pub fn into_photons(self) -> Vec<Photon> {
        self.photons
    }
}

/// Photons with the given role, in id order.
pub fn photons_with_role(photons: &[Photon], role: PhotonRole) -> impl Iterator<Item = &Photon> {
    photons.iter().filter(move |p| p.role == role)
}

//! Circuit assembly.
//!
//! The [`Assembler`] owns one build session and walks a fixed sequence of
//! states:
//!
//! ```text
//! Empty ──add_cluster──▶ Populated ──discover_fusions──▶ Fused
//!   │                                                      │
//!   └──────────────discover_fusions─────────────────────▶──┤
//!                                                          ▼
//!                Assembled ◀──assemble── CorrectionsApplied
//! ```
//!
//! Calls made out of order fail with [`CompileError::InvalidState`].
//!
//! Photon `i` enters in mode `i` of a `2n`-mode network; modes `n..2n` start
//! empty. Stages are laid out in this order, separated by full-width
//! barriers: clusters, fusions, corrections, basis rotations, and finally the
//! conversion from polarization to dual-rail encoding.

use std::collections::BTreeMap;
use std::fmt;

use fusegraph_ir::{InputState, Network, NodeId, OpticalElement, Polarization, PostSelect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decompose::Cluster;
use crate::error::{CompileError, CompileResult};
use crate::patterns;
use crate::registry::{
    FusionPair, Photon, PhotonRegistry, PhotonRole, discover_fusions, photons_with_role,
};

/// Build state of an [`Assembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblerState {
    /// No cluster registered yet.
    Empty,
    /// Clusters registered, fusions not yet discovered.
    Populated,
    /// Fusions discovered, roles final.
    Fused,
    /// Corrections resolved to photons.
    CorrectionsApplied,
    /// Network built; the session is over.
    Assembled,
}

impl AssemblerState {
    fn name(self) -> &'static str {
        match self {
            AssemblerState::Empty => "empty",
            AssemblerState::Populated => "populated",
            AssemblerState::Fused => "fused",
            AssemblerState::CorrectionsApplied => "corrected",
            AssemblerState::Assembled => "assembled",
        }
    }
}

impl fmt::Display for AssemblerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A correction resolved to a single photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Correction {
    /// Target photon.
    pub photon: usize,
    /// Clifford index.
    pub index: usize,
}

/// Everything produced by one build session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledCircuit {
    /// Clusters in assembly order.
    pub clusters: Vec<Cluster>,
    /// Photons by id, with final roles.
    pub photons: Vec<Photon>,
    /// Fusions in discovery order.
    pub fusions: Vec<FusionPair>,
    /// Corrections in application order.
    pub corrections: Vec<Correction>,
    /// The assembled network over `2 × photons` modes.
    pub network: Network,
}

impl CompiledCircuit {
    /// Number of photons.
    pub fn num_photons(&self) -> usize {
        self.photons.len()
    }

    /// Every photon horizontally polarized in its own mode, then vacuum.
    pub fn input_state(&self) -> InputState {
        InputState::polarized(self.photons.len(), self.photons.len(), Polarization::H)
    }

    /// Detection constraints heralding a successful run.
    ///
    /// A readout photon must be seen exactly once in its mode pair; compute
    /// and witness photons must be seen in the second mode of their pair.
    pub fn postselection(&self) -> PostSelect {
        self.photons
            .iter()
            .fold(PostSelect::new(), |ps, photon| {
                let (zero, one) = (2 * photon.id, 2 * photon.id + 1);
                match photon.role {
                    PhotonRole::Readout => ps.eq([zero, one], 1),
                    PhotonRole::Compute | PhotonRole::Witness => ps.eq([zero], 0).eq([one], 1),
                }
            })
    }

    /// Photons with the given role, in id order.
    pub fn photons_with_role(&self, role: PhotonRole) -> impl Iterator<Item = &Photon> {
        photons_with_role(&self.photons, role)
    }
}

/// Builder for one compiled circuit.
#[derive(Debug, Clone)]
pub struct Assembler {
    state: AssemblerState,
    angles: BTreeMap<NodeId, f64>,
    outputs: Vec<NodeId>,
    clusters: Vec<Cluster>,
    registry: PhotonRegistry,
    fusions: Vec<FusionPair>,
    corrections: Vec<Correction>,
}

impl Assembler {
    /// Start a session with the program's measurement angles and output nodes.
    pub fn new(angles: BTreeMap<NodeId, f64>, outputs: Vec<NodeId>) -> Self {
        Self {
            state: AssemblerState::Empty,
            angles,
            outputs,
            clusters: vec![],
            registry: PhotonRegistry::new(),
            fusions: vec![],
            corrections: vec![],
        }
    }

    /// Current state.
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Photons allocated so far.
    pub fn photons(&self) -> &[Photon] {
        self.registry.photons()
    }

    /// Fusions discovered so far.
    pub fn fusions(&self) -> &[FusionPair] {
        &self.fusions
    }

    fn require(&self, operation: &'static str, allowed: &[AssemblerState]) -> CompileResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(CompileError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }

    /// Register a cluster and allocate its photons.
    pub fn add_cluster(&mut self, cluster: Cluster) -> CompileResult<&mut Self> {
        self.require(
            "add cluster",
            &[AssemblerState::Empty, AssemblerState::Populated],
        )?;
        let ids = self.registry.register(&cluster, &self.angles, &self.outputs);
        debug!("Registered {} as photons {:?}", cluster, ids);
        self.clusters.push(cluster);
        self.state = AssemblerState::Populated;
        Ok(self)
    }

    /// Pair up photons sharing a node and fix the final roles.
    pub fn discover_fusions(&mut self) -> CompileResult<&mut Self> {
        self.require(
            "discover fusions",
            &[AssemblerState::Empty, AssemblerState::Populated],
        )?;
        let plan = discover_fusions(self.registry.photons());
        self.registry.apply(&plan);
        for pair in &plan.pairs {
            debug!("Fusion {}", pair);
        }
        self.fusions = plan.pairs;
        self.state = AssemblerState::Fused;
        Ok(self)
    }

    /// Resolve node corrections to the non-witness photons of each node.
    pub fn apply_corrections(
        &mut self,
        corrections: &BTreeMap<NodeId, u8>,
    ) -> CompileResult<&mut Self> {
        self.require("apply corrections", &[AssemblerState::Fused])?;
        let mut resolved = vec![];
        for (&node, &index) in corrections {
            let index = usize::from(index);
            crate::clifford::operators_for(index)?;
            let ids = self.registry.photons_of(node);
            if ids.is_empty() {
                return Err(CompileError::UnknownNode(node));
            }
            for &photon in ids {
                if self.registry.photons()[photon].role != PhotonRole::Witness {
                    resolved.push(Correction { photon, index });
                }
            }
        }
        self.corrections = resolved;
        self.state = AssemblerState::CorrectionsApplied;
        Ok(self)
    }

    /// Lay out the network and close the session.
    pub fn assemble(&mut self) -> CompileResult<CompiledCircuit> {
        self.require("assemble", &[AssemblerState::CorrectionsApplied])?;
        let n = self.registry.len();
        let mut network = Network::new("fusegraph", 2 * n);

        let mut offset = 0;
        for cluster in &self.clusters {
            network.append(offset, &patterns::cluster(cluster)?)?;
            offset += cluster.len();
        }
        network.barrier();

        for pair in &self.fusions {
            network.append(pair.first, &patterns::fusion(pair.first, pair.second)?)?;
        }
        network.barrier();

        for correction in &self.corrections {
            network.append(correction.photon, &patterns::correction(correction.index)?)?;
        }
        network.barrier();

        for photon in self.registry.photons() {
            if let Some(plates) = photon.measurement_plates() {
                for plate in plates {
                    network.add(photon.id, plate)?;
                }
            }
        }

        let perm: Vec<usize> = (0..n).map(|i| 2 * i).chain((0..n).map(|i| 2 * i + 1)).collect();
        network.add(0, OpticalElement::permutation(perm)?)?;
        for photon in 0..n {
            network.pbs(2 * photon)?;
        }

        info!(
            "Assembled {} clusters, {} fusions, {} corrections into {} elements over {} modes",
            self.clusters.len(),
            self.fusions.len(),
            self.corrections.len(),
            network.len(),
            network.num_modes()
        );

        self.state = AssemblerState::Assembled;
        Ok(CompiledCircuit {
            clusters: std::mem::take(&mut self.clusters),
            photons: std::mem::take(&mut self.registry).into_photons(),
            fusions: std::mem::take(&mut self.fusions),
            corrections: std::mem::take(&mut self.corrections),
            network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;
    use fusegraph_ir::{FockState, Graph};

    fn assembler_for(nodes: &[u32], edges: &[(u32, u32)], outputs: &[u32]) -> Assembler {
        let graph = Graph::from_parts(nodes.iter().copied(), edges.iter().copied()).unwrap();
        let outputs = outputs.iter().map(|&n| NodeId(n)).collect();
        let mut assembler = Assembler::new(BTreeMap::new(), outputs);
        for cluster in decompose(&graph).unwrap() {
            assembler.add_cluster(cluster).unwrap();
        }
        assembler
    }

    #[test]
    fn test_full_session() {
        let mut assembler = assembler_for(&[0, 1], &[(0, 1)], &[0, 1]);
        assert_eq!(assembler.state(), AssemblerState::Populated);
        let corrections = BTreeMap::from([(NodeId(1), 6u8)]);
        assembler
            .discover_fusions()
            .unwrap()
            .apply_corrections(&corrections)
            .unwrap();
        let circuit = assembler.assemble().unwrap();
        assert_eq!(assembler.state(), AssemblerState::Assembled);
        assert_eq!(circuit.network.num_modes(), 4);
        assert_eq!(circuit.network.num_barriers(), 3);
        assert_eq!(circuit.corrections, vec![Correction { photon: 1, index: 6 }]);
        assert_eq!(circuit.input_state().to_string(), "|{P:H},{P:H},0,0>");
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut assembler = assembler_for(&[0, 1], &[(0, 1)], &[]);
        assert!(matches!(
            assembler.apply_corrections(&BTreeMap::new()),
            Err(CompileError::InvalidState { operation: "apply corrections", state: "populated" })
        ));
        assert!(assembler.assemble().is_err());
        assembler.discover_fusions().unwrap();

        let extra = decompose(&Graph::from_parts([7u32], []).unwrap()).unwrap();
        let late = extra.into_iter().next().unwrap();
        assert!(matches!(
            assembler.add_cluster(late),
            Err(CompileError::InvalidState { state: "fused", .. })
        ));
        assert!(assembler.discover_fusions().is_err());
        assert!(assembler.assemble().is_err());

        assembler.apply_corrections(&BTreeMap::new()).unwrap();
        assembler.assemble().unwrap();
        assert!(assembler.assemble().is_err());
    }

    #[test]
    fn test_corrections_skip_witnesses() {
        let mut assembler = assembler_for(&[0, 1, 2], &[(0, 1), (1, 2), (2, 0)], &[0, 1, 2]);
        assembler.discover_fusions().unwrap();
        let corrections = BTreeMap::from([(NodeId(1), 4u8)]);
        assembler.apply_corrections(&corrections).unwrap();
        let circuit = assembler.assemble().unwrap();
        // node 1 is photons 1 and 3; photon 3 is the witness
        assert_eq!(circuit.corrections, vec![Correction { photon: 1, index: 4 }]);
        assert_eq!(circuit.fusions.len(), 2);
    }

    #[test]
    fn test_correction_errors() {
        let mut assembler = assembler_for(&[0, 1], &[(0, 1)], &[]);
        assembler.discover_fusions().unwrap();
        let bad_index = BTreeMap::from([(NodeId(0), 24u8)]);
        assert!(matches!(
            assembler.apply_corrections(&bad_index),
            Err(CompileError::CorrectionOutOfRange(24))
        ));
        let bad_node = BTreeMap::from([(NodeId(9), 1u8)]);
        assert!(matches!(
            assembler.apply_corrections(&bad_node),
            Err(CompileError::UnknownNode(NodeId(9)))
        ));
    }

    #[test]
    fn test_compute_photons_get_basis_rotation() {
        let mut assembler = assembler_for(&[0, 1], &[(0, 1)], &[1]);
        assembler.discover_fusions().unwrap().apply_corrections(&BTreeMap::new()).unwrap();
        let circuit = assembler.assemble().unwrap();
        // GHZ(2): 2 + 1 plates; one compute photon: 2 plates; no corrections
        assert_eq!(circuit.network.count("WP"), 3 + 2);
        // one cluster PBS plus one per photon at the end
        assert_eq!(circuit.network.count("PBS"), 1 + 2);
    }

    #[test]
    fn test_final_layout() {
        let mut assembler = assembler_for(&[0, 1, 2], &[(0, 1), (1, 2)], &[]);
        assembler.discover_fusions().unwrap().apply_corrections(&BTreeMap::new()).unwrap();
        let circuit = assembler.assemble().unwrap();
        let placements = circuit.network.placements();
        let conversion = &placements[placements.len() - 4].element;
        assert_eq!(
            conversion,
            &OpticalElement::Permutation { perm: vec![0, 2, 4, 1, 3, 5] }
        );
        let tail: Vec<usize> = placements[placements.len() - 3..]
            .iter()
            .map(|p| p.first_mode)
            .collect();
        assert_eq!(tail, vec![0, 2, 4]);
    }

    #[test]
    fn test_postselection_constraints() {
        let mut assembler = assembler_for(&[0, 1], &[(0, 1)], &[1]);
        assembler.discover_fusions().unwrap().apply_corrections(&BTreeMap::new()).unwrap();
        let circuit = assembler.assemble().unwrap();
        let ps = circuit.postselection();
        assert_eq!(ps.to_string(), "[0]==0 & [1]==1 & [2,3]==1");
        assert!(ps.accepts(&FockState::new(vec![0, 1, 1, 0])));
        assert!(ps.accepts(&FockState::new(vec![0, 1, 0, 1])));
        assert!(!ps.accepts(&FockState::new(vec![1, 0, 0, 1])));
    }
}

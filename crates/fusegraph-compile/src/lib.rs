//! Fusegraph Compilation Framework
//!
//! This crate turns an entanglement graph with measurement and correction
//! annotations into a linear-optical network built from polarization optics.
//!
//! # Overview
//!
//! Compilation runs through four steps:
//! 1. **Decomposition**: split the graph into GHZ stars and linear chains
//! 2. **Registration**: allocate one photon per node occurrence in a cluster
//! 3. **Fusion discovery**: pair photons of shared nodes, demoting copies to witnesses
//! 4. **Assembly**: lay out cluster, fusion, correction and measurement stages
//!
//! # Architecture
//!
//! ```text
//! GraphProgram
//!       │
//!       ▼
//! ┌────────────┐
//! │ decompose  │ ──▶ Vec<Cluster>
//! └────────────┘
//!       │
//!       ▼
//! ┌────────────┐
//! │ Assembler  │ ◄── angles, outputs, corrections (Clifford lookup)
//! └────────────┘
//!       │
//!       ├── add_cluster         (Empty / Populated)
//!       ├── discover_fusions    (→ Fused)
//!       ├── apply_corrections   (→ CorrectionsApplied)
//!       └── assemble            (→ Assembled)
//!       │
//!       ▼
//! CompiledCircuit (network, photons, fusions, postselection)
//! ```
//!
//! # Example: Compiling a Bell Pair
//!
//! ```rust
//! use fusegraph_compile::compile;
//! use fusegraph_ir::{Graph, GraphProgram};
//!
//! let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
//! let program = GraphProgram::new(graph)
//!     .with_correction(1u32, 6)
//!     .with_outputs([0u32, 1]);
//!
//! let circuit = compile(&program).unwrap();
//! assert_eq!(circuit.network.num_modes(), 4);
//! println!("{}", circuit.network);
//! ```
//!
//! # Example: Driving the Assembler by Hand
//!
//! ```rust
//! use fusegraph_compile::{Assembler, decompose};
//! use fusegraph_ir::Graph;
//! use std::collections::BTreeMap;
//!
//! let graph = Graph::from_parts([0u32, 1, 2], [(0, 1), (1, 2), (2, 0)]).unwrap();
//! let mut assembler = Assembler::new(BTreeMap::new(), vec![]);
//! for cluster in decompose(&graph).unwrap() {
//!     assembler.add_cluster(cluster).unwrap();
//! }
//! assembler.discover_fusions().unwrap();
//! assert_eq!(assembler.fusions().len(), 2);
//! ```

pub mod assemble;
pub mod clifford;
pub mod decompose;
pub mod error;
pub mod patterns;
pub mod pipeline;
pub mod registry;

pub use assemble::{Assembler, AssemblerState, CompiledCircuit, Correction};
pub use clifford::{NUM_CLIFFORDS, PolarOp, adjoint, operators_for, rail_operator, reference_unitary};
pub use decompose::{Cluster, ClusterKind, decompose};
pub use error::{CompileError, CompileResult};
pub use pipeline::compile;
pub use registry::{FusionPair, FusionPlan, Photon, PhotonRegistry, PhotonRole, discover_fusions};

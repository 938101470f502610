//! Fusegraph Intermediate Representation
//!
//! This crate provides the core data structures shared by the fusegraph
//! compilation stack: the entanglement graphs that come in, and the
//! linear-optical networks that go out.
//!
//! # Overview
//!
//! A measurement-based computation is described by a [`GraphProgram`]: an
//! undirected [`Graph`] plus per-node measurement angles, per-node Clifford
//! correction indices, and a list of output nodes. The compiler turns such a
//! program into a [`Network`] of polarization optics acting on `2n` spatial
//! modes, together with the [`InputState`] to inject and the [`PostSelect`]
//! condition that heralds success.
//!
//! # Core Components
//!
//! - **Graphs**: [`NodeId`] and [`Graph`], an insertion-ordered simple graph
//! - **Programs**: [`GraphProgram`] bundling a graph with its annotations
//! - **Elements**: [`OpticalElement`] and [`BeamSplitter`] with Jones matrices
//! - **Networks**: [`Network`] built fluently, composed from named [`Segment`]s
//! - **States**: [`InputState`] for injection, [`FockState`] for detection
//! - **Postselection**: [`PostSelect`] as a conjunction of [`ModeConstraint`]s
//!
//! # Example: A Two-Photon Fusion Stage
//!
//! ```rust
//! use fusegraph_ir::{InputState, Network, Polarization};
//! use std::f64::consts::FRAC_PI_8;
//!
//! let mut net = Network::new("fusion", 4);
//! net.pbs(0).unwrap().hwp(1, FRAC_PI_8).unwrap();
//!
//! let input = InputState::polarized(2, 2, Polarization::H);
//! assert_eq!(input.to_string(), "|{P:H},{P:H},0,0>");
//! assert_eq!(net.count("PBS"), 1);
//! ```
//!
//! # Example: Loading a Program
//!
//! ```rust
//! use fusegraph_ir::{GraphProgram, NodeId};
//!
//! let json = r#"{
//!     "graph": {"nodes": [0, 1], "edges": [[0, 1]]},
//!     "corrections": {"1": 6},
//!     "outputs": [0, 1]
//! }"#;
//! let program: GraphProgram = serde_json::from_str(json).unwrap();
//! program.validate().unwrap();
//! assert_eq!(program.corrections[&NodeId(1)], 6);
//! ```
//!
//! # Supported Elements
//!
//! | Element | Modes | Description |
//! |---------|-------|-------------|
//! | `WP` | 1 | Wave plate (`HWP`: δ = π/2, `QWP`: δ = π/4) |
//! | `PS` | 1 | Phase shifter |
//! | `BS` | 2 | Rail-form beam splitter |
//! | `PBS` | 2 | Polarizing beam splitter |
//! | `PERM` | n | Mode permutation (identity permutations act as barriers) |

pub mod element;
pub mod error;
pub mod graph;
pub mod network;
pub mod postselect;
pub mod program;
pub mod state;
pub mod unitary;

pub use element::{BeamSplitter, OpticalElement, Polarization};
pub use error::{IrError, IrResult};
pub use graph::{Graph, NodeId, normalize_edge};
pub use network::{Network, Placement, Segment};
pub use postselect::{ModeConstraint, PostSelect};
pub use program::GraphProgram;
pub use state::{FockState, InputState, ModeInput};
pub use unitary::Unitary2x2;

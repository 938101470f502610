//! Fusegraph Runtime
//!
//! This crate connects compiled photonic circuits to execution backends. An
//! [`Experiment`] owns a [`CompiledCircuit`](fusegraph_compile::CompiledCircuit),
//! binds to any [`Backend`](fusegraph_hal::Backend) and turns raw detection
//! patterns into logical output labels.
//!
//! # Queries
//!
//! Both queries take [`QueryOptions`]:
//! - `postselect`: keep only outcomes where every readout photon is seen once
//!   and every compute and witness photon is seen in its reference mode.
//!   Probabilities are renormalised over those outcomes and every shot is
//!   drawn from them.
//! - `format`: replace raw strings like `|0,1,1,0>` by labels like `|01>`,
//!   dropping outcomes that have no label.
//!
//! # Example
//!
//! ```rust,no_run
//! use fusegraph_ir::{Graph, GraphProgram};
//! use fusegraph_runtime::{QueryOptions, to_experiment};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = Graph::from_parts([0u32, 1], [(0, 1)])?;
//! let program = GraphProgram::new(graph)
//!     .with_correction(1u32, 6)
//!     .with_outputs([0u32, 1]);
//!
//! let mut experiment = to_experiment(&program)?;
//! experiment.bind_local(Some(42));
//!
//! let dist = experiment.probability_distribution(QueryOptions::default()).await?;
//! assert!((dist.get("|00>")? - 0.5).abs() < 1e-9);
//!
//! let counts = experiment.sample(1000, QueryOptions::default()).await?;
//! println!("{counts}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod experiment;
pub mod results;

pub use error::{RuntimeError, RuntimeResult};
pub use experiment::{Experiment, QueryOptions, default_registry, output_labels, to_experiment};
pub use results::{OutcomeValue, Outcomes, PhotonCount, PhotonDistribution};

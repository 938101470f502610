//! Local photonic simulator backend.
//!
//! This crate executes assembled linear-optical networks exactly. Photons
//! keep their polarization, so wave plates and polarizing beam splitters are
//! simulated faithfully; detectors count photons per spatial mode.
//!
//! # Features
//!
//! - **Exact probabilities**: Fock-space expansion, no sampling noise
//! - **Early postselection**: a constraint prunes the state right after the
//!   last element that can change the photon count it tests
//! - **Sampling**: shots drawn from the exact distribution, reproducible
//!   with a configured `seed`
//! - **Hard postselection**: non-conforming outcomes are removed before
//!   renormalisation or sampling, so sample totals always equal the shots
//!
//! The cost grows with the number of interfering photons. Postselected runs
//! of compiled graph programs stay near one term per polarization pattern;
//! unpostselected runs of large networks stop with
//! [`SimError::TooManyTerms`] once the configured `max_terms` is exceeded.
//!
//! # Example
//!
//! ```ignore
//! use fusegraph_adapter_sim::SimulatorBackend;
//! use fusegraph_hal::{Backend, Task};
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let task = Task::samples(1000).with_postselect(circuit.postselection());
//! let result = backend.run(&circuit.network, &circuit.input_state(), &task).await?;
//! println!("{:?}", result.counts());
//! ```

mod error;
mod fock;
mod projection;
mod simulator;

pub use error::{SimError, SimResult};
pub use fock::PolarizedState;
pub use projection::{Projection, ProjectionPlan};
pub use simulator::SimulatorBackend;

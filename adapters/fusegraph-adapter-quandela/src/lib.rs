//! fusegraph adapter for Quandela cloud photonic processors.
//!
//! Networks are serialized to JSON and submitted to a Quandela platform
//! together with the input state label and the postselection expression.
//! Simulator platforms (`sim:*`) accept polarization elements and exact
//! probability queries; QPU platforms only sample.
//!
//! # Authentication
//!
//! Pass a token in the [`BackendConfig`] or set `QUANDELA_TOKEN`.
//!
//! # Example
//!
//! ```ignore
//! use fusegraph_adapter_quandela::QuandelaBackend;
//! use fusegraph_hal::{Backend, Task};
//!
//! let backend = QuandelaBackend::new("sim:belenos")?;
//! let task = Task::samples(1000).with_postselect(circuit.postselection());
//! let result = backend.run(&circuit.network, &circuit.input_state(), &task).await?;
//! ```

mod api;
mod backend;
mod error;

pub use api::{BASE_URL, PlatformInfo, QuandelaClient};
pub use backend::{DEFAULT_PLATFORM, QuandelaBackend, TOKEN_ENV};
pub use error::{QuandelaError, QuandelaResult};

pub use fusegraph_hal::{Backend, BackendConfig, BackendFactory};

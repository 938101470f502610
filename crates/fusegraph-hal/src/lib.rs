//! Hardware abstraction layer for photonic backends.
//!
//! This crate defines how an assembled linear-optical [`Network`] reaches an
//! execution backend, whether a local simulator or a remote photonic
//! processor:
//!
//! - A common [`Backend`] trait covering validation, submission, status
//!   polling, result retrieval and cancellation
//! - [`Task`] describing the query (exact probabilities or samples) and an
//!   optional [`PostSelect`] filter
//! - [`Capabilities`] for rejecting networks a backend cannot run
//! - [`ExecutionResult`] with [`Distribution`] and [`Counts`] keyed by
//!   Fock-state labels such as `|0,1,1,0>`
//! - [`BackendRegistry`] for binding backends by name
//!
//! # Example
//!
//! ```ignore
//! use fusegraph_hal::{Backend, BackendConfig, BackendRegistry, Task};
//!
//! async fn run(registry: &BackendRegistry, network: &Network, input: &InputState) -> HalResult<()> {
//!     let backend = registry.create(BackendConfig::new("simulator"))?;
//!     let result = backend.run(network, input, &Task::samples(1000)).await?;
//!     if let Some((outcome, count)) = result.counts().and_then(|c| c.most_frequent()) {
//!         println!("{outcome}: {count}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`Network`]: fusegraph_ir::Network
//! [`PostSelect`]: fusegraph_ir::PostSelect

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;
pub mod task;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT, ValidationResult, wait_with,
};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{Counts, Distribution, ExecutionResult, ResultData};
pub use task::{Task, TaskKind};

//! Error types for the runtime crate.

use fusegraph_compile::CompileError;
use fusegraph_hal::HalError;
use thiserror::Error;

/// Errors that can occur while binding or querying an experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// A query or template was requested before a backend was bound.
    #[error("No backend bound; call bind() before querying the experiment")]
    NoBackend,

    /// Missing or invalid backend configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The readout register is too wide to enumerate its labels.
    #[error("Cannot label {0} readout photons, at most 63 are supported")]
    TooManyReadouts(usize),

    /// A lookup key is not present.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Error raised by the bound backend.
    #[error("Backend error: {0}")]
    Backend(#[from] HalError),

    /// Error raised while compiling the program.
    #[error("Compilation error: {0}")]
    Compile(#[from] CompileError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

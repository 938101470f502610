//! Error types for the compilation crate.

use fusegraph_ir::NodeId;
use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] fusegraph_ir::IrError),

    /// A cluster has no generator for its shape.
    #[error("Unsupported cluster: {0}")]
    UnsupportedCluster(String),

    /// An assembler operation was called in the wrong state.
    #[error("Cannot {operation} while assembler is {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the assembler was in.
        state: &'static str,
    },

    /// A correction index outside `0..24`.
    #[error("Correction index {0} out of range (expected 0..24)")]
    CorrectionOutOfRange(usize),

    /// A fusion between photons that are not in ascending order.
    #[error("Invalid fusion between photons {first} and {second}")]
    InvalidFusion {
        /// Photon expected to keep its role.
        first: usize,
        /// Photon expected to become the witness.
        second: usize,
    },

    /// A node referenced during compilation has no photon.
    #[error("Node {0} has no photon")]
    UnknownNode(NodeId),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

//! Simulator errors.

use fusegraph_hal::HalError;
use thiserror::Error;

/// Errors raised while simulating a network.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The input state does not cover the network's modes.
    #[error("input state has {input} modes but the network has {network}")]
    ModeMismatch {
        /// Modes in the input state.
        input: usize,
        /// Modes in the network.
        network: usize,
    },

    /// An element reaches past the last mode.
    #[error("element {element} at mode {mode} exceeds {num_modes} modes")]
    ElementOutOfRange {
        /// Element name.
        element: &'static str,
        /// First mode of the placement.
        mode: usize,
        /// Network width.
        num_modes: usize,
    },

    /// No outcome satisfies the postselection, so nothing can be sampled.
    #[error("no outcome satisfies the postselection {0}")]
    NothingAccepted(String),

    /// The state outgrew the term budget.
    #[error("state grew to {terms} terms, more than the limit of {limit}")]
    TooManyTerms {
        /// Terms held when the limit was hit.
        terms: usize,
        /// Configured budget.
        limit: usize,
    },
}

impl From<SimError> for HalError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::ModeMismatch { .. } | SimError::ElementOutOfRange { .. } => {
                HalError::InvalidNetwork(err.to_string())
            }
            SimError::TooManyTerms { .. } => HalError::NetworkTooLarge(err.to_string()),
            SimError::NothingAccepted(_) => HalError::JobFailed(err.to_string()),
        }
    }
}

/// Result alias for simulator operations.
pub type SimResult<T> = Result<T, SimError>;

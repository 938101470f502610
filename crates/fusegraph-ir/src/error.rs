//! Error types for the IR crate.

use crate::graph::NodeId;
use thiserror::Error;

/// Errors that can occur while building graphs, programs and networks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An edge or annotation references a node that was never declared.
    #[error("Node {node} is not declared in the graph{}", format_context(.context))]
    UnknownNode {
        /// The undeclared node.
        node: NodeId,
        /// Optional context (edge, angle map, output list...).
        context: Option<String>,
    },

    /// The same node was declared twice.
    #[error("Node {0} is declared more than once")]
    DuplicateNode(NodeId),

    /// An edge connects a node to itself.
    #[error("Self-loop on node {0} is not allowed")]
    SelfLoop(NodeId),

    /// An element was placed on modes outside the network.
    #[error(
        "Element '{element}' on modes {start}..{end} exceeds network width {num_modes}"
    )]
    ModeOutOfRange {
        /// Name of the element being placed.
        element: String,
        /// First mode occupied.
        start: usize,
        /// One past the last mode occupied.
        end: usize,
        /// Width of the target network.
        num_modes: usize,
    },

    /// A permutation list is not a bijection of `0..n`.
    #[error("Invalid permutation {0:?}")]
    InvalidPermutation(Vec<usize>),

    /// A textual state could not be parsed.
    #[error("Invalid state '{0}'")]
    InvalidState(String),
}

/// Helper function to format optional context.
#[allow(clippy::ref_option)]
fn format_context(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" ({ctx})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

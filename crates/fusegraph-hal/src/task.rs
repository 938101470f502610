//! What a submitted job should compute.

use std::fmt;

use fusegraph_ir::PostSelect;
use serde::{Deserialize, Serialize};

/// Kind of output requested from a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// Exact output probabilities.
    Probabilities,
    /// Sampled detection counts.
    Samples {
        /// Number of shots.
        shots: u32,
    },
}

/// A query against a network: output kind plus optional postselection.
///
/// When `postselect` is set, backends only report conforming outcomes.
/// Probabilities are renormalised over them and every sampled shot is drawn
/// from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Requested output.
    #[serde(flatten)]
    pub kind: TaskKind,
    /// Outcome filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postselect: Option<PostSelect>,
}

impl Task {
    /// Exact probability query.
    pub fn probabilities() -> Self {
        Self {
            kind: TaskKind::Probabilities,
            postselect: None,
        }
    }

    /// Sampling query with the given number of shots.
    pub fn samples(shots: u32) -> Self {
        Self {
            kind: TaskKind::Samples { shots },
            postselect: None,
        }
    }

    /// Attach a postselection.
    pub fn with_postselect(mut self, postselect: PostSelect) -> Self {
        self.postselect = Some(postselect);
        self
    }

    /// Shots requested, if this is a sampling query.
    pub fn shots(&self) -> Option<u32> {
        match self.kind {
            TaskKind::Samples { shots } => Some(shots),
            TaskKind::Probabilities => None,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TaskKind::Probabilities => write!(f, "probabilities")?,
            TaskKind::Samples { shots } => write!(f, "samples({shots})")?,
        }
        match &self.postselect {
            Some(ps) if !ps.is_empty() => write!(f, " where {ps}"),
            _ => Ok(()),
        }
    }
}
